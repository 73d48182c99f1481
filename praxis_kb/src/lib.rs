//! # Praxis KB
//!
//! An embeddable knowledge base handle over [`praxis_core`]: one object
//! owning the fact trie and the variable environment, configured from TOML,
//! with path-notation shortcuts for asserting and testing ground facts.
//!
//! ```
//! use praxis_kb::KnowledgeBase;
//!
//! let mut kb = KnowledgeBase::new();
//! kb.assert_path("John+loves+Mary")?;
//! kb.assert_path("Kelly+loves+Mary")?;
//!
//! let x = kb.variable("x");
//! let mut lovers = kb.query().child(&x).child("loves").child("Mary").build();
//! let names: Vec<String> = kb
//!     .find_all(&mut lovers, &x)?
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(names, ["John", "Kelly"]);
//! # Ok::<(), praxis_kb::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod knowledge_base;
pub mod notation;

pub use config::*;
pub use error::*;
pub use knowledge_base::*;
pub use notation::*;

pub use praxis_core;
