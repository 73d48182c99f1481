//! # Praxis Core
//!
//! An in-process exclusion-logic knowledge base: a trie of facts, lazy
//! backtracking queries over it, and forward-chaining rules built on the
//! query engine.
//!
//! ## Core Components
//!
//! - **trie**: Arena-backed fact trie enforcing exclusive / non-exclusive children
//! - **variable**: Logic variables and the binding environment they live in
//! - **query**: Composable reset/advance cursors (match, capture, filter, join, predicate)
//! - **rule**: Single-pass forward chaining over query solutions
//!
//! ## Concurrency
//!
//! Everything here is single-threaded. A `Bindings` environment must only be
//! driven by one query evaluation at a time; interleaving the `try_next` calls
//! of two queries that share a variable corrupts both.

pub mod error;
pub mod key;
pub mod query;
pub mod rule;
pub mod trie;
pub mod variable;

#[cfg(test)]
mod testing;

pub use error::*;
pub use key::*;
pub use query::*;
pub use rule::*;
pub use trie::*;
pub use variable::*;
