//! Error types for the knowledge base core.
//!
//! Every failure is local and synchronous. Nothing in the core retries or
//! swallows these; they surface to whoever drove the operation.

use thiserror::Error;

/// Errors raised by trie stores, variable access and query evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KbError {
    /// A store conflicted with the exclusivity already established at a node.
    #[error("Exclusion violation at {node}: {reason}")]
    Exclusion { node: String, reason: String },

    #[error("Attempt to read value of unbound variable {name}")]
    UnboundVariable { name: String },

    #[error("'{op}' can only be used on bound variables ({left}, {right})")]
    InvalidVariableComparison {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("No solution to query {query}")]
    NoSolution { query: String },

    #[error("Query {query} does not name a removable entry")]
    NotRetractable { query: String },

    /// The node handle outlived its node (retracted, overwritten or cleared).
    #[error("Stale trie node handle")]
    StaleNode,
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, KbError>;
