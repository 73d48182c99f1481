//! Errors surfaced by the knowledge base facade.

use std::path::PathBuf;

use thiserror::Error;

use praxis_core::KbError;

/// Any failure from a [`KnowledgeBase`](crate::KnowledgeBase) operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Kb(#[from] KbError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Path(#[from] PathError),
}

impl Error {
    /// The core error, if this is one.
    pub fn as_kb(&self) -> Option<&KbError> {
        match self {
            Error::Kb(err) => Some(err),
            _ => None,
        }
    }
}

/// Failure to load a [`KbConfig`](crate::KbConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Malformed path notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Empty path")]
    Empty,

    #[error("Empty key at position {position} in {text:?}")]
    EmptySegment { text: String, position: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
