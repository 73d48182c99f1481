//! Knowledge base configuration.
//!
//! Loaded from TOML; every field is optional:
//!
//! ```toml
//! name = "village"
//! overwrite_exclusive = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for a [`KnowledgeBase`](crate::KnowledgeBase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KbConfig {
    /// Label used in log events.
    pub name: String,

    /// Whether an exclusive store of a different literal key replaces the
    /// existing child. When false such a store is an exclusion error.
    /// Keys taken from variables always replace.
    pub overwrite_exclusive: bool,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            name: "kb".to_string(),
            overwrite_exclusive: true,
        }
    }
}

impl KbConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_overwrite_exclusive(mut self, overwrite: bool) -> Self {
        self.overwrite_exclusive = overwrite;
        self
    }
}
