//! Configuration errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to turn `config.json` plus overrides into a usable [`AppConfig`].
///
/// [`AppConfig`]: crate::models::AppConfig
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ConfigError {
    /// The file exists but is not a valid config document
    #[error("Config parse error in {path}: {message}")]
    Parse {
        /// File that failed to parse
        path: String,
        /// Decoder message, with line and column
        message: String,
    },

    /// A field holds a value the engine cannot run with
    #[error("Invalid config value for {field}: {message}")]
    Invalid {
        /// Dotted field path, e.g. `management.timeout_secs`
        field: String,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    pub fn parse(path: impl Into<String>, e: &serde_json::Error) -> Self {
        Self::Parse { path: path.into(), message: e.to_string() }
    }

    pub fn invalid(field: &str, message: &str) -> Self {
        Self::Invalid { field: field.to_string(), message: message.to_string() }
    }

    /// Dotted path of the offending field, for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Invalid { field, .. } => Some(field.as_str()),
            Self::Parse { .. } => None,
        }
    }
}
