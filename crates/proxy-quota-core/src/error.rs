//! Unified error types for Proxy Quota Core.

use proxy_quota_types::{ConfigError, QuotaError};
use serde::Serialize;
use thiserror::Error;

/// Main error type for engine operations that are not per-credential.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A per-credential quota error escaped its credential.
    #[error("Quota error: {0}")]
    Quota(#[from] QuotaError),

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential catalog could not be read.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Unclassified error with message.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Serialize for CoreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Result type alias for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<String> for CoreError {
    fn from(s: String) -> Self {
        CoreError::Unknown(s)
    }
}

impl From<&str> for CoreError {
    fn from(s: &str) -> Self {
        CoreError::Unknown(s.to_string())
    }
}
