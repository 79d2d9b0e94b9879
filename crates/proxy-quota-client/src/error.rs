//! Error types for the management client.

use proxy_quota_core::CoreError;
use proxy_quota_types::QuotaError;
use thiserror::Error;

/// Errors that can occur when talking to the management API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an invalid or unparseable response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Management API returned a non-2xx status.
    #[error("Server error ({status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// Client configuration is unusable (bad base URL, bad header value).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Status code of the management API response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidResponse(_) | Self::InvalidConfig(_) => None,
        }
    }
}

impl From<ClientError> for QuotaError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::InvalidResponse(message) => QuotaError::Parse { message },
            other => QuotaError::Transport { status: other.status(), message: other.to_string() },
        }
    }
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        CoreError::Catalog(err.to_string())
    }
}
