//! Per-credential quota fetch errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while fetching quota for a single credential.
///
/// Every variant is resolved locally into that credential's error state;
/// none of them abort a refresh pass.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum QuotaError {
    /// Credential lacks a required identifier; no request was made
    #[error("{message}")]
    Configuration {
        /// Which identifier is missing
        message: String,
    },

    /// Upstream answered with a non-2xx status
    #[error("{message}")]
    UpstreamStatus {
        /// HTTP status code reported by the vendor
        status: u16,
        /// Error text extracted from the response
        message: String,
    },

    /// Upstream answered 2xx but without the expected quota structure
    #[error("{message}")]
    EmptyPayload {
        /// Description of what was missing
        message: String,
    },

    /// The request could not be completed
    #[error("{message}")]
    Transport {
        /// Description of the transport failure
        message: String,
        /// Status code, when the failure carried one
        status: Option<u16>,
    },

    /// The response body could not be decoded
    #[error("{message}")]
    Parse {
        /// Description of the decode failure
        message: String,
    },
}

impl QuotaError {
    /// Status codes treated as definitive rejections when trying fallback endpoints.
    pub const PRIORITY_STATUSES: [u16; 2] = [403, 404];

    /// Build a configuration error for a missing identifier.
    pub fn missing(what: &str) -> Self {
        Self::Configuration { message: format!("Missing {what}") }
    }

    /// HTTP status carried by this error, if any.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            Self::Transport { status, .. } => *status,
            Self::Configuration { .. } | Self::EmptyPayload { .. } | Self::Parse { .. } => None,
        }
    }

    /// Check if the vendor itself rejected the request with 403/404.
    ///
    /// A transport failure never qualifies, even when the proxy in between
    /// answered with one of those statuses.
    pub fn is_definitive(&self) -> bool {
        matches!(self, Self::UpstreamStatus { status, .. } if is_priority_status(*status))
    }

    /// Check if this error was raised before any network call.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Check if an HTTP status outranks other failures across fallback endpoints.
pub fn is_priority_status(status: u16) -> bool {
    QuotaError::PRIORITY_STATUSES.contains(&status)
}
