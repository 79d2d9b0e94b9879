//! Per-credential quota state.

use serde::{Deserialize, Serialize};

/// Lifecycle of one credential's quota in its provider's state map.
///
/// Transitions run `Idle → Loading → (Success | Error)` within a pass; only a
/// new pass moves a terminal state back to `Loading`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuotaState<T> {
    /// Never fetched
    #[default]
    Idle,
    /// Fetch in flight
    Loading,
    /// Fetch settled with data
    Success {
        /// Provider-shaped quota data
        data: T,
    },
    /// Fetch settled with a failure
    Error {
        /// Display message, stored verbatim
        message: String,
        /// Upstream status code when one was observed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
    },
}

impl<T> QuotaState<T> {
    /// Build an error state.
    pub fn error(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Error { message: message.into(), status }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if the fetch for this credential has settled.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }

    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            _ => None,
        }
    }

    /// Error message, if this is an error state.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Status code, if this is an error state that carried one.
    pub const fn error_status(&self) -> Option<u16> {
        match self {
            Self::Error { status, .. } => *status,
            _ => None,
        }
    }
}
