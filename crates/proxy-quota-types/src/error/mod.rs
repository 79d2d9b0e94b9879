//! Typed error definitions for Proxy Quota.
//!
//! - [`QuotaError`] is resolved per credential into an error state.
//! - [`ConfigError`] aborts before any fetch is attempted.

mod config;
mod quota;

pub use config::ConfigError;
pub use quota::{is_priority_status, QuotaError};
