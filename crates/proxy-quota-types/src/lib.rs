//! # Proxy Quota Types
//!
//! Core types, models, and error definitions for Proxy Quota.
//!
//! This crate provides the foundational type system for the quota engine:
//!
//! - **`error`** - Per-credential quota errors and configuration errors
//! - **`models`** - Domain models (credentials, quota states, per-provider quota data, config)
//!
//! ## Architecture Role
//!
//! `proxy-quota-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!          proxy-quota-types (this crate)
//!                   │
//!                   ▼
//!          proxy-quota-core
//!                   │
//!                   ▼
//!          proxy-quota-client
//!                   │
//!                   ▼
//!          proxy-quota-cli
//! ```
//!
//! All types are designed to be:
//! - **Serializable** via serde for API/IPC
//! - **Clone** for cheap sharing across async boundaries
//! - **PartialEq** for testing and comparison

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{ConfigError, QuotaError};

// Re-export core model types
pub use models::{
    AntigravityModelQuota, AntigravityQuota, AntigravityQuotaGroup, AppConfig, ClaudeCodeModels,
    CodexQuota, CodexQuotaWindow, CredentialRecord, EndpointConfig, GeminiCliQuota,
    GeminiCliQuotaBucket, ManagementConfig, ProviderType, QuotaState, DEFAULT_MANAGEMENT_URL,
    DEFAULT_PROJECT_ID,
};
