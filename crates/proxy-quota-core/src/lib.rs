//! # Proxy Quota Core
//!
//! Quota aggregation and normalization engine for a multi-provider AI-API proxy.
//!
//! ## Architecture
//!
//! ```text
//! proxy-quota-core/src/
//! ├── quota/
//! │   ├── normalize.rs     # Loosely-typed JSON → typed optionals
//! │   ├── jwt.rs           # Best-effort id_token claim reader
//! │   ├── api_call.rs      # Authenticated-call / catalog capabilities
//! │   ├── credential.rs    # Per-provider credential field resolution
//! │   ├── antigravity.rs   # fetchAvailableModels + loadCodeAssist adapter
//! │   ├── codex.rs         # ChatGPT usage adapter
//! │   ├── gemini_cli.rs    # retrieveUserQuota adapter
//! │   ├── registry.rs      # Provider capability trait + registry table
//! │   ├── store.rs         # Per-provider state maps
//! │   └── orchestrator.rs  # One refresh pass over the catalog
//! ├── modules/             # Config, API key cache, test command, Claude Code settings
//! └── utils/               # Data directory paths
//! ```
//!
//! The engine performs one pass per invocation. It does not retry, cache
//! quota results with a TTL, or rate-limit upstream polling; request
//! timeouts are inherited from the authenticated-call implementation.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod error;
pub mod modules;
pub mod quota;
pub mod utils;

// Re-export commonly used types
pub use error::{CoreError, CoreResult};
pub use quota::{
    ApiCallRequest, ApiCallResponse, ApiCaller, ApiKeySource, CredentialCatalog, HttpMethod,
    QuotaOrchestrator, QuotaStore, RefreshReport, RefreshSummary,
};
