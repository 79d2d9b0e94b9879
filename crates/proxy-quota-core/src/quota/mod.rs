//! Quota aggregation engine.
//!
//! ```text
//! QuotaOrchestrator ─► ProviderRegistry ─► {Antigravity, Codex, GeminiCli}QuotaConfig
//!        │                                          │
//!        ▼                                          ▼
//!   QuotaStore  ◄──── Loading / Success / Error ── ApiCaller (external)
//! ```

pub mod antigravity;
pub mod api_call;
pub mod codex;
pub mod credential;
pub mod gemini_cli;
pub mod jwt;
pub mod normalize;
pub mod orchestrator;
pub mod registry;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use antigravity::AntigravityQuotaConfig;
pub use api_call::{
    ApiCallRequest, ApiCallResponse, ApiCaller, ApiKeySource, CredentialCatalog, HttpMethod,
    TOKEN_PLACEHOLDER,
};
pub use codex::CodexQuotaConfig;
pub use credential::credential_from_entry;
pub use gemini_cli::GeminiCliQuotaConfig;
pub use orchestrator::{QuotaOrchestrator, RefreshReport, RefreshSummary};
pub use registry::{FetchContext, ProviderRegistry, QuotaConfig};
pub use store::{QuotaSnapshot, QuotaStore};
