//! Core domain models for Proxy Quota.
//!
//! This module contains all shared data structures used across the workspace.

mod antigravity;
mod claude_code;
mod codex;
mod config;
mod credential;
mod gemini_cli;
mod state;

// Re-export all models
pub use antigravity::{AntigravityModelQuota, AntigravityQuota, AntigravityQuotaGroup};
pub use claude_code::ClaudeCodeModels;
pub use codex::{CodexQuota, CodexQuotaWindow};
pub use config::{
    AppConfig, EndpointConfig, ManagementConfig, DEFAULT_MANAGEMENT_URL, DEFAULT_PROJECT_ID,
};
pub use credential::{CredentialRecord, ProviderType};
pub use gemini_cli::{GeminiCliQuota, GeminiCliQuotaBucket};
pub use state::QuotaState;

/// Convert a 0..=1 fraction into a rounded 0..=100 percentage.
pub fn fraction_to_percent(fraction: f64) -> f64 {
    (fraction.clamp(0.0, 1.0) * 100.0).round()
}
