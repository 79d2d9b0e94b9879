//! Application configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default management API base URL of the proxy.
pub const DEFAULT_MANAGEMENT_URL: &str = "http://127.0.0.1:8317";

/// Cloud project used when a credential's token file names none.
pub const DEFAULT_PROJECT_ID: &str = "bamboo-precept-lgxtn";

const ANTIGRAVITY_BASE_URLS: [&str; 3] = [
    "https://daily-cloudcode-pa.googleapis.com",
    "https://daily-cloudcode-pa.sandbox.googleapis.com",
    "https://cloudcode-pa.googleapis.com",
];

/// Codex usage endpoint.
pub const CODEX_USAGE_URL: &str = "https://chatgpt.com/backend-api/wham/usage";

/// Gemini CLI quota endpoint.
pub const GEMINI_CLI_QUOTA_URL: &str =
    "https://cloudcode-pa.googleapis.com/v1internal:retrieveUserQuota";

/// Connection settings for the proxy management API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ManagementConfig {
    /// Base URL of the proxy (without `/v0/management`)
    pub base_url: String,
    /// Management secret sent as a bearer token
    pub key: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_MANAGEMENT_URL.to_string(), key: String::new(), timeout_secs: 30 }
    }
}

/// Upstream vendor endpoints, ordered by priority where a list is used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    /// fetchAvailableModels candidates
    pub antigravity_quota_urls: Vec<String>,
    /// loadCodeAssist candidates
    pub antigravity_tier_urls: Vec<String>,
    /// Codex usage URL
    pub codex_usage_url: String,
    /// Gemini CLI retrieveUserQuota URL
    pub gemini_cli_quota_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        let with_method = |method: &str| {
            ANTIGRAVITY_BASE_URLS
                .iter()
                .map(|base| format!("{base}/v1internal:{method}"))
                .collect::<Vec<_>>()
        };
        Self {
            antigravity_quota_urls: with_method("fetchAvailableModels"),
            antigravity_tier_urls: with_method("loadCodeAssist"),
            codex_usage_url: CODEX_USAGE_URL.to_string(),
            gemini_cli_quota_url: GEMINI_CLI_QUOTA_URL.to_string(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Management API connection
    #[serde(default)]
    pub management: ManagementConfig,
    /// Vendor endpoints
    #[serde(default)]
    pub endpoints: EndpointConfig,
    /// Antigravity project fallback
    #[serde(default = "default_project_id")]
    pub default_project_id: String,
    /// Locally configured proxy API keys (first non-empty is primary)
    #[serde(default)]
    pub api_keys: Vec<String>,
}

fn default_project_id() -> String {
    DEFAULT_PROJECT_ID.to_string()
}

impl AppConfig {
    /// Create default configuration.
    pub fn new() -> Self {
        Self {
            management: ManagementConfig::default(),
            endpoints: EndpointConfig::default(),
            default_project_id: default_project_id(),
            api_keys: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = ConfigError::invalid;

        if self.management.base_url.trim().is_empty() {
            return Err(invalid("management.base_url", "must not be empty"));
        }
        if self.management.timeout_secs == 0 {
            return Err(invalid("management.timeout_secs", "must be greater than zero"));
        }
        if self.endpoints.antigravity_quota_urls.is_empty() {
            return Err(invalid("endpoints.antigravity_quota_urls", "must list at least one URL"));
        }
        if self.endpoints.antigravity_tier_urls.is_empty() {
            return Err(invalid("endpoints.antigravity_tier_urls", "must list at least one URL"));
        }
        if self.default_project_id.trim().is_empty() {
            return Err(invalid("default_project_id", "must not be empty"));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
