//! Provider registry.
//!
//! Every provider is a value implementing [`QuotaConfig`]: a credential
//! filter, a fetch function, the three state builders and the store slot it
//! writes into. The orchestrator drives all of them through the same code
//! path.

use async_trait::async_trait;
use dashmap::DashMap;
use proxy_quota_types::{AppConfig, CredentialRecord, ProviderType, QuotaError, QuotaState};

use super::antigravity::AntigravityQuotaConfig;
use super::api_call::{ApiCaller, CredentialCatalog};
use super::codex::CodexQuotaConfig;
use super::gemini_cli::GeminiCliQuotaConfig;
use super::store::QuotaStore;

/// Capabilities available to an adapter during a fetch.
#[derive(Clone, Copy)]
pub struct FetchContext<'a> {
    pub caller: &'a dyn ApiCaller,
    pub catalog: &'a dyn CredentialCatalog,
}

/// Provider type matches and the credential is neither disabled nor runtime-only.
pub fn default_filter(record: &CredentialRecord, provider: ProviderType) -> bool {
    record.is_provider(provider) && !record.disabled && !record.runtime_only
}

/// Per-provider quota contract.
#[async_trait]
pub trait QuotaConfig: Send + Sync {
    /// Provider-shaped success payload.
    type Data: Clone + Send + Sync + 'static;

    fn provider(&self) -> ProviderType;

    /// Whether this provider should fetch quota for the credential.
    fn matches(&self, record: &CredentialRecord) -> bool;

    async fn fetch(
        &self,
        ctx: &FetchContext<'_>,
        record: &CredentialRecord,
    ) -> Result<Self::Data, QuotaError>;

    fn build_loading(&self) -> QuotaState<Self::Data> {
        QuotaState::Loading
    }

    fn build_success(&self, data: Self::Data) -> QuotaState<Self::Data> {
        QuotaState::Success { data }
    }

    fn build_error(&self, err: &QuotaError) -> QuotaState<Self::Data> {
        QuotaState::error(err.to_string(), err.status())
    }

    /// State map this provider writes into.
    fn slot<'s>(&self, store: &'s QuotaStore) -> &'s DashMap<String, QuotaState<Self::Data>>;
}

/// The registry table: one adapter per provider type.
pub struct ProviderRegistry {
    pub antigravity: AntigravityQuotaConfig,
    pub codex: CodexQuotaConfig,
    pub gemini_cli: GeminiCliQuotaConfig,
}

impl ProviderRegistry {
    pub fn from_config(config: &AppConfig) -> Self {
        let endpoints = &config.endpoints;
        Self {
            antigravity: AntigravityQuotaConfig::new(endpoints, config.default_project_id.clone()),
            codex: CodexQuotaConfig::new(endpoints.codex_usage_url.clone()),
            gemini_cli: GeminiCliQuotaConfig::new(endpoints.gemini_cli_quota_url.clone()),
        }
    }

    /// Provider whose filter accepts the credential.
    pub fn provider_for(&self, record: &CredentialRecord) -> Option<ProviderType> {
        if self.antigravity.matches(record) {
            Some(ProviderType::Antigravity)
        } else if self.codex.matches(record) {
            Some(ProviderType::Codex)
        } else if self.gemini_cli.matches(record) {
            Some(ProviderType::GeminiCli)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_filter_excludes_flags() {
        let active = CredentialRecord::new("a", "codex");
        assert!(default_filter(&active, ProviderType::Codex));
        assert!(!default_filter(&active, ProviderType::Antigravity));
        assert!(!default_filter(&active.clone().disabled(), ProviderType::Codex));
        assert!(!default_filter(&active.runtime_only(), ProviderType::Codex));
    }

    #[test]
    fn test_provider_for() {
        let registry = ProviderRegistry::from_config(&AppConfig::default());
        let gemini = CredentialRecord::new("g", "gemini-cli")
            .runtime_only()
            .with_fields(json!({"project_id": "p"}));

        assert_eq!(registry.provider_for(&gemini), Some(ProviderType::GeminiCli));
        assert_eq!(registry.provider_for(&CredentialRecord::new("x", "claude")), None);
        assert_eq!(
            registry.provider_for(&CredentialRecord::new("ag", "antigravity").disabled()),
            None
        );
    }

    #[test]
    fn test_error_builder_keeps_message_and_status() {
        let registry = ProviderRegistry::from_config(&AppConfig::default());
        let err = QuotaError::UpstreamStatus { status: 403, message: "denied".to_string() };
        let state = registry.codex.build_error(&err);
        assert_eq!(state.error_message(), Some("denied"));
        assert_eq!(state.error_status(), Some(403));
    }
}
