//! Refresh pass over the credential catalog.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use proxy_quota_types::{AppConfig, CredentialRecord, ProviderType};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::api_call::{ApiCaller, ApiKeySource, CredentialCatalog};
use super::registry::{FetchContext, ProviderRegistry, QuotaConfig};
use super::store::QuotaStore;
use crate::error::CoreResult;
use crate::modules::api_key_cache::ApiKeyCache;
use crate::modules::test_command::build_test_command;

/// Outcome counts for one provider in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub provider: ProviderType,
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RefreshSummary {
    const fn empty(provider: ProviderType) -> Self {
        Self { provider, dispatched: 0, succeeded: 0, failed: 0 }
    }
}

/// Per-provider summaries of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub antigravity: RefreshSummary,
    pub codex: RefreshSummary,
    pub gemini_cli: RefreshSummary,
}

impl RefreshReport {
    pub fn summaries(&self) -> [RefreshSummary; 3] {
        [self.antigravity, self.codex, self.gemini_cli]
    }

    pub fn total_failed(&self) -> usize {
        self.summaries().iter().map(|s| s.failed).sum()
    }
}

/// Drives one fetch per matching credential and records state transitions.
pub struct QuotaOrchestrator {
    config: AppConfig,
    registry: ProviderRegistry,
    store: QuotaStore,
    api_keys: ApiKeyCache,
    caller: Arc<dyn ApiCaller>,
    catalog: Arc<dyn CredentialCatalog>,
    key_source: Arc<dyn ApiKeySource>,
}

impl QuotaOrchestrator {
    pub fn new(
        config: AppConfig,
        caller: Arc<dyn ApiCaller>,
        catalog: Arc<dyn CredentialCatalog>,
        key_source: Arc<dyn ApiKeySource>,
    ) -> Self {
        Self {
            registry: ProviderRegistry::from_config(&config),
            config,
            store: QuotaStore::new(),
            api_keys: ApiKeyCache::new(),
            caller,
            catalog,
            key_source,
        }
    }

    pub fn store(&self) -> &QuotaStore {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run one pass over every provider.
    ///
    /// A forced pass also drops the cached primary API key.
    pub async fn refresh(&self, force: bool) -> CoreResult<RefreshReport> {
        if force {
            self.api_keys.invalidate().await;
        }
        let credentials = self.catalog.list_credentials().await?;
        debug!("Catalog returned {} credentials", credentials.len());

        let (antigravity, codex, gemini_cli) = tokio::join!(
            self.run_provider(&self.registry.antigravity, &credentials),
            self.run_provider(&self.registry.codex, &credentials),
            self.run_provider(&self.registry.gemini_cli, &credentials),
        );

        let report = RefreshReport { antigravity, codex, gemini_cli };
        info!(
            "Quota refresh finished: {} dispatched, {} failed",
            report.summaries().iter().map(|s| s.dispatched).sum::<usize>(),
            report.total_failed()
        );
        Ok(report)
    }

    /// Run one pass for a single provider.
    pub async fn refresh_provider(
        &self,
        provider: ProviderType,
        force: bool,
    ) -> CoreResult<RefreshSummary> {
        if force {
            self.api_keys.invalidate().await;
        }
        let credentials = self.catalog.list_credentials().await?;
        let summary = match provider {
            ProviderType::Antigravity => {
                self.run_provider(&self.registry.antigravity, &credentials).await
            },
            ProviderType::Codex => self.run_provider(&self.registry.codex, &credentials).await,
            ProviderType::GeminiCli => {
                self.run_provider(&self.registry.gemini_cli, &credentials).await
            },
        };
        Ok(summary)
    }

    async fn run_provider<C: QuotaConfig>(
        &self,
        adapter: &C,
        credentials: &[CredentialRecord],
    ) -> RefreshSummary {
        let provider = adapter.provider();
        let slot = adapter.slot(&self.store);
        let targets: Vec<&CredentialRecord> =
            credentials.iter().filter(|record| adapter.matches(record)).collect();

        // Credentials that no longer match (disabled, removed) lose their slot.
        let live: HashSet<&str> = targets.iter().map(|record| record.name.as_str()).collect();
        slot.retain(|name, _| live.contains(name.as_str()));

        for record in &targets {
            slot.insert(record.name.clone(), adapter.build_loading());
        }

        let mut summary = RefreshSummary::empty(provider);
        summary.dispatched = targets.len();
        if targets.is_empty() {
            return summary;
        }

        let ctx = FetchContext { caller: self.caller.as_ref(), catalog: self.catalog.as_ref() };
        let mut pending: FuturesUnordered<_> = targets
            .iter()
            .map(|record| async move { (*record, adapter.fetch(&ctx, record).await) })
            .collect();

        while let Some((record, result)) = pending.next().await {
            let state = match result {
                Ok(data) => {
                    summary.succeeded += 1;
                    adapter.build_success(data)
                },
                Err(err) => {
                    summary.failed += 1;
                    warn!(
                        provider = %provider,
                        credential = %record.name,
                        status = ?err.status(),
                        "Quota fetch failed: {}",
                        err
                    );
                    adapter.build_error(&err)
                },
            };
            slot.insert(record.name.clone(), state);
        }

        summary
    }

    /// Primary proxy API key, resolved lazily and cached.
    pub async fn primary_api_key(&self) -> CoreResult<Option<String>> {
        self.api_keys.resolve(&self.config.api_keys, self.key_source.as_ref()).await
    }

    /// `curl` command exercising the proxy with the primary API key.
    pub async fn test_command(&self, model: &str) -> CoreResult<Option<String>> {
        let key = self.primary_api_key().await?;
        Ok(key.map(|key| build_test_command(&self.config.management.base_url, &key, model)))
    }
}
