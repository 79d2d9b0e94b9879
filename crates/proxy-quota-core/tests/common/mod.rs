#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proxy_quota_core::{
    ApiCallRequest, ApiCallResponse, ApiCaller, ApiKeySource, CoreError, CoreResult,
    CredentialCatalog,
};
use proxy_quota_types::{AppConfig, CredentialRecord, EndpointConfig, QuotaError};
use tokio::sync::Semaphore;

pub const AG_QUOTA: &str = "https://ag.test/v1internal:fetchAvailableModels";
pub const AG_TIER: &str = "https://ag.test/v1internal:loadCodeAssist";
pub const CODEX_USAGE: &str = "https://codex.test/backend-api/wham/usage";
pub const GEMINI_QUOTA: &str = "https://gemini.test/v1internal:retrieveUserQuota";

pub fn test_config() -> AppConfig {
    AppConfig {
        endpoints: EndpointConfig {
            antigravity_quota_urls: vec![AG_QUOTA.to_string()],
            antigravity_tier_urls: vec![AG_TIER.to_string()],
            codex_usage_url: CODEX_USAGE.to_string(),
            gemini_cli_quota_url: GEMINI_QUOTA.to_string(),
        },
        ..AppConfig::new()
    }
}

/// Answers by (auth index, URL); anything unscripted gets a 404.
/// With a gate, every request waits for a permit first.
#[derive(Default)]
pub struct ScriptedCaller {
    responses: HashMap<(String, String), ApiCallResponse>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedCaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, auth_index: &str, url: &str, response: ApiCallResponse) -> Self {
        self.responses.insert((auth_index.to_string(), url.to_string()), response);
        self
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl ApiCaller for ScriptedCaller {
    async fn request(&self, request: ApiCallRequest) -> Result<ApiCallResponse, QuotaError> {
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.map_err(|e| QuotaError::Transport {
                message: e.to_string(),
                status: None,
            })?;
            permit.forget();
        }
        let key = (request.auth_index.clone(), request.url.clone());
        let response = self
            .responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ApiCallResponse::new(404, "no route"));
        Ok(response)
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    credentials: Mutex<Vec<CredentialRecord>>,
    files: HashMap<String, String>,
}

impl FakeCatalog {
    pub fn new(credentials: Vec<CredentialRecord>) -> Self {
        Self { credentials: Mutex::new(credentials), files: HashMap::new() }
    }

    pub fn set_credentials(&self, credentials: Vec<CredentialRecord>) {
        *self.credentials.lock().unwrap() = credentials;
    }
}

#[async_trait]
impl CredentialCatalog for FakeCatalog {
    async fn list_credentials(&self) -> CoreResult<Vec<CredentialRecord>> {
        Ok(self.credentials.lock().unwrap().clone())
    }

    async fn read_credential_file(&self, name: &str) -> CoreResult<String> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::Catalog(format!("{name} not found")))
    }
}

pub struct CountingKeySource {
    keys: Vec<String>,
    calls: AtomicUsize,
}

impl CountingKeySource {
    pub fn new(keys: &[&str]) -> Self {
        Self { keys: keys.iter().map(|k| (*k).to_string()).collect(), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApiKeySource for CountingKeySource {
    async fn list_api_keys(&self) -> CoreResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.keys.clone())
    }
}
