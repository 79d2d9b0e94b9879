use std::collections::BTreeMap;

use proxy_quota_types::{ManagementConfig, DEFAULT_MANAGEMENT_URL};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Proxy base URL without the `/v0/management` suffix
    pub base_url: String,
    /// Management secret; sent as a bearer token when non-empty
    pub management_key: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MANAGEMENT_URL.to_string(),
            management_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl From<&ManagementConfig> for ClientConfig {
    fn from(config: &ManagementConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            management_key: config.key.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

/// Body of `POST /v0/management/api-call`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCallBody {
    pub auth_index: String,
    pub method: String,
    pub url: String,
    pub header: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Response of `POST /v0/management/api-call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCallResult {
    #[serde(alias = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub header: BTreeMap<String, Value>,
    /// Upstream body; a string holding raw text, or inline JSON
    #[serde(default)]
    pub body: Value,
}

impl ApiCallResult {
    /// Upstream body as text.
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Response of `GET /v0/management/auth-files`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthFilesResponse {
    #[serde(default)]
    pub files: Vec<Value>,
}

/// Response of `GET /v0/management/api-keys`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiKeysResponse {
    #[serde(rename = "api-keys", alias = "apiKeys", alias = "api_keys", default)]
    pub api_keys: Vec<Value>,
}

impl ApiKeysResponse {
    /// Key strings; entries may be bare strings or `{ "key": ... }` objects.
    pub fn keys(&self) -> Vec<String> {
        self.api_keys
            .iter()
            .filter_map(|entry| match entry {
                Value::String(key) => Some(key.clone()),
                Value::Object(map) => {
                    let key = map.get("key").or_else(|| map.get("api-key"));
                    key.and_then(Value::as_str).map(str::to_string)
                },
                _ => None,
            })
            .collect()
    }
}
