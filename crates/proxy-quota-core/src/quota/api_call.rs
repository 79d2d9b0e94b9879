//! External capabilities consumed by the engine.
//!
//! The engine never talks to vendors directly. It issues requests through an
//! [`ApiCaller`], which performs the HTTP call on behalf of a stored
//! credential, and enumerates credentials through a [`CredentialCatalog`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use proxy_quota_types::{CredentialRecord, QuotaError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::{parse_json_text, string_field};
use crate::error::CoreResult;

/// Placeholder substituted with the credential's access token by the caller.
pub const TOKEN_PLACEHOLDER: &str = "$TOKEN$";

/// Fixed Antigravity request headers.
pub const ANTIGRAVITY_REQUEST_HEADERS: [(&str, &str); 3] = [
    ("Authorization", "Bearer $TOKEN$"),
    ("Content-Type", "application/json"),
    ("User-Agent", "antigravity/1.11.5 windows/amd64"),
];

/// Fixed Codex request headers; `Chatgpt-Account-Id` is added per credential.
pub const CODEX_REQUEST_HEADERS: [(&str, &str); 3] = [
    ("Authorization", "Bearer $TOKEN$"),
    ("Content-Type", "application/json"),
    ("User-Agent", "codex_cli_rs/0.76.0 (Debian 13.0.0; x86_64) WindowsTerminal"),
];

/// Fixed Gemini CLI request headers.
pub const GEMINI_CLI_REQUEST_HEADERS: [(&str, &str); 2] =
    [("Authorization", "Bearer $TOKEN$"), ("Content-Type", "application/json")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to be performed on behalf of one credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiCallRequest {
    pub auth_index: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// Raw request body (JSON text for POST requests)
    pub body: Option<String>,
}

impl ApiCallRequest {
    pub fn get(auth_index: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            auth_index: auth_index.into(),
            method: HttpMethod::Get,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn post_json(auth_index: impl Into<String>, url: impl Into<String>, body: &Value) -> Self {
        Self {
            auth_index: auth_index.into(),
            method: HttpMethod::Post,
            url: url.into(),
            headers: BTreeMap::new(),
            body: Some(body.to_string()),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a fixed header set.
    pub fn with_headers(mut self, headers: &[(&str, &str)]) -> Self {
        for (name, value) in headers {
            self.headers.insert((*name).to_string(), (*value).to_string());
        }
        self
    }
}

/// Result of an authenticated call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCallResponse {
    pub status_code: u16,
    /// Body parsed as JSON when possible
    pub body: Option<Value>,
    /// Raw body text
    pub body_text: String,
}

impl ApiCallResponse {
    /// Build a response from raw text, parsing JSON when possible.
    pub fn new(status_code: u16, body_text: impl Into<String>) -> Self {
        let body_text = body_text.into();
        Self { status_code, body: parse_json_text(&body_text), body_text }
    }

    /// Build a response from an already-parsed JSON body.
    pub fn json(status_code: u16, body: Value) -> Self {
        Self { status_code, body_text: body.to_string(), body: Some(body) }
    }

    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }

    /// Best error text: `error.message`, `error` or `message` from a JSON
    /// body, else the raw text, else `HTTP <status>`.
    pub fn error_message(&self) -> String {
        let from_json = self.body.as_ref().and_then(|body| {
            body.get("error")
                .and_then(|err| string_field(err, "message"))
                .or_else(|| string_field(body, "error"))
                .or_else(|| string_field(body, "message"))
        });
        from_json
            .or_else(|| {
                let text = self.body_text.trim();
                (!text.is_empty()).then(|| text.to_string())
            })
            .unwrap_or_else(|| format!("HTTP {}", self.status_code))
    }

    /// Convert a non-2xx response into an upstream status error.
    pub fn into_status_error(self) -> QuotaError {
        QuotaError::UpstreamStatus { status: self.status_code, message: self.error_message() }
    }
}

/// Authenticated-call primitive.
///
/// Implementations own request timeouts; the engine imposes none.
#[async_trait]
pub trait ApiCaller: Send + Sync {
    async fn request(&self, request: ApiCallRequest) -> Result<ApiCallResponse, QuotaError>;
}

/// Enumerates stored credentials.
#[async_trait]
pub trait CredentialCatalog: Send + Sync {
    async fn list_credentials(&self) -> CoreResult<Vec<CredentialRecord>>;

    /// Raw content of a credential's stored token file.
    async fn read_credential_file(&self, name: &str) -> CoreResult<String>;
}

/// Remote listing of proxy API keys.
#[async_trait]
pub trait ApiKeySource: Send + Sync {
    async fn list_api_keys(&self) -> CoreResult<Vec<String>>;
}
