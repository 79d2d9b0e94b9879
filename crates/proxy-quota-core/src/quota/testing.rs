//! In-memory capabilities for adapter tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use proxy_quota_types::{CredentialRecord, QuotaError};

use super::api_call::{ApiCallRequest, ApiCallResponse, ApiCaller, CredentialCatalog};
use crate::error::{CoreError, CoreResult};

/// Answers by URL; unknown URLs get a 404.
#[derive(Default)]
pub struct MapCaller {
    responses: HashMap<String, Result<ApiCallResponse, QuotaError>>,
    requests: Mutex<Vec<ApiCallRequest>>,
}

impl MapCaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, response: ApiCallResponse) -> Self {
        self.responses.insert(url.to_string(), Ok(response));
        self
    }

    pub fn fail(mut self, url: &str, err: QuotaError) -> Self {
        self.responses.insert(url.to_string(), Err(err));
        self
    }

    pub fn requests(&self) -> Vec<ApiCallRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiCaller for MapCaller {
    async fn request(&self, request: ApiCallRequest) -> Result<ApiCallResponse, QuotaError> {
        let answer = self
            .responses
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Ok(ApiCallResponse::new(404, "no route")));
        self.requests.lock().unwrap().push(request);
        answer
    }
}

#[derive(Default)]
pub struct StaticCatalog {
    credentials: Vec<CredentialRecord>,
    files: HashMap<String, String>,
}

impl StaticCatalog {
    pub fn with_file(mut self, name: &str, content: &str) -> Self {
        self.files.insert(name.to_string(), content.to_string());
        self
    }

    pub fn with_credentials(mut self, credentials: Vec<CredentialRecord>) -> Self {
        self.credentials = credentials;
        self
    }
}

#[async_trait]
impl CredentialCatalog for StaticCatalog {
    async fn list_credentials(&self) -> CoreResult<Vec<CredentialRecord>> {
        Ok(self.credentials.clone())
    }

    async fn read_credential_file(&self, name: &str) -> CoreResult<String> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::Catalog(format!("{name} not found")))
    }
}
