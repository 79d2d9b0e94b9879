use std::time::Duration;

use async_trait::async_trait;
use proxy_quota_core::quota::credential_from_entry;
use proxy_quota_core::{
    ApiCallRequest, ApiCallResponse, ApiCaller, ApiKeySource, CoreResult, CredentialCatalog,
};
use proxy_quota_types::{CredentialRecord, QuotaError};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::ClientError;
use crate::types::*;

const MANAGEMENT_PREFIX: &str = "/v0/management";

pub struct ManagementClient {
    client: Client,
    config: ClientConfig,
}

impl ManagementClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidConfig(format!("base URL {}: {}", config.base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "unsupported scheme: {}",
                base.scheme()
            )));
        }

        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.config.base_url.trim_end_matches('/'), MANAGEMENT_PREFIX, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.config.management_key.trim();
        if key.is_empty() {
            builder
        } else {
            builder.bearer_auth(key)
        }
    }

    async fn check(resp: Response) -> Result<Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(ClientError::ServerError { status: status.as_u16(), message })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.authorize(self.client.get(self.endpoint(path))).send().await?;
        Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Perform a request on behalf of a stored credential.
    pub async fn api_call(&self, request: &ApiCallRequest) -> Result<ApiCallResponse, ClientError> {
        let body = ApiCallBody {
            auth_index: request.auth_index.clone(),
            method: request.method.as_str().to_string(),
            url: request.url.clone(),
            header: request.headers.clone(),
            data: request.body.clone(),
        };
        debug!(method = %request.method, url = %request.url, "Management api-call");

        let resp = self
            .authorize(self.client.post(self.endpoint("/api-call")))
            .json(&body)
            .send()
            .await?;
        let result: ApiCallResult = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        Ok(ApiCallResponse::new(result.status_code, result.body_text()))
    }

    /// Stored credentials as reported by the proxy.
    pub async fn list_auth_files(&self) -> Result<Vec<CredentialRecord>, ClientError> {
        let resp: AuthFilesResponse = self.get_json("/auth-files").await?;
        Ok(resp.files.iter().filter_map(credential_from_entry).collect())
    }

    /// Raw content of a stored credential file.
    pub async fn download_auth_file(&self, name: &str) -> Result<String, ClientError> {
        let resp = self
            .authorize(self.client.get(self.endpoint("/auth-files/download")))
            .query(&[("name", name)])
            .send()
            .await?;
        Ok(Self::check(resp).await?.text().await?)
    }

    pub async fn api_keys(&self) -> Result<Vec<String>, ClientError> {
        let resp: ApiKeysResponse = self.get_json("/api-keys").await?;
        Ok(resp.keys())
    }
}

#[async_trait]
impl ApiCaller for ManagementClient {
    async fn request(&self, request: ApiCallRequest) -> Result<ApiCallResponse, QuotaError> {
        Ok(self.api_call(&request).await?)
    }
}

#[async_trait]
impl CredentialCatalog for ManagementClient {
    async fn list_credentials(&self) -> CoreResult<Vec<CredentialRecord>> {
        Ok(self.list_auth_files().await?)
    }

    async fn read_credential_file(&self, name: &str) -> CoreResult<String> {
        Ok(self.download_auth_file(name).await?)
    }
}

#[async_trait]
impl ApiKeySource for ManagementClient {
    async fn list_api_keys(&self) -> CoreResult<Vec<String>> {
        Ok(self.api_keys().await?)
    }
}
