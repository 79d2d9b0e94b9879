//! Gemini CLI quota adapter.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use proxy_quota_types::{
    CredentialRecord, GeminiCliQuota, GeminiCliQuotaBucket, ProviderType, QuotaError, QuotaState,
};
use serde_json::{json, Value};

use super::api_call::{ApiCallRequest, GEMINI_CLI_REQUEST_HEADERS};
use super::credential::{resolve_auth_index, resolve_gemini_cli_project_id};
use super::normalize::{
    earliest_time, field, fraction_field, min_known, number_field, string_field,
};
use super::registry::{FetchContext, QuotaConfig};
use super::store::QuotaStore;

const VERTEX_SUFFIX: &str = "_vertex";

/// Parse one raw bucket; entries without a model id are dropped.
///
/// A missing fraction is derived: zero when the remaining amount is zero or
/// below, zero when only a reset time is reported, unknown otherwise.
pub fn parse_bucket(raw: &Value) -> Option<GeminiCliQuotaBucket> {
    let model_id = string_field(raw, "model_id")?;
    let remaining_amount = number_field(raw, "remaining_amount");
    let reset_time = string_field(raw, "reset_time");

    let remaining_fraction = fraction_field(raw, "remaining_fraction").or_else(|| {
        match remaining_amount {
            Some(amount) => (amount <= 0.0).then_some(0.0),
            None => reset_time.as_ref().map(|_| 0.0),
        }
    });

    Some(GeminiCliQuotaBucket {
        model_ids: vec![model_id.clone()],
        model_id,
        token_type: string_field(raw, "token_type"),
        remaining_fraction,
        remaining_amount,
        reset_time,
    })
}

/// Group buckets by (model id without `_vertex`, token type).
pub fn group_buckets(buckets: Vec<GeminiCliQuotaBucket>) -> Vec<GeminiCliQuotaBucket> {
    let mut grouped: BTreeMap<(String, Option<String>), GeminiCliQuotaBucket> = BTreeMap::new();

    for bucket in buckets {
        let base = bucket.model_id.strip_suffix(VERTEX_SUFFIX).unwrap_or(&bucket.model_id).to_string();
        let key = (base.clone(), bucket.token_type.clone());

        match grouped.get_mut(&key) {
            Some(group) => {
                group.remaining_fraction = min_known(group.remaining_fraction, bucket.remaining_fraction);
                group.remaining_amount = min_known(group.remaining_amount, bucket.remaining_amount);
                group.reset_time = earliest_time(group.reset_time.take(), bucket.reset_time);
                for id in bucket.model_ids {
                    if !group.model_ids.contains(&id) {
                        group.model_ids.push(id);
                    }
                }
            },
            None => {
                grouped.insert(key, GeminiCliQuotaBucket { model_id: base, ..bucket });
            },
        }
    }

    grouped.into_values().collect()
}

/// Parse a retrieveUserQuota payload.
pub fn parse_gemini_cli_quota(payload: &Value) -> GeminiCliQuota {
    let buckets = field(payload, "buckets")
        .and_then(Value::as_array)
        .map(|raw| raw.iter().filter_map(parse_bucket).collect())
        .unwrap_or_default();
    GeminiCliQuota { buckets: group_buckets(buckets) }
}

/// Gemini CLI adapter.
pub struct GeminiCliQuotaConfig {
    quota_url: String,
}

impl GeminiCliQuotaConfig {
    pub fn new(quota_url: impl Into<String>) -> Self {
        Self { quota_url: quota_url.into() }
    }
}

#[async_trait]
impl QuotaConfig for GeminiCliQuotaConfig {
    type Data = GeminiCliQuota;

    fn provider(&self) -> ProviderType {
        ProviderType::GeminiCli
    }

    /// Runtime-only credentials are kept only when they carry project context.
    fn matches(&self, record: &CredentialRecord) -> bool {
        record.is_provider(ProviderType::GeminiCli)
            && !record.disabled
            && (!record.runtime_only || resolve_gemini_cli_project_id(record).is_some())
    }

    async fn fetch(
        &self,
        ctx: &FetchContext<'_>,
        record: &CredentialRecord,
    ) -> Result<GeminiCliQuota, QuotaError> {
        let auth_index = resolve_auth_index(record).ok_or_else(|| QuotaError::missing("auth index"))?;
        let project_id =
            resolve_gemini_cli_project_id(record).ok_or_else(|| QuotaError::missing("project id"))?;

        let request =
            ApiCallRequest::post_json(auth_index, self.quota_url.as_str(), &json!({ "project": project_id }))
                .with_headers(&GEMINI_CLI_REQUEST_HEADERS);
        let response = ctx.caller.request(request).await?;
        if !response.is_success() {
            return Err(response.into_status_error());
        }

        let payload = response.body.ok_or_else(|| QuotaError::Parse {
            message: "Failed to parse Gemini CLI quota response".to_string(),
        })?;
        Ok(parse_gemini_cli_quota(&payload))
    }

    fn slot<'s>(&self, store: &'s QuotaStore) -> &'s DashMap<String, QuotaState<GeminiCliQuota>> {
        store.gemini_cli_map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::testing::{MapCaller, StaticCatalog};
    use crate::quota::ApiCallResponse;

    const QUOTA: &str = "https://gemini.test/v1internal:retrieveUserQuota";

    #[test]
    fn test_zero_amount_means_exhausted() {
        let bucket = parse_bucket(&json!({"modelId": "gemini-2.5-pro", "remainingAmount": "0"})).unwrap();
        assert_eq!(bucket.remaining_fraction, Some(0.0));
        assert_eq!(bucket.remaining_amount, Some(0.0));
    }

    #[test]
    fn test_no_signal_means_unknown() {
        let bucket = parse_bucket(&json!({"model_id": "gemini-2.5-pro"})).unwrap();
        assert_eq!(bucket.remaining_fraction, None);

        let positive = parse_bucket(&json!({"model_id": "m", "remaining_amount": 12})).unwrap();
        assert_eq!(positive.remaining_fraction, None);
    }

    #[test]
    fn test_reset_time_only_means_exhausted() {
        let bucket =
            parse_bucket(&json!({"model_id": "m", "resetTime": "2025-01-01T00:00:00Z"})).unwrap();
        assert_eq!(bucket.remaining_fraction, Some(0.0));
    }

    #[test]
    fn test_explicit_fraction_wins() {
        let bucket = parse_bucket(&json!({
            "model_id": "m",
            "remaining_fraction": 0.4,
            "remaining_amount": 0
        }))
        .unwrap();
        assert_eq!(bucket.remaining_fraction, Some(0.4));
    }

    #[test]
    fn test_missing_model_id_is_dropped() {
        let quota = parse_gemini_cli_quota(&json!({
            "buckets": [{"tokenType": "REQUESTS"}, {"modelId": "m", "tokenType": "REQUESTS"}]
        }));
        assert_eq!(quota.buckets.len(), 1);
    }

    #[test]
    fn test_vertex_variants_are_grouped() {
        let quota = parse_gemini_cli_quota(&json!({
            "buckets": [
                {"modelId": "gemini-2.5-pro_vertex", "tokenType": "REQUESTS", "remainingFraction": 0.3,
                 "resetTime": "2025-01-02T00:00:00Z"},
                {"modelId": "gemini-2.5-pro", "tokenType": "REQUESTS", "remainingFraction": 0.8,
                 "resetTime": "2025-01-01T00:00:00Z"},
                {"modelId": "gemini-2.0-flash", "tokenType": "REQUESTS", "remainingFraction": 1}
            ]
        }));

        assert_eq!(quota.buckets.len(), 2);
        assert_eq!(quota.buckets[0].model_id, "gemini-2.0-flash");

        let pro = &quota.buckets[1];
        assert_eq!(pro.model_id, "gemini-2.5-pro");
        assert_eq!(pro.remaining_fraction, Some(0.3));
        assert_eq!(pro.reset_time.as_deref(), Some("2025-01-01T00:00:00Z"));
        assert_eq!(pro.model_ids, vec!["gemini-2.5-pro_vertex", "gemini-2.5-pro"]);
    }

    #[test]
    fn test_runtime_only_filter() {
        let adapter = GeminiCliQuotaConfig::new(QUOTA);
        let bare = CredentialRecord::new("g", "gemini-cli").runtime_only();
        let with_project = CredentialRecord::new("g", "gemini-cli")
            .runtime_only()
            .with_fields(json!({"project_id": "p"}));
        let disabled = CredentialRecord::new("g", "gemini-cli")
            .disabled()
            .with_fields(json!({"project_id": "p"}));

        assert!(!adapter.matches(&bare));
        assert!(adapter.matches(&with_project));
        assert!(!adapter.matches(&disabled));
    }

    #[tokio::test]
    async fn test_fetch_posts_project() {
        let caller = MapCaller::new().respond(
            QUOTA,
            ApiCallResponse::json(200, json!({"buckets": [{"modelId": "m", "remainingFraction": 0.5}]})),
        );
        let catalog = StaticCatalog::default();
        let ctx = FetchContext { caller: &caller, catalog: &catalog };
        let record = CredentialRecord::new("g.json", "gemini-cli")
            .with_auth_index("2")
            .with_fields(json!({"account": "me@example.com (proj-7)"}));

        let quota = GeminiCliQuotaConfig::new(QUOTA).fetch(&ctx, &record).await.unwrap();
        assert_eq!(quota.buckets.len(), 1);
        assert_eq!(caller.requests()[0].body.as_deref(), Some(r#"{"project":"proj-7"}"#));
    }

    #[tokio::test]
    async fn test_missing_project_is_configuration_error() {
        let caller = MapCaller::new();
        let catalog = StaticCatalog::default();
        let ctx = FetchContext { caller: &caller, catalog: &catalog };
        let record = CredentialRecord::new("g.json", "gemini-cli").with_auth_index("2");

        let err = GeminiCliQuotaConfig::new(QUOTA).fetch(&ctx, &record).await.unwrap_err();
        assert!(err.is_configuration());
        assert!(caller.requests().is_empty());
    }
}
