//! Codex usage adapter.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, Utc};
use dashmap::DashMap;
use proxy_quota_types::{
    CodexQuota, CodexQuotaWindow, CredentialRecord, ProviderType, QuotaError, QuotaState,
};
use serde_json::Value;

use super::api_call::{ApiCallRequest, CODEX_REQUEST_HEADERS};
use super::credential::{resolve_auth_index, resolve_codex_account_id, resolve_codex_plan_type};
use super::normalize::{
    bool_field, normalize_plan_type, number_field, object_field, percent_field, probe,
};
use super::registry::{default_filter, FetchContext, QuotaConfig};
use super::store::QuotaStore;

const FIVE_HOURS_SECS: i64 = 5 * 60 * 60;
const WEEK_SECS: i64 = 7 * 24 * 60 * 60;

/// Shown when a window's reset time is unknown.
pub const UNKNOWN_RESET_LABEL: &str = "-";

fn window_label(window: &Value, fallback: &str) -> String {
    let Some(secs) = number_field(window, "limit_window_seconds").map(|s| s.round() as i64) else {
        return fallback.to_string();
    };
    match secs {
        FIVE_HOURS_SECS => "5h limit".to_string(),
        WEEK_SECS => "Weekly limit".to_string(),
        s if s > 0 && s % 86_400 == 0 => format!("{}d limit", s / 86_400),
        s if s > 0 && s % 3_600 == 0 => format!("{}h limit", s / 3_600),
        _ => fallback.to_string(),
    }
}

fn reset_label(window: &Value, now: DateTime<Utc>) -> String {
    let reset_at = number_field(window, "reset_at")
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs as i64, 0))
        .or_else(|| {
            number_field(window, "reset_after_seconds")
                .filter(|secs| *secs >= 0.0)
                .and_then(|secs| Duration::try_seconds(secs as i64))
                .and_then(|delta| now.checked_add_signed(delta))
        });

    reset_at.map_or_else(
        || UNKNOWN_RESET_LABEL.to_string(),
        |at| at.with_timezone(&Local).format("%m/%d %H:%M").to_string(),
    )
}

fn parse_window(
    id: &str,
    fallback_label: &str,
    window: &Value,
    parent: &Value,
    now: DateTime<Utc>,
) -> CodexQuotaWindow {
    let reset_label = reset_label(window, now);
    let limit_reached = bool_field(window, "limit_reached")
        .or_else(|| bool_field(parent, "limit_reached"))
        .unwrap_or(false);
    let not_allowed = bool_field(window, "allowed")
        .or_else(|| bool_field(parent, "allowed"))
        .is_some_and(|allowed| !allowed);

    // Exhaustion is only inferred when the window also reports a reset.
    let used_percent = percent_field(window, "used_percent").or_else(|| {
        ((limit_reached || not_allowed) && reset_label != UNKNOWN_RESET_LABEL).then_some(100.0)
    });

    CodexQuotaWindow {
        id: id.to_string(),
        label: window_label(window, fallback_label),
        used_percent,
        reset_label,
    }
}

/// Parse a usage payload into windows (primary, secondary, code-review).
pub fn parse_codex_usage(
    payload: &Value,
    stored_plan_type: Option<String>,
    now: DateTime<Utc>,
) -> CodexQuota {
    let mut windows = Vec::new();

    if let Some(rate_limit) = object_field(payload, "rate_limit") {
        for (id, key, fallback) in
            [("primary", "primary_window", "Primary"), ("secondary", "secondary_window", "Secondary")]
        {
            if let Some(window) = object_field(rate_limit, key) {
                windows.push(parse_window(id, fallback, window, rate_limit, now));
            }
        }
    }

    if let Some(review) = object_field(payload, "code_review_rate_limit") {
        if let Some(window) = object_field(review, "primary_window") {
            let mut parsed = parse_window("code-review", "Code review", window, review, now);
            if parsed.label != "Code review" {
                parsed.label = format!("Code review ({})", parsed.label);
            }
            windows.push(parsed);
        }
    }

    CodexQuota {
        windows,
        plan_type: probe(payload, "plan_type", normalize_plan_type).or(stored_plan_type),
    }
}

/// Codex adapter.
pub struct CodexQuotaConfig {
    usage_url: String,
}

impl CodexQuotaConfig {
    pub fn new(usage_url: impl Into<String>) -> Self {
        Self { usage_url: usage_url.into() }
    }
}

#[async_trait]
impl QuotaConfig for CodexQuotaConfig {
    type Data = CodexQuota;

    fn provider(&self) -> ProviderType {
        ProviderType::Codex
    }

    fn matches(&self, record: &CredentialRecord) -> bool {
        default_filter(record, ProviderType::Codex)
    }

    async fn fetch(
        &self,
        ctx: &FetchContext<'_>,
        record: &CredentialRecord,
    ) -> Result<CodexQuota, QuotaError> {
        let auth_index = resolve_auth_index(record).ok_or_else(|| QuotaError::missing("auth index"))?;
        let account_id = resolve_codex_account_id(record)
            .ok_or_else(|| QuotaError::missing("ChatGPT account id"))?;

        let request = ApiCallRequest::get(auth_index, self.usage_url.as_str())
            .with_headers(&CODEX_REQUEST_HEADERS)
            .with_header("Chatgpt-Account-Id", account_id);
        let response = ctx.caller.request(request).await?;
        if !response.is_success() {
            return Err(response.into_status_error());
        }

        let payload = response.body.ok_or_else(|| QuotaError::Parse {
            message: "Failed to parse Codex usage response".to_string(),
        })?;
        Ok(parse_codex_usage(&payload, resolve_codex_plan_type(record), Utc::now()))
    }

    fn slot<'s>(&self, store: &'s QuotaStore) -> &'s DashMap<String, QuotaState<CodexQuota>> {
        store.codex_map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::jwt::encode_test_token;
    use crate::quota::testing::{MapCaller, StaticCatalog};
    use crate::quota::ApiCallResponse;
    use serde_json::json;

    const USAGE: &str = "https://codex.test/usage";

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap()
    }

    #[test]
    fn test_limit_reached_without_percent_is_full() {
        let payload = json!({
            "rate_limit": {
                "primary_window": {"limit_reached": true, "reset_after_seconds": 600}
            }
        });
        let quota = parse_codex_usage(&payload, None, now());
        let primary = quota.window("primary").unwrap();
        assert_ne!(primary.reset_label, UNKNOWN_RESET_LABEL);
        assert_eq!(primary.used_percent, Some(100.0));
    }

    #[test]
    fn test_limit_not_reached_without_percent_is_unknown() {
        let payload = json!({
            "rate_limit": {
                "primary_window": {"limit_reached": false, "reset_after_seconds": 600}
            }
        });
        let quota = parse_codex_usage(&payload, None, now());
        assert_eq!(quota.window("primary").unwrap().used_percent, None);
    }

    #[test]
    fn test_not_allowed_on_parent_needs_reset_label() {
        let payload = json!({
            "rateLimit": {
                "allowed": false,
                "primaryWindow": {"resetAt": 1_735_700_000},
                "secondaryWindow": {}
            }
        });
        let quota = parse_codex_usage(&payload, None, now());
        assert_eq!(quota.window("primary").unwrap().used_percent, Some(100.0));

        let secondary = quota.window("secondary").unwrap();
        assert_eq!(secondary.reset_label, UNKNOWN_RESET_LABEL);
        assert_eq!(secondary.used_percent, None);
    }

    #[test]
    fn test_windows_labels_and_percent_clamp() {
        let payload = json!({
            "plan_type": "Pro",
            "rate_limit": {
                "primary_window": {"used_percent": 104.2, "limit_window_seconds": 18000},
                "secondary_window": {"usedPercent": "12", "limitWindowSeconds": 604800}
            },
            "code_review_rate_limit": {
                "primary_window": {"used_percent": 0, "limit_window_seconds": 86400}
            }
        });
        let quota = parse_codex_usage(&payload, Some("plus".to_string()), now());

        let ids: Vec<&str> = quota.windows.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["primary", "secondary", "code-review"]);
        assert_eq!(quota.windows[0].label, "5h limit");
        assert_eq!(quota.windows[0].used_percent, Some(100.0));
        assert_eq!(quota.windows[1].label, "Weekly limit");
        assert_eq!(quota.windows[1].used_percent, Some(12.0));
        assert_eq!(quota.windows[2].label, "Code review (1d limit)");
        assert_eq!(quota.plan_type.as_deref(), Some("pro"));
    }

    #[test]
    fn test_plan_type_falls_back_to_stored() {
        let quota = parse_codex_usage(&json!({}), Some("team".to_string()), now());
        assert!(quota.windows.is_empty());
        assert_eq!(quota.plan_type.as_deref(), Some("team"));
    }

    fn codex_record() -> CredentialRecord {
        let token = encode_test_token(&json!({
            "https://api.openai.com/auth": {"chatgpt_account_id": "acc-1"}
        }));
        CredentialRecord::new("codex.json", "codex")
            .with_auth_index("5")
            .with_fields(json!({"id_token": token}))
    }

    #[tokio::test]
    async fn test_fetch_sends_account_header() {
        let caller = MapCaller::new().respond(
            USAGE,
            ApiCallResponse::json(200, json!({"rate_limit": {"primary_window": {"used_percent": 40}}})),
        );
        let catalog = StaticCatalog::default();
        let ctx = FetchContext { caller: &caller, catalog: &catalog };

        let quota = CodexQuotaConfig::new(USAGE).fetch(&ctx, &codex_record()).await.unwrap();
        assert_eq!(quota.window("primary").unwrap().used_percent, Some(40.0));

        let sent = &caller.requests()[0];
        assert_eq!(sent.headers["Chatgpt-Account-Id"], "acc-1");
        assert_eq!(sent.auth_index, "5");
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_carries_status() {
        let caller = MapCaller::new().respond(USAGE, ApiCallResponse::new(401, "unauthorized"));
        let catalog = StaticCatalog::default();
        let ctx = FetchContext { caller: &caller, catalog: &catalog };

        let err = CodexQuotaConfig::new(USAGE).fetch(&ctx, &codex_record()).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_missing_account_id_is_configuration_error() {
        let caller = MapCaller::new();
        let catalog = StaticCatalog::default();
        let ctx = FetchContext { caller: &caller, catalog: &catalog };
        let record = CredentialRecord::new("codex.json", "codex").with_auth_index("5");

        let err = CodexQuotaConfig::new(USAGE).fetch(&ctx, &record).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing ChatGPT account id");
        assert!(caller.requests().is_empty());
    }
}
