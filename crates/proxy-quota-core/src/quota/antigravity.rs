//! Antigravity quota adapter.
//!
//! Resolves the cloud project from the credential's token file, then runs
//! the fetchAvailableModels candidate loop and the loadCodeAssist tier
//! lookup concurrently.

use async_trait::async_trait;
use dashmap::DashMap;
use proxy_quota_types::{
    AntigravityModelQuota, AntigravityQuota, AntigravityQuotaGroup, CredentialRecord,
    EndpointConfig, ProviderType, QuotaError, QuotaState,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::api_call::{ApiCallRequest, ApiCaller, CredentialCatalog, ANTIGRAVITY_REQUEST_HEADERS};
use super::credential::resolve_auth_index;
use super::normalize::{
    earliest_time, fraction_field, min_known, object_field, parse_json_text, string_field,
};
use super::registry::{default_filter, FetchContext, QuotaConfig};
use super::store::QuotaStore;

enum Matcher {
    Exact(&'static [&'static str]),
    Prefix(&'static [&'static str]),
}

impl Matcher {
    fn matches(&self, model_id: &str) -> bool {
        match self {
            Self::Exact(ids) => ids.contains(&model_id),
            Self::Prefix(prefixes) => prefixes.iter().any(|p| model_id.starts_with(p)),
        }
    }
}

struct GroupDefinition {
    id: &'static str,
    label: &'static str,
    matcher: Matcher,
}

/// Model families, matched in order.
const GROUP_DEFINITIONS: &[GroupDefinition] = &[
    GroupDefinition {
        id: "claude-gpt",
        label: "Claude/GPT",
        matcher: Matcher::Prefix(&["claude-", "gpt-"]),
    },
    GroupDefinition {
        id: "gemini-3-pro",
        label: "Gemini 3 Pro",
        matcher: Matcher::Exact(&["gemini-3-pro-high", "gemini-3-pro-low", "gemini-3-pro"]),
    },
    GroupDefinition {
        id: "gemini-3-flash",
        label: "Gemini 3 Flash",
        matcher: Matcher::Exact(&["gemini-3-flash"]),
    },
    GroupDefinition {
        id: "gemini-2-5-pro",
        label: "Gemini 2.5 Pro",
        matcher: Matcher::Exact(&["gemini-2.5-pro"]),
    },
    GroupDefinition {
        id: "gemini-2-5-flash",
        label: "Gemini 2.5 Flash",
        matcher: Matcher::Exact(&["gemini-2.5-flash", "gemini-2.5-flash-thinking"]),
    },
    GroupDefinition {
        id: "gemini-2-5-flash-lite",
        label: "Gemini 2.5 Flash Lite",
        matcher: Matcher::Exact(&["gemini-2.5-flash-lite"]),
    },
    GroupDefinition {
        id: "gemini-2-5-cu",
        label: "Gemini 2.5 CU",
        matcher: Matcher::Exact(&["rev19-uic3-1p", "gemini-2.5-computer-use"]),
    },
    GroupDefinition {
        id: "gemini-image",
        label: "Gemini Image",
        matcher: Matcher::Exact(&["gemini-3-pro-image", "gemini-2.5-flash-image"]),
    },
];

/// Project id from a stored token file: top level, then `installed`, then `web`.
pub fn project_id_from_token_file(content: &str) -> Option<String> {
    let parsed = parse_json_text(content)?;
    let project_id =
        [Some(&parsed), object_field(&parsed, "installed"), object_field(&parsed, "web")]
            .into_iter()
            .flatten()
            .find_map(|scope| string_field(scope, "project_id"));
    project_id
}

async fn resolve_project_id(
    catalog: &dyn CredentialCatalog,
    record: &CredentialRecord,
    default_project_id: &str,
) -> String {
    let resolved = match catalog.read_credential_file(&record.name).await {
        Ok(content) => project_id_from_token_file(&content),
        Err(e) => {
            debug!(credential = %record.name, "Token file unavailable: {}", e);
            None
        },
    };
    resolved.unwrap_or_else(|| default_project_id.to_string())
}

fn tier_from_payload(payload: &Value) -> Option<String> {
    object_field(payload, "paid_tier")
        .and_then(|tier| string_field(tier, "id"))
        .or_else(|| object_field(payload, "current_tier").and_then(|tier| string_field(tier, "id")))
}

/// Subscription tier via loadCodeAssist; `None` when no candidate yields one.
pub async fn fetch_subscription_tier(
    caller: &dyn ApiCaller,
    auth_index: &str,
    tier_urls: &[String],
) -> Option<String> {
    let body = json!({
        "metadata": {
            "ideType": "ANTIGRAVITY",
            "platform": "PLATFORM_UNSPECIFIED",
            "pluginType": "GEMINI"
        }
    });

    for url in tier_urls {
        let request = ApiCallRequest::post_json(auth_index, url.as_str(), &body)
            .with_headers(&ANTIGRAVITY_REQUEST_HEADERS);
        match caller.request(request).await {
            Ok(response) if response.is_success() => {
                if let Some(tier) = response.body.as_ref().and_then(tier_from_payload) {
                    info!("Subscription identified: {}", tier);
                    return Some(tier);
                }
                debug!(url = %url, "loadCodeAssist returned no tier");
            },
            Ok(response) => debug!(url = %url, status = response.status_code, "loadCodeAssist failed"),
            Err(e) => debug!(url = %url, "loadCodeAssist error: {}", e),
        }
    }
    None
}

fn parse_model(model_id: &str, info: &Value) -> Option<AntigravityModelQuota> {
    let quota_info = object_field(info, "quota_info")?;
    let reset_time = string_field(quota_info, "reset_time");
    let remaining_fraction = fraction_field(quota_info, "remaining_fraction")
        .or_else(|| reset_time.as_ref().map(|_| 0.0));

    Some(AntigravityModelQuota {
        model_id: model_id.to_string(),
        display_name: string_field(info, "display_name"),
        remaining_fraction,
        reset_time,
    })
}

fn build_group(id: &str, label: &str, models: Vec<AntigravityModelQuota>) -> AntigravityQuotaGroup {
    let (remaining_fraction, reset_time) =
        models.iter().fold((None, None), |(fraction, reset), model| {
            (
                min_known(fraction, model.remaining_fraction),
                earliest_time(reset, model.reset_time.clone()),
            )
        });
    AntigravityQuotaGroup {
        id: id.to_string(),
        label: label.to_string(),
        models,
        remaining_fraction,
        reset_time,
    }
}

/// Fold a `models` object into quota groups.
pub fn build_antigravity_groups(models: &serde_json::Map<String, Value>) -> Vec<AntigravityQuotaGroup> {
    let mut remaining: Vec<AntigravityModelQuota> =
        models.iter().filter_map(|(id, info)| parse_model(id, info)).collect();

    let mut groups = Vec::new();
    for definition in GROUP_DEFINITIONS {
        let (members, rest): (Vec<_>, Vec<_>) =
            remaining.into_iter().partition(|m| definition.matcher.matches(&m.model_id));
        remaining = rest;
        if !members.is_empty() {
            groups.push(build_group(definition.id, definition.label, members));
        }
    }

    remaining.sort_by(|a, b| a.model_id.cmp(&b.model_id));
    for model in remaining {
        let id = model.model_id.clone();
        let label = model.display_name.clone().unwrap_or_else(|| id.clone());
        groups.push(build_group(&id, &label, vec![model]));
    }
    groups
}

/// Outcome of the fetchAvailableModels candidate loop.
enum CandidateOutcome {
    Groups(Vec<AntigravityQuotaGroup>),
    /// A candidate returned a valid but empty `models` object.
    Empty,
    Failed(QuotaError),
}

/// Error bookkeeping across fallback candidates.
#[derive(Default)]
struct CandidateLedger {
    priority: Option<QuotaError>,
    last: Option<QuotaError>,
}

impl CandidateLedger {
    fn record(&mut self, err: QuotaError) {
        if self.priority.is_none() && err.is_definitive() {
            self.priority = Some(err.clone());
        }
        self.last = Some(err);
    }

    fn into_error(self) -> QuotaError {
        self.priority.or(self.last).unwrap_or_else(|| QuotaError::Configuration {
            message: "No Antigravity quota endpoints configured".to_string(),
        })
    }
}

async fn fetch_model_groups(
    caller: &dyn ApiCaller,
    auth_index: &str,
    project_id: &str,
    quota_urls: &[String],
) -> CandidateOutcome {
    let body = json!({ "project": project_id });
    let mut ledger = CandidateLedger::default();
    let mut had_success = false;

    for (attempt, url) in quota_urls.iter().enumerate() {
        debug!(url = %url, attempt = attempt + 1, "Fetching Antigravity models");
        let request = ApiCallRequest::post_json(auth_index, url.as_str(), &body)
            .with_headers(&ANTIGRAVITY_REQUEST_HEADERS);

        let response = match caller.request(request).await {
            Ok(response) => response,
            Err(e) => {
                ledger.record(e);
                continue;
            },
        };
        if !response.is_success() {
            ledger.record(response.into_status_error());
            continue;
        }

        let Some(payload) = response.body.as_ref() else {
            ledger.record(QuotaError::Parse {
                message: "Failed to parse Antigravity quota response".to_string(),
            });
            continue;
        };
        let Some(models) = object_field(payload, "models").and_then(Value::as_object) else {
            ledger.record(QuotaError::EmptyPayload {
                message: "No models in Antigravity quota response".to_string(),
            });
            continue;
        };

        had_success = true;
        let groups = build_antigravity_groups(models);
        if !groups.is_empty() {
            if attempt > 0 {
                info!(url = %url, "Antigravity quota fetched from fallback endpoint");
            }
            return CandidateOutcome::Groups(groups);
        }
    }

    if had_success {
        CandidateOutcome::Empty
    } else {
        CandidateOutcome::Failed(ledger.into_error())
    }
}

/// Antigravity adapter.
pub struct AntigravityQuotaConfig {
    quota_urls: Vec<String>,
    tier_urls: Vec<String>,
    default_project_id: String,
}

impl AntigravityQuotaConfig {
    pub fn new(endpoints: &EndpointConfig, default_project_id: impl Into<String>) -> Self {
        Self {
            quota_urls: endpoints.antigravity_quota_urls.clone(),
            tier_urls: endpoints.antigravity_tier_urls.clone(),
            default_project_id: default_project_id.into(),
        }
    }
}

#[async_trait]
impl QuotaConfig for AntigravityQuotaConfig {
    type Data = AntigravityQuota;

    fn provider(&self) -> ProviderType {
        ProviderType::Antigravity
    }

    fn matches(&self, record: &CredentialRecord) -> bool {
        default_filter(record, ProviderType::Antigravity)
    }

    async fn fetch(
        &self,
        ctx: &FetchContext<'_>,
        record: &CredentialRecord,
    ) -> Result<AntigravityQuota, QuotaError> {
        let auth_index = resolve_auth_index(record).ok_or_else(|| QuotaError::missing("auth index"))?;
        let project_id = resolve_project_id(ctx.catalog, record, &self.default_project_id).await;

        let (outcome, subscription_tier) = tokio::join!(
            fetch_model_groups(ctx.caller, &auth_index, &project_id, &self.quota_urls),
            fetch_subscription_tier(ctx.caller, &auth_index, &self.tier_urls),
        );

        match outcome {
            CandidateOutcome::Groups(groups) => Ok(AntigravityQuota { groups, subscription_tier }),
            CandidateOutcome::Empty => Ok(AntigravityQuota { groups: Vec::new(), subscription_tier }),
            CandidateOutcome::Failed(err) => Err(err),
        }
    }

    fn slot<'s>(&self, store: &'s QuotaStore) -> &'s DashMap<String, QuotaState<AntigravityQuota>> {
        store.antigravity_map()
    }
}
