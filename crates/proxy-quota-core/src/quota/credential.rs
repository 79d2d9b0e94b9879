//! Provider-specific field resolution on stored credentials.

use proxy_quota_types::CredentialRecord;
use serde_json::{Map, Value};

use super::jwt::claims_from_value;
use super::normalize::{
    bool_field, field, normalize_auth_index_value, normalize_plan_type, normalize_string_value,
    object_field, probe, string_field,
};

const OPENAI_AUTH_CLAIM: &str = "https://api.openai.com/auth";

/// Build a record from a raw catalog entry.
///
/// Entries without a usable name are skipped.
pub fn credential_from_entry(entry: &Value) -> Option<CredentialRecord> {
    let name = string_field(entry, "name").or_else(|| string_field(entry, "id"))?;
    let provider = string_field(entry, "provider")
        .or_else(|| string_field(entry, "type"))
        .unwrap_or_default();

    let mut record = CredentialRecord::new(name, provider.to_lowercase()).with_fields(entry.clone());
    record.auth_index = probe(entry, "auth_index", normalize_auth_index_value);
    record.disabled = flag(entry, "disabled");
    record.runtime_only = flag(entry, "runtime_only");
    Some(record)
}

fn flag(entry: &Value, key: &str) -> bool {
    bool_field(entry, key).unwrap_or(false)
}

/// Non-empty auth index of a record.
pub fn resolve_auth_index(record: &CredentialRecord) -> Option<String> {
    record
        .auth_index
        .as_ref()
        .and_then(|idx| normalize_auth_index_value(&Value::String(idx.clone())))
}

/// Decoded `id_token` claims, probed at top level then in `metadata` and
/// `attributes`.
fn id_token_claims(fields: &Value) -> Vec<Map<String, Value>> {
    let scopes = [Some(fields), object_field(fields, "metadata"), object_field(fields, "attributes")];
    scopes
        .into_iter()
        .flatten()
        .filter_map(|scope| field(scope, "id_token"))
        .filter_map(claims_from_value)
        .collect()
}

fn claim(claims: &Map<String, Value>, key: &str) -> Option<String> {
    claims
        .get(OPENAI_AUTH_CLAIM)
        .and_then(|auth| auth.get(key))
        .and_then(normalize_string_value)
        .or_else(|| claims.get(key).and_then(normalize_string_value))
}

/// ChatGPT account id from the Codex id token.
pub fn resolve_codex_account_id(record: &CredentialRecord) -> Option<String> {
    id_token_claims(&record.fields)
        .iter()
        .find_map(|claims| claim(claims, "chatgpt_account_id"))
}

/// Plan type stored on a Codex credential.
pub fn resolve_codex_plan_type(record: &CredentialRecord) -> Option<String> {
    id_token_claims(&record.fields)
        .iter()
        .find_map(|claims| claim(claims, "chatgpt_plan_type"))
        .and_then(|plan| normalize_plan_type(&Value::String(plan)))
        .or_else(|| probe(&record.fields, "plan_type", normalize_plan_type))
        .or_else(|| {
            object_field(&record.fields, "metadata")
                .and_then(|meta| probe(meta, "plan_type", normalize_plan_type))
        })
}

/// Project id of a Gemini CLI credential.
///
/// Looks at `project_id` on the record and its metadata, then at the
/// trailing `(project)` of the `account` label.
pub fn resolve_gemini_cli_project_id(record: &CredentialRecord) -> Option<String> {
    let fields = &record.fields;
    string_field(fields, "project_id")
        .or_else(|| object_field(fields, "metadata").and_then(|m| string_field(m, "project_id")))
        .or_else(|| string_field(fields, "account").and_then(|a| project_from_account(&a)))
}

fn project_from_account(account: &str) -> Option<String> {
    let trimmed = account.trim_end();
    let inner = trimmed.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let project = inner[open + 1..].trim();
    (!project.is_empty()).then(|| project.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::jwt::encode_test_token;
    use serde_json::json;

    #[test]
    fn test_entry_with_integer_auth_index() {
        let entry = json!({
            "name": "codex-a.json",
            "provider": "Codex",
            "authIndex": 4,
            "disabled": false,
            "runtimeOnly": true
        });
        let record = credential_from_entry(&entry).unwrap();
        assert_eq!(record.provider, "codex");
        assert_eq!(record.auth_index.as_deref(), Some("4"));
        assert!(record.runtime_only);
        assert!(!record.disabled);
    }

    #[test]
    fn test_entry_without_name_is_skipped() {
        assert!(credential_from_entry(&json!({"provider": "codex"})).is_none());
    }

    #[test]
    fn test_blank_auth_index_is_absent() {
        let record = CredentialRecord::new("a", "codex").with_auth_index("  ");
        assert_eq!(resolve_auth_index(&record), None);
    }

    #[test]
    fn test_codex_account_id_from_nested_claim() {
        let token = encode_test_token(&json!({
            "https://api.openai.com/auth": {
                "chatgpt_account_id": "acc-123",
                "chatgpt_plan_type": "Plus"
            }
        }));
        let record = CredentialRecord::new("c", "codex")
            .with_fields(json!({"metadata": {"id_token": token}}));

        assert_eq!(resolve_codex_account_id(&record).as_deref(), Some("acc-123"));
        assert_eq!(resolve_codex_plan_type(&record).as_deref(), Some("plus"));
    }

    #[test]
    fn test_codex_account_id_from_decoded_object() {
        let record = CredentialRecord::new("c", "codex")
            .with_fields(json!({"attributes": {"idToken": {"chatgpt_account_id": "acc-9"}}}));
        assert_eq!(resolve_codex_account_id(&record).as_deref(), Some("acc-9"));
    }

    #[test]
    fn test_codex_plan_falls_back_to_record() {
        let record = CredentialRecord::new("c", "codex")
            .with_fields(json!({"id_token": "garbage", "planType": "Team"}));
        assert_eq!(resolve_codex_account_id(&record), None);
        assert_eq!(resolve_codex_plan_type(&record).as_deref(), Some("team"));
    }

    #[test]
    fn test_gemini_project_resolution() {
        let direct = CredentialRecord::new("g", "gemini-cli").with_fields(json!({"projectId": "p1"}));
        let meta = CredentialRecord::new("g", "gemini-cli")
            .with_fields(json!({"metadata": {"project_id": "p2"}}));
        let account = CredentialRecord::new("g", "gemini-cli")
            .with_fields(json!({"account": "user@example.com (proj-3)"}));
        let none = CredentialRecord::new("g", "gemini-cli")
            .with_fields(json!({"account": "user@example.com"}));

        assert_eq!(resolve_gemini_cli_project_id(&direct).as_deref(), Some("p1"));
        assert_eq!(resolve_gemini_cli_project_id(&meta).as_deref(), Some("p2"));
        assert_eq!(resolve_gemini_cli_project_id(&account).as_deref(), Some("proj-3"));
        assert_eq!(resolve_gemini_cli_project_id(&none), None);
    }
}
