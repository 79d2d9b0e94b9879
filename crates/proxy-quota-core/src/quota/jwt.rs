//! Best-effort JWT payload reader.
//!
//! Only the payload segment is decoded and the signature is never checked:
//! the token already came from trusted credential storage and is read for
//! its claims, not for authentication. Every failure means "claim absent".

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};

/// Decode the payload segment of a JWT into a JSON object.
pub fn decode_jwt_payload(token: &str) -> Option<Map<String, Value>> {
    let payload = token.trim().split('.').nth(1)?;
    if payload.is_empty() {
        return None;
    }

    // base64url → standard alphabet, then restore padding
    let mut normalized: String = payload
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let rem = normalized.len() % 4;
    if rem != 0 {
        normalized.push_str(&"=".repeat(4 - rem));
    }

    let bytes = STANDARD.decode(normalized.as_bytes()).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Claims from a value that is either an encoded JWT string or an
/// already-decoded claims object.
pub fn claims_from_value(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::String(token) => decode_jwt_payload(token),
        Value::Object(map) => Some(map.clone()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn encode_test_token(claims: &Value) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.signature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_url_safe_payload_without_padding() {
        // `?>` style bytes produce '-' / '_' in base64url
        let claims = json!({
            "https://api.openai.com/auth": {"chatgpt_account_id": "acc-1"},
            "note": "??>>"
        });
        let token = encode_test_token(&claims);

        let decoded = decode_jwt_payload(&token).unwrap();
        assert_eq!(decoded["https://api.openai.com/auth"]["chatgpt_account_id"], "acc-1");
        assert_eq!(decoded["note"], "??>>");
    }

    #[test]
    fn test_malformed_tokens_are_absent() {
        assert!(decode_jwt_payload("").is_none());
        assert!(decode_jwt_payload("no-dots").is_none());
        assert!(decode_jwt_payload("a..c").is_none());
        assert!(decode_jwt_payload("a.!!!!.c").is_none());
        // Valid base64 but not a JSON object
        assert!(decode_jwt_payload("a.WzFd.c").is_none());
    }

    #[test]
    fn test_claims_from_decoded_object() {
        let value = json!({"chatgpt_account_id": "acc-2"});
        let claims = claims_from_value(&value).unwrap();
        assert_eq!(claims["chatgpt_account_id"], "acc-2");
        assert!(claims_from_value(&json!(42)).is_none());
    }
}
