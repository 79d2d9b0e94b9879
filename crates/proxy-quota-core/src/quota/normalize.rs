//! Normalization of loosely-typed vendor JSON.
//!
//! Vendors mix snake_case and camelCase across releases, send numbers as
//! strings, and omit fields freely. Every reader in this crate goes through
//! these helpers so that schema drift is handled in one place. All functions
//! are total: a value that cannot be interpreted is reported as `None`.

use chrono::DateTime;
use serde_json::Value;

/// Trimmed, non-empty string. Numbers are accepted and rendered as text.
pub fn normalize_string_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        },
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number from a JSON number or numeric string.
pub fn normalize_number_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Fraction in `[0, 1]`.
///
/// Out-of-range values are reported as missing rather than clamped so that
/// an upstream schema change does not masquerade as real quota.
pub fn normalize_quota_fraction(value: &Value) -> Option<f64> {
    normalize_number_value(value).filter(|f| (0.0..=1.0).contains(f))
}

/// Percentage clamped into `[0, 100]`.
///
/// Vendors report slightly over 100 when a window is overrun.
pub fn normalize_percent_value(value: &Value) -> Option<f64> {
    normalize_number_value(value).map(|p| p.clamp(0.0, 100.0))
}

/// Lower-cased plan type (e.g. "plus", "pro", "team").
pub fn normalize_plan_type(value: &Value) -> Option<String> {
    normalize_string_value(value).map(|s| s.to_lowercase())
}

/// Auth index as a non-empty string; integer indices are accepted.
pub fn normalize_auth_index_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Value::Number(_) => None,
        other => normalize_string_value(other),
    }
}

/// Boolean from a JSON bool or a "true"/"false" string.
pub fn normalize_bool_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// camelCase spelling of a snake_case key.
pub fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Probe the snake_case then camelCase spelling of `key`; first
/// non-missing value (after `normalize`) wins.
pub fn probe<T>(value: &Value, key: &str, normalize: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let object = value.as_object()?;
    let camel = camel_case(key);
    let spellings: &[&str] = if camel == key { &[key] } else { &[key, camel.as_str()] };
    spellings.iter().filter_map(|k| object.get(*k)).find_map(normalize)
}

/// Raw field value under either spelling, skipping nulls.
pub fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    object
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| object.get(&camel_case(key)).filter(|v| !v.is_null()))
}

/// Object-valued field under either spelling.
pub fn object_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    object
        .get(key)
        .filter(|v| v.is_object())
        .or_else(|| object.get(&camel_case(key)).filter(|v| v.is_object()))
}

pub fn string_field(value: &Value, key: &str) -> Option<String> {
    probe(value, key, normalize_string_value)
}

pub fn number_field(value: &Value, key: &str) -> Option<f64> {
    probe(value, key, normalize_number_value)
}

pub fn fraction_field(value: &Value, key: &str) -> Option<f64> {
    probe(value, key, normalize_quota_fraction)
}

pub fn percent_field(value: &Value, key: &str) -> Option<f64> {
    probe(value, key, normalize_percent_value)
}

pub fn bool_field(value: &Value, key: &str) -> Option<bool> {
    probe(value, key, normalize_bool_value)
}

/// Parse a response body text as JSON, `None` when it is not JSON.
pub fn parse_json_text(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// Earlier of two vendor reset timestamps.
///
/// RFC 3339 values are compared as instants; anything else falls back to
/// string order, which matches for same-format timestamps.
pub fn earliest_time(current: Option<String>, candidate: Option<String>) -> Option<String> {
    match (current, candidate) {
        (Some(a), Some(b)) => {
            let earlier_is_b = match (DateTime::parse_from_rfc3339(&a), DateTime::parse_from_rfc3339(&b))
            {
                (Ok(ta), Ok(tb)) => tb < ta,
                _ => b < a,
            };
            Some(if earlier_is_b { b } else { a })
        },
        (a, b) => a.or(b),
    }
}

/// Smaller of two optional values, ignoring missing ones.
pub fn min_known(current: Option<f64>, candidate: Option<f64>) -> Option<f64> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
