//! Helper functions for common reconciliation patterns
//!
//! Slugs, payload redaction for logs, and the loose comparison used to decide
//! whether a NetBox object differs from a desired payload.

use netbox_client::NetBoxObject;
use serde_json::{Map, Value};

/// Payload keys whose values never reach a log line
const SENSITIVE_KEYS: &[&str] = &["password", "token", "secret"];

/// Lower-case the name and collapse every run of non-word characters into `-`
pub fn make_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if c.is_alphanumeric() || c == '_' {
            slug.extend(c.to_lowercase());
            in_separator = false;
        } else if !in_separator {
            slug.push('-');
            in_separator = true;
        }
    }
    slug
}

/// Redacted copy of a payload, safe to log
pub fn sanitize_payload(payload: &Map<String, Value>) -> Value {
    Value::Object(
        payload
            .iter()
            .map(|(key, value)| (key.clone(), sanitize_value(key, value)))
            .collect(),
    )
}

/// Redacted copy of one value found under `key`
///
/// Sequence elements inherit their parent's key.
pub fn sanitize_value(key: &str, value: &Value) -> Value {
    if SENSITIVE_KEYS.contains(&key) {
        return Value::String("***".to_string());
    }
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(inner_key, inner)| (inner_key.clone(), sanitize_value(inner_key, inner)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|item| sanitize_value(key, item)).collect()),
        other => other.clone(),
    }
}

/// Compare a value returned by NetBox with a desired payload value
///
/// NetBox answers with nested objects where payloads carry ids
/// (`{"id": 3, ...}` vs `3`) and with choice objects where payloads carry the
/// choice (`{"value": "active", ...}` vs `"active"`).
pub fn loosely_equal(have: &Value, want: &Value) -> bool {
    match (have, want) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Object(nested), Value::Number(_) | Value::String(_) | Value::Bool(_)) => nested
            .get("id")
            .or_else(|| nested.get("value"))
            .is_some_and(|inner| loosely_equal(inner, want)),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => n.to_string() == s.trim(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loosely_equal(x, y))
        }
        _ => have == want,
    }
}

/// Fields of `desired` whose values differ from `remote`, with their desired values
///
/// Mapping-valued fields are compared on their first key only; when that
/// differs the whole mapping is sent. Mappings for fields the object does not
/// have are skipped.
pub fn diff_fields(remote: &NetBoxObject, desired: &Map<String, Value>) -> Map<String, Value> {
    let mut changes = Map::new();
    for (key, want) in desired {
        let changed = match want {
            Value::Object(inner) => {
                let Some(have) = remote.field(key) else {
                    continue;
                };
                let Some((inner_key, inner_want)) = inner.iter().next() else {
                    continue;
                };
                !have
                    .get(inner_key)
                    .is_some_and(|inner_have| loosely_equal(inner_have, inner_want))
            }
            _ => !loosely_equal(remote.field(key).unwrap_or(&Value::Null), want),
        };
        if changed {
            changes.insert(key.clone(), want.clone());
        }
    }
    changes
}

/// Query-string form of a payload value used in a lookup
pub fn lookup_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(nested) => nested.get("id").and_then(lookup_value),
        Value::Null | Value::Array(_) => None,
    }
}
