//! Filter matching and display helpers for the mock client

use crate::models::NetBoxObject;
use serde_json::{Map, Value};

/// Whether an object satisfies every filter
pub(crate) fn matches_all(object: &NetBoxObject, filters: &[(&str, &str)]) -> bool {
    filters
        .iter()
        .all(|(key, expected)| matches_filter(object, key, expected))
}

fn matches_filter(object: &NetBoxObject, key: &str, expected: &str) -> bool {
    if key == "id" {
        return object.id.to_string() == expected;
    }
    if let Some(value) = object.field(key) {
        return value_matches(value, expected);
    }
    // device_id, virtual_machine_id, bridge_id, ... filter on a nested reference
    match key.strip_suffix("_id").and_then(|base| object.field(base)) {
        Some(value) => value_matches(value, expected),
        None => false,
    }
}

fn value_matches(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        Value::Object(nested) => ["id", "value"]
            .iter()
            .filter_map(|k| nested.get(*k))
            .any(|inner| value_matches(inner, expected)),
        _ => false,
    }
}

/// NetBox's `display` is usually the object's name; fall back to the id
pub(crate) fn display_name(fields: &Map<String, Value>, id: u64) -> String {
    ["name", "model", "address", "mac_address"]
        .iter()
        .find_map(|k| fields.get(*k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}
