//! Flatten JSON attribute values into Terraform's flatmap representation.
//!
//! - scalars: `name = value` (`null` is omitted)
//! - lists: `name.# = len`, then `name.0`, `name.1`, ...
//! - maps / objects: `name.% = len`, then `name.key`

use std::collections::BTreeMap;

use serde_json::Value;

/// Flatten the attribute object of a resource instance.
/// Non-object input yields an empty map.
pub fn flatten(values: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if let Value::Object(map) = values {
        for (key, value) in map {
            flatten_into(key, value, &mut out);
        }
    }
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Array(items) => {
            out.insert(format!("{}.#", prefix), items.len().to_string());
            for (i, item) in items.iter().enumerate() {
                flatten_into(&format!("{}.{}", prefix, i), item, out);
            }
        }
        Value::Object(map) => {
            out.insert(format!("{}.%", prefix), map.len().to_string());
            for (key, item) in map {
                flatten_into(&format!("{}.{}", prefix, key), item, out);
            }
        }
    }
}
