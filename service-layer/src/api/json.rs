//! Case-insensitive decoding of response bodies
//!
//! Service Layer field casing is not always consistent with the declared
//! shape, so object keys are matched against the target's wire names ignoring
//! ASCII case before serde sees them.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Result;

/// Rename keys of a JSON object to the matching name in `names`.
///
/// Exact matches are kept; keys with no case-insensitive match pass through
/// untouched. Non-object values are returned unchanged.
pub fn normalize_keys<N: AsRef<str>>(value: Value, names: &[N]) -> Value {
    match value {
        Value::Object(object) => {
            let mut normalized = Map::with_capacity(object.len());
            for (key, value) in object {
                let renamed = if names.iter().any(|n| n.as_ref() == key) {
                    key
                } else {
                    names
                        .iter()
                        .find(|n| n.as_ref().eq_ignore_ascii_case(&key))
                        .map(|n| n.as_ref().to_string())
                        .unwrap_or(key)
                };
                normalized.insert(renamed, value);
            }
            Value::Object(normalized)
        }
        other => other,
    }
}

/// Decode a single object
pub fn decode<T: DeserializeOwned, N: AsRef<str>>(body: &str, names: &[N]) -> Result<T> {
    let value: Value = serde_json::from_str(strip_bom(body))?;
    Ok(serde_json::from_value(normalize_keys(value, names))?)
}

/// Decode the `{ "value": [...] }` collection envelope
pub fn decode_envelope<T: DeserializeOwned, N: AsRef<str>>(
    body: &str,
    names: &[N],
) -> Result<Vec<T>> {
    let envelope: Value = serde_json::from_str(strip_bom(body))?;
    let items = match normalize_keys(envelope, &["value"]) {
        Value::Object(mut object) => object.remove("value").unwrap_or(Value::Array(Vec::new())),
        other => other,
    };

    let items = match items {
        Value::Array(items) => items
            .into_iter()
            .map(|item| normalize_keys(item, names))
            .collect(),
        other => other,
    };

    Ok(serde_json::from_value(items)?)
}

/// Decode the bare integer returned by `$count`
pub fn decode_count(body: &str) -> Result<u64> {
    Ok(serde_json::from_str(strip_bom(body).trim())?)
}

fn strip_bom(body: &str) -> &str {
    body.trim_start_matches('\u{feff}')
}
