//! JSON documents stored under entry keys.
//!
//! Values arrive as raw bytes and are re-serialized before they reach the
//! store, so only semantic equality with the input is preserved.

use serde_json::Value;

use crate::error::KvError;

/// Parse `raw` as a JSON object and return its canonical byte form.
///
/// Object keys come out sorted and insignificant whitespace is dropped.
pub fn canonicalize(raw: &[u8]) -> Result<Vec<u8>, KvError> {
    let doc: Value =
        serde_json::from_slice(raw).map_err(|e| KvError::InvalidInput(e.to_string()))?;
    canonical_bytes(&doc)
}

/// Canonical bytes for an already parsed document.
pub fn canonical_bytes(doc: &Value) -> Result<Vec<u8>, KvError> {
    match doc {
        Value::Object(_) => serde_json::to_vec(&sort_keys(doc))
            .map_err(|e| KvError::InvalidInput(e.to_string())),
        other => Err(KvError::InvalidInput(format!(
            "expected a JSON object, got {}",
            kind_name(other)
        ))),
    }
}

// Map ordering depends on serde_json features, so sort explicitly.
fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
