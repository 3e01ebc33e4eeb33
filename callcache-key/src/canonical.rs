//! Canonical JSON serialization.
//!
//! Object keys are sorted recursively before writing, so two structurally
//! equal values produce identical bytes regardless of how their maps were
//! built (or whether `serde_json` preserves insertion order). Output is
//! compact: no whitespace between tokens.

use serde_json::{Map, Value};

use callcache_core::error::{CacheError, Result};

/// Returns a copy of `value` with every object's keys in sorted order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, child) in entries {
                sorted.insert(key.clone(), canonicalize(child));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Serializes `value` to canonical JSON bytes.
pub fn to_canonical_bytes(value: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec(&canonicalize(value)).map_err(|e| CacheError::Fingerprint(e.to_string()))
}
