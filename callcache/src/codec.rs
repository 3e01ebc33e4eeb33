//! Value codec: JSON text.
//!
//! Any value `serde_json` can round-trip is cacheable. Values serialize
//! compactly, so a user `{id: 42, name: "Ann"}` is stored as
//! `{"id":42,"name":"Ann"}`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use callcache_core::error::{CacheError, Result};

/// Encodes a computed value for storage.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Encode(e.to_string()))
}

/// Decodes a stored value.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))
}
