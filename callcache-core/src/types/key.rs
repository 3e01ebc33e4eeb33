//! Cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque, ASCII-safe key a call result is stored under.
///
/// Produced by the fingerprinter; stores treat it as an uninterpreted string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wraps an already-encoded key.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the key is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_accessors() {
        let key = CacheKey::new("WyJnZXRVc2VyIiw0Ml0=");
        assert_eq!(key.as_str(), "WyJnZXRVc2VyIiw0Ml0=");
        assert_eq!(key.to_string(), "WyJnZXRVc2VyIiw0Ml0=");
        assert_eq!(key.len(), 20);
        assert!(!key.is_empty());
        assert_eq!(key.into_string(), "WyJnZXRVc2VyIiw0Ml0=");
    }

    #[test]
    fn test_key_serializes_transparently() {
        let key = CacheKey::new("abc");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"abc\"");
    }
}
