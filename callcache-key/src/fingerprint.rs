//! Call fingerprinting.
//!
//! A fingerprint is built in four steps:
//!
//! 1. drop every argument the filter excludes, keeping the order of the rest
//! 2. build the tuple `[qualified_name, ...arguments]`
//! 3. serialize the tuple as canonical JSON
//! 4. encode the bytes as an ASCII-safe string
//!
//! With [`KeyEncoding::Base64`] the key is byte-for-byte the standard base64
//! of the JSON text, so `getUser(42)` is stored under `WyJnZXRVc2VyIiw0Ml0=`.
//!
//! ## Digest keys
//!
//! [`KeyEncoding::Sha3Digest`] hashes the canonical bytes instead, giving a
//! fixed-length key for large argument lists:
//!
//! ```text
//! key = hex(SHA3-256(len(domain) || domain || canonical_bytes))
//! ```

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha3::{Digest, Sha3_256};

use callcache_core::constants::DOMAIN_CACHE_KEY;
use callcache_core::error::{CacheError, Result};
use callcache_core::traits::ArgumentFilter;
use callcache_core::types::{CacheKey, CallIdentity};

use crate::canonical::to_canonical_bytes;
use crate::filter::KeepAll;

/// How canonical bytes are turned into a key string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEncoding {
    /// Standard base64 alphabet with padding
    #[default]
    Base64,
    /// URL-safe base64 without padding
    Base64Url,
    /// Hex SHA3-256 digest with domain separation
    Sha3Digest,
}

impl KeyEncoding {
    /// Parses an encoding name (`base64`, `base64_url`, `sha3_digest`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "base64" => Some(KeyEncoding::Base64),
            "base64_url" | "base64url" => Some(KeyEncoding::Base64Url),
            "sha3_digest" | "sha3" => Some(KeyEncoding::Sha3Digest),
            _ => None,
        }
    }

    /// Encodes canonical bytes into a key string.
    pub fn encode(&self, canonical: &[u8]) -> String {
        match self {
            KeyEncoding::Base64 => STANDARD.encode(canonical),
            KeyEncoding::Base64Url => URL_SAFE_NO_PAD.encode(canonical),
            KeyEncoding::Sha3Digest => hex::encode(digest(canonical)),
        }
    }
}

/// SHA3-256 over the length-prefixed domain separator and `input`.
fn digest(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update((DOMAIN_CACHE_KEY.len() as u32).to_le_bytes());
    hasher.update(DOMAIN_CACHE_KEY);
    hasher.update(input);
    hasher.finalize().into()
}

/// Builds cache keys from call identities.
///
/// Pure and deterministic: the same identity yields the same key in every
/// process, given the same filter, encoding, and prefix.
#[derive(Clone)]
pub struct Fingerprinter {
    filter: Arc<dyn ArgumentFilter>,
    encoding: KeyEncoding,
    prefix: Option<String>,
}

impl Fingerprinter {
    /// Creates a fingerprinter that keeps every argument and encodes base64.
    pub fn new() -> Self {
        Self {
            filter: Arc::new(KeepAll),
            encoding: KeyEncoding::default(),
            prefix: None,
        }
    }

    /// Sets the argument filter.
    pub fn with_filter(mut self, filter: impl ArgumentFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// Sets the argument filter from a shared handle.
    pub fn with_shared_filter(mut self, filter: Arc<dyn ArgumentFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the key encoding.
    pub fn with_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Prepends `prefix` to every key.
    ///
    /// The prefix must be non-empty printable ASCII without whitespace.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        self.prefix = Some(prefix);
        Ok(self)
    }

    /// Returns the key encoding.
    pub fn encoding(&self) -> KeyEncoding {
        self.encoding
    }

    /// Returns the key prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the canonical JSON bytes the key is derived from.
    pub fn canonical_form(&self, identity: &CallIdentity) -> Result<Vec<u8>> {
        canonical_tuple(identity, self.filter.as_ref())
    }

    /// Computes the cache key for `identity`.
    pub fn fingerprint(&self, identity: &CallIdentity) -> Result<CacheKey> {
        let canonical = self.canonical_form(identity)?;
        let encoded = self.encoding.encode(&canonical);

        Ok(match &self.prefix {
            Some(prefix) => CacheKey::new(format!("{prefix}{encoded}")),
            None => CacheKey::new(encoded),
        })
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Fingerprinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fingerprinter")
            .field("encoding", &self.encoding)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Checks that a key prefix is non-empty printable ASCII without whitespace.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(CacheError::ConfigError(format!(
            "key prefix must be printable ASCII without whitespace: {prefix:?}"
        )));
    }
    Ok(())
}

/// Computes the base64 cache key for `identity` under `filter`.
pub fn fingerprint(identity: &CallIdentity, filter: &dyn ArgumentFilter) -> Result<CacheKey> {
    let canonical = canonical_tuple(identity, filter)?;
    Ok(CacheKey::new(KeyEncoding::Base64.encode(&canonical)))
}

/// Canonical bytes of `[qualified_name, ...arguments kept by filter]`.
fn canonical_tuple(identity: &CallIdentity, filter: &dyn ArgumentFilter) -> Result<Vec<u8>> {
    identity.validate()?;

    let mut tuple = Vec::with_capacity(identity.arguments.len() + 1);
    tuple.push(Value::String(identity.qualified_name()));
    tuple.extend(
        identity
            .arguments
            .iter()
            .filter(|argument| !filter.excludes(argument))
            .cloned(),
    );

    to_canonical_bytes(&Value::Array(tuple))
}
