//! Error types for callcache.
//!
//! One error enum covers key construction, store access, and the value codec.
//! Only key and TTL errors reach callers of a cached call; store and codec
//! errors are logged and absorbed by the orchestrator.

use thiserror::Error;

/// Result type alias using `CacheError`.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Main error type for all callcache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    // ═══════════════════════════════════════════════════════════════════════════
    // KEY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The call identity has no operation name.
    #[error("Call identity has an empty operation name")]
    EmptyOperation,

    /// An argument has no canonical serialized form.
    #[error("Fingerprint failed: {0}")]
    Fingerprint(String),

    /// A TTL of zero seconds was requested.
    #[error("Invalid TTL: {0}s (must be positive)")]
    InvalidTtl(u64),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The backing store could not serve a `get` or `set`.
    #[error("Store '{backend}' unavailable: {reason}")]
    StoreUnavailable {
        /// Backend that failed (`redis`, `memory`, ...)
        backend: &'static str,
        /// Underlying failure
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // CODEC ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A computed value could not be encoded for storage.
    #[error("Encode error: {0}")]
    Encode(String),

    /// A stored value could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CacheError {
    /// Creates a store error for the given backend.
    pub fn store(backend: &'static str, reason: impl std::fmt::Display) -> Self {
        CacheError::StoreUnavailable {
            backend,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::store("redis", "connection refused");
        assert!(err.to_string().contains("redis"));
        assert!(err.to_string().contains("connection refused"));

        let err = CacheError::InvalidTtl(0);
        assert!(err.to_string().contains("0s"));
    }

    #[test]
    fn test_store_constructor() {
        match CacheError::store("memory", 42) {
            CacheError::StoreUnavailable { backend, reason } => {
                assert_eq!(backend, "memory");
                assert_eq!(reason, "42");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
