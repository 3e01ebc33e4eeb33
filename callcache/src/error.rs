//! Errors returned by cached calls.

use thiserror::Error;

use callcache_core::error::CacheError;

/// Result of a cached call whose computation fails with `E`.
pub type CallResult<T, E> = std::result::Result<T, CallError<E>>;

/// Failure of a cached call.
///
/// Separates errors raised by the caching layer itself from the
/// computation's own error, which is carried unchanged.
#[derive(Debug, Error)]
pub enum CallError<E> {
    /// No cache key could be produced or the TTL was invalid.
    ///
    /// Raised before any store access; the caller may fall back to
    /// invoking the computation directly.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The underlying computation failed. Nothing was cached.
    #[error("computation failed: {0}")]
    Compute(E),
}

impl<E> CallError<E> {
    /// Returns true if the computation itself failed.
    pub fn is_compute(&self) -> bool {
        matches!(self, CallError::Compute(_))
    }

    /// Returns the computation's error, if that is what failed.
    pub fn into_compute(self) -> Option<E> {
        match self {
            CallError::Compute(e) => Some(e),
            CallError::Cache(_) => None,
        }
    }

    /// Returns the caching-layer error, if that is what failed.
    pub fn as_cache(&self) -> Option<&CacheError> {
        match self {
            CallError::Cache(e) => Some(e),
            CallError::Compute(_) => None,
        }
    }
}
