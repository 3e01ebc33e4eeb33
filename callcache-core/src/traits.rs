//! Common traits for callcache.
//!
//! These are the seams between the caching protocol and its collaborators:
//! the backing store, the argument filter policy, and the computations
//! being cached.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::types::{CacheEntry, CacheKey, CallIdentity};

// ═══════════════════════════════════════════════════════════════════════════════
// STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for the external key-value store.
///
/// Implementations might use:
/// - Redis (`GET key`, `SET key value EX ttl`)
/// - An in-process map (for testing/single-process deployments)
/// - Nothing at all (caching disabled)
///
/// Keys are independent; no transactional guarantees are expected across
/// keys. A `set` must be atomic per key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetches the raw value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent or expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;

    /// Stores `entry` under `key`, expiring it after `entry.ttl_seconds`.
    async fn set(&self, key: &CacheKey, entry: CacheEntry) -> Result<()>;

    /// Returns a short name for the backend, used in logs and errors.
    fn backend_name(&self) -> &'static str;
}

// ═══════════════════════════════════════════════════════════════════════════════
// ARGUMENT FILTER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Policy deciding which arguments are left out of the cache key.
///
/// Used to strip request-scoped context objects so calls that differ only
/// in those objects share a cache entry.
pub trait ArgumentFilter: Send + Sync {
    /// Returns true if `argument` must not contribute to the key.
    fn excludes(&self, argument: &Value) -> bool;
}

impl<F> ArgumentFilter for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn excludes(&self, argument: &Value) -> bool {
        self(argument)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CACHEABLE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// A computation that knows its own call identity.
///
/// Concrete operations adapt to this interface explicitly at composition
/// time instead of being intercepted at runtime.
#[async_trait]
pub trait Cacheable: Send + Sync {
    /// Value produced by the computation.
    type Output: Serialize + DeserializeOwned + Send;

    /// Failure produced by the computation.
    type Error: Send;

    /// Returns the identity this computation is cached under.
    fn identity(&self) -> Result<CallIdentity>;

    /// TTL override for this computation; `None` uses the cache default.
    fn ttl_seconds(&self) -> Option<u64> {
        None
    }

    /// Runs the underlying computation.
    async fn compute(&self) -> std::result::Result<Self::Output, Self::Error>;
}
