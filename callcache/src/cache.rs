//! The cache-or-compute orchestrator.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use callcache_core::error::{CacheError, Result};
use callcache_core::traits::{ArgumentFilter, CacheStore, Cacheable};
use callcache_core::types::{CacheEntry, CacheKey, CallIdentity};
use callcache_key::Fingerprinter;

use crate::codec;
use crate::config::CallCacheConfig;
use crate::error::{CallError, CallResult};
use crate::in_flight::KeyLocks;
use crate::stats::{CallCacheStats, Counters};

/// Memoizes calls in a [`CacheStore`].
///
/// Each call runs one sequential protocol:
///
/// 1. fingerprint the call identity (errors abort before store access)
/// 2. `get` the key; a hit is decoded and returned without computing
/// 3. on a miss, run the computation; failures are returned, never cached
/// 4. encode the result and `set` it with the TTL, then return it
///
/// Store `get` failures and undecodable entries count as misses; a failed
/// `set` is logged and the computed value is still returned. Without
/// `dedupe_in_flight`, concurrent misses on one key each compute and the
/// last write wins.
///
/// The store is injected, so tests can pass a [`MemoryStore`] and
/// production a `RedisStore`.
///
/// [`MemoryStore`]: callcache_store::MemoryStore
pub struct CallCache {
    store: Arc<dyn CacheStore>,
    fingerprinter: Fingerprinter,
    config: CallCacheConfig,
    in_flight: Option<KeyLocks>,
    counters: Counters,
}

impl CallCache {
    /// Creates a cache over `store` with default configuration.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            fingerprinter: Fingerprinter::new(),
            config: CallCacheConfig::default(),
            in_flight: None,
            counters: Counters::default(),
        }
    }

    /// Creates a cache over `store` with custom configuration.
    pub fn with_config(store: Arc<dyn CacheStore>, config: CallCacheConfig) -> Result<Self> {
        config.validate()?;
        let fingerprinter = config.fingerprinter()?;
        let in_flight = config.dedupe_in_flight.then(KeyLocks::new);

        Ok(Self {
            store,
            fingerprinter,
            config,
            in_flight,
            counters: Counters::default(),
        })
    }

    /// Replaces the argument filter.
    pub fn with_filter(mut self, filter: impl ArgumentFilter + 'static) -> Self {
        self.fingerprinter = self.fingerprinter.with_filter(filter);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CallCacheConfig {
        &self.config
    }

    /// Returns the backing store.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Returns the key `identity` is cached under.
    pub fn fingerprint(&self, identity: &CallIdentity) -> Result<CacheKey> {
        self.fingerprinter.fingerprint(identity)
    }

    /// Returns a snapshot of the hit/miss counters.
    pub fn stats(&self) -> CallCacheStats {
        self.counters.snapshot()
    }

    /// Returns the cached result for `identity`, or runs `compute` and caches it.
    ///
    /// `ttl_seconds` defaults to the configured TTL; `Some(0)` is rejected.
    /// `compute` runs at most once and never on a hit.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let identity = CallIdentity::new("getUser").with_scope("UserService").arg(&id)?;
    /// let user: User = cache
    ///     .cached_call(&identity, None, || repo.fetch_user(id))
    ///     .await?;
    /// ```
    #[instrument(skip_all, fields(operation = %identity.qualified_name()))]
    pub async fn cached_call<T, E, F, Fut>(
        &self,
        identity: &CallIdentity,
        ttl_seconds: Option<u64>,
        compute: F,
    ) -> CallResult<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let ttl_seconds = self.resolve_ttl(ttl_seconds)?;
        let key = self.fingerprinter.fingerprint(identity)?;

        if let Some(value) = self.lookup(&key).await {
            return Ok(value);
        }

        let _in_flight = match &self.in_flight {
            Some(locks) => {
                let guard = locks.acquire(&key).await;
                // Another caller may have filled the key while we waited
                if let Some(value) = self.lookup(&key).await {
                    return Ok(value);
                }
                Some(guard)
            }
            None => None,
        };

        self.counters.miss();
        debug!(%key, "Cache miss, computing");

        let value = match compute().await {
            Ok(value) => value,
            Err(e) => {
                self.counters.compute_error();
                debug!(%key, "Computation failed, nothing cached");
                return Err(CallError::Compute(e));
            }
        };

        self.write(&key, &value, ttl_seconds).await;
        Ok(value)
    }

    /// [`cached_call`](Self::cached_call) for a synchronous computation.
    pub async fn cached_call_sync<T, E, F>(
        &self,
        identity: &CallIdentity,
        ttl_seconds: Option<u64>,
        compute: F,
    ) -> CallResult<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        self.cached_call(identity, ttl_seconds, move || futures::future::ready(compute()))
            .await
    }

    /// Runs a [`Cacheable`] computation through the cache.
    pub async fn run<C>(&self, cacheable: &C) -> CallResult<C::Output, C::Error>
    where
        C: Cacheable + ?Sized,
    {
        let identity = cacheable.identity()?;
        self.cached_call(&identity, cacheable.ttl_seconds(), || cacheable.compute())
            .await
    }

    fn resolve_ttl(&self, ttl_seconds: Option<u64>) -> Result<u64> {
        match ttl_seconds {
            Some(0) => Err(CacheError::InvalidTtl(0)),
            Some(ttl) => Ok(ttl),
            None => Ok(self.config.default_ttl_seconds),
        }
    }

    /// Reads and decodes `key`; every failure reads as a miss.
    async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                self.counters.store_error();
                warn!(%key, error = %e, "Store get failed, treating as miss");
                return None;
            }
        };

        match codec::decode(&bytes) {
            Ok(value) => {
                self.counters.hit();
                debug!(%key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                self.counters.decode_error();
                warn!(%key, error = %e, "Stored value failed to decode, recomputing");
                None
            }
        }
    }

    /// Encodes and stores `value`; failures are logged, never returned.
    async fn write<T: Serialize>(&self, key: &CacheKey, value: &T, ttl_seconds: u64) {
        let entry = match codec::encode(value).and_then(|bytes| CacheEntry::new(bytes, ttl_seconds)) {
            Ok(entry) => entry,
            Err(e) => {
                self.counters.encode_error();
                warn!(%key, error = %e, "Result not encodable, returning uncached");
                return;
            }
        };

        match self.store.set(key, entry).await {
            Ok(()) => {
                self.counters.write();
                debug!(%key, ttl_seconds, backend = self.store.backend_name(), "Stored result");
            }
            Err(e) => {
                self.counters.store_error();
                warn!(%key, error = %e, "Store set failed, returning uncached result");
            }
        }
    }
}

impl std::fmt::Debug for CallCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallCache")
            .field("backend", &self.store.backend_name())
            .field("fingerprinter", &self.fingerprinter)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use callcache_store::MemoryStore;

    #[tokio::test]
    async fn test_zero_ttl_rejected_before_store_access() {
        let store = Arc::new(MemoryStore::new());
        let cache = CallCache::new(store.clone());
        let identity = CallIdentity::new("op");

        let result: CallResult<u32, Infallible> =
            cache.cached_call(&identity, Some(0), || async { Ok(1) }).await;

        assert!(matches!(result, Err(CallError::Cache(CacheError::InvalidTtl(0)))));
        assert_eq!(store.stats().reads, 0);
    }

    #[tokio::test]
    async fn test_default_ttl_from_config() {
        let store = Arc::new(MemoryStore::new());
        let cache = CallCache::with_config(
            store.clone(),
            CallCacheConfig::default().with_default_ttl(90),
        )
        .unwrap();
        let identity = CallIdentity::new("op");

        cache
            .cached_call_sync(&identity, None, || Ok::<_, Infallible>(1u32))
            .await
            .unwrap();

        let key = cache.fingerprint(&identity).unwrap();
        let remaining = store.ttl_remaining(&key).unwrap();
        assert!(remaining.as_secs() > 20 && remaining.as_secs() <= 90);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = CallCache::with_config(
            Arc::new(MemoryStore::new()),
            CallCacheConfig::default().with_default_ttl(0),
        );
        assert!(matches!(result, Err(CacheError::ConfigError(_))));
    }

    #[test]
    fn test_debug_names_backend() {
        let cache = CallCache::new(Arc::new(MemoryStore::new()));
        assert!(format!("{cache:?}").contains("memory"));
    }
}
