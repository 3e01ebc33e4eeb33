//! Store that caches nothing.

use async_trait::async_trait;

use callcache_core::error::Result;
use callcache_core::traits::CacheStore;
use callcache_core::types::{CacheEntry, CacheKey};

/// Always misses and discards writes.
///
/// Plug this in to disable caching without changing call sites: every call
/// runs its computation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStore;

#[async_trait]
impl CacheStore for NoopStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &CacheKey, _entry: CacheEntry) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "noop"
    }
}
