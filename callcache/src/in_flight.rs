//! Per-key locks for de-duplicating concurrent misses.
//!
//! The first caller to miss on a key takes its lock and computes; later
//! callers wait on the lock and then re-read the store, finding the value
//! the first caller wrote. A lock entry is dropped from the map when its
//! last holder releases it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use callcache_core::types::CacheKey;

type LockMap = DashMap<CacheKey, Arc<Mutex<()>>>;

#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    locks: Arc<LockMap>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits until no other caller holds the lock for `key`.
    pub(crate) async fn acquire(&self, key: &CacheKey) -> KeyLockGuard {
        let lock = Arc::clone(self.locks.entry(key.clone()).or_default().value());

        let mut held = KeyLockGuard {
            locks: Arc::clone(&self.locks),
            key: key.clone(),
            lock: Some(Arc::clone(&lock)),
            guard: None,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }

    /// Number of keys with a holder or waiter.
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Holds a key's lock; releases it and prunes the map on drop.
pub(crate) struct KeyLockGuard {
    locks: Arc<LockMap>,
    key: CacheKey,
    lock: Option<Arc<Mutex<()>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyLockGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.lock.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lock_released_and_pruned() {
        let locks = KeyLocks::new();
        let key = CacheKey::new("k");

        let guard = locks.acquire(&key).await;
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_second_caller_waits() {
        let locks = Arc::new(KeyLocks::new());
        let key = CacheKey::new("k");

        let first = locks.acquire(&key).await;

        let waiter = {
            let locks = Arc::clone(&locks);
            let key = key.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&key).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyLocks::new();
        let _a = locks.acquire(&CacheKey::new("a")).await;
        let _b = locks.acquire(&CacheKey::new("b")).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_does_not_leak() {
        let locks = KeyLocks::new();
        let key = CacheKey::new("k");

        let first = locks.acquire(&key).await;
        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), locks.acquire(&key)).await;
        assert!(timed_out.is_err());

        drop(first);
        assert_eq!(locks.len(), 0);
    }
}
