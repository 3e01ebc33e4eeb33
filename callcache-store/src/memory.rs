//! In-memory TTL store.
//!
//! Thread-safe, bounded, and driven by the tokio clock so paused-time tests
//! can expire entries deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::trace;

use callcache_core::constants::DEFAULT_MEMORY_CAPACITY;
use callcache_core::error::Result;
use callcache_core::traits::CacheStore;
use callcache_core::types::{CacheEntry, CacheKey};

/// Stored value with its expiry bookkeeping.
#[derive(Clone)]
struct StoredEntry {
    value: Vec<u8>,
    inserted_at: Instant,
    ttl: Duration,
}

impl StoredEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

/// Memory store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Whether to drop expired entries before evicting live ones
    pub auto_cleanup: bool,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MEMORY_CAPACITY,
            auto_cleanup: true,
        }
    }
}

/// In-process key-value store with per-entry TTL.
///
/// Behaves like a single Redis instance for `GET` / `SET .. EX`: expired
/// entries read as absent and each `set` replaces the previous value
/// atomically. At capacity, expired entries are dropped first, then the
/// oldest entry is evicted.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
    config: MemoryStoreConfig,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl MemoryStore {
    /// Creates a store with default configuration.
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    /// Creates a store with custom configuration.
    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Returns the live value under `key`, if any.
    pub fn peek(&self, key: &CacheKey) -> Option<Vec<u8>> {
        let entries = self.entries.read();
        entries
            .get(key.as_str())
            .filter(|e| !e.is_expired())
            .map(|e| e.value.clone())
    }

    /// Returns the remaining TTL of a live entry.
    pub fn ttl_remaining(&self, key: &CacheKey) -> Option<Duration> {
        let entries = self.entries.read();
        entries
            .get(key.as_str())
            .filter(|e| !e.is_expired())
            .map(|e| e.ttl.saturating_sub(e.inserted_at.elapsed()))
    }

    /// Writes raw bytes under `key`, bypassing the `CacheStore` counters.
    ///
    /// Useful for seeding fixtures such as corrupt entries.
    pub fn insert_raw(&self, key: &CacheKey, value: Vec<u8>, ttl: Duration) {
        self.insert(key.as_str().to_string(), value, ttl);
    }

    fn insert(&self, key: String, value: Vec<u8>, ttl: Duration) {
        let mut entries = self.entries.write();

        if !entries.contains_key(&key) {
            if self.config.auto_cleanup && entries.len() >= self.config.max_entries {
                entries.retain(|_, e| !e.is_expired());
            }
            if entries.len() >= self.config.max_entries {
                if let Some(oldest_key) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone())
                {
                    trace!(key = %oldest_key, "Evicting oldest entry");
                    entries.remove(&oldest_key);
                }
            }
        }

        entries.insert(key, StoredEntry {
            value,
            inserted_at: Instant::now(),
            ttl,
        });
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Removes all expired entries.
    pub fn cleanup_expired(&self) {
        self.entries.write().retain(|_, e| !e.is_expired());
    }

    /// Returns the number of entries, including expired ones not yet dropped.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns store statistics.
    pub fn stats(&self) -> MemoryStoreStats {
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired()).count();
        MemoryStoreStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            capacity: self.config.max_entries,
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.peek(key))
    }

    async fn set(&self, key: &CacheKey, entry: CacheEntry) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let ttl = entry.ttl();
        self.insert(key.as_str().to_string(), entry.value, ttl);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Memory store statistics.
#[derive(Clone, Debug)]
pub struct MemoryStoreStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries
    pub expired_entries: usize,
    /// Valid (non-expired) entries
    pub valid_entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// `get` calls served
    pub reads: u64,
    /// `set` calls served
    pub writes: u64,
}
