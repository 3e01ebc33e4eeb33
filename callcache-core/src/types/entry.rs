//! Cache entries as written to a store.

use std::time::Duration;

use crate::error::{CacheError, Result};

/// An encoded call result and the TTL it is written with.
///
/// Entries are created on a successful miss and expire through the store's
/// own mechanism; callcache never deletes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// Encoded computation result
    pub value: Vec<u8>,
    /// Seconds until the store expires the entry
    pub ttl_seconds: u64,
}

impl CacheEntry {
    /// Creates an entry, rejecting a zero TTL.
    pub fn new(value: Vec<u8>, ttl_seconds: u64) -> Result<Self> {
        if ttl_seconds == 0 {
            return Err(CacheError::InvalidTtl(ttl_seconds));
        }
        Ok(Self { value, ttl_seconds })
    }

    /// Returns the TTL as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}
