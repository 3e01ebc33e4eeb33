//! Hit/miss accounting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a cache's counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallCacheStats {
    /// Lookups answered from the store
    pub hits: u64,
    /// Lookups that ran the computation
    pub misses: u64,
    /// Successful store writes
    pub writes: u64,
    /// Failed store reads or writes
    pub store_errors: u64,
    /// Stored values that failed to decode
    pub decode_errors: u64,
    /// Computed values that could not be encoded
    pub encode_errors: u64,
    /// Computations that failed
    pub compute_errors: u64,
}

impl CallCacheStats {
    /// Fraction of lookups served from the store, `0.0` with no lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    store_errors: AtomicU64,
    decode_errors: AtomicU64,
    encode_errors: AtomicU64,
    compute_errors: AtomicU64,
}

impl Counters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn compute_error(&self) {
        self.compute_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CallCacheStats {
        CallCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            compute_errors: self.compute_errors.load(Ordering::Relaxed),
        }
    }
}
