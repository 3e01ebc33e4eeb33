//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use callcache::{CacheEntry, CacheError, CacheKey, CacheStore, Result};

/// Routes `tracing` output through the test harness; `RUST_LOG` filters it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

pub fn ann() -> User {
    User {
        id: 42,
        name: "Ann".into(),
    }
}

/// Counts how many times a computation actually ran.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Store whose reads and/or writes always fail.
#[derive(Default)]
pub struct FailingStore {
    pub fail_get: bool,
    pub fail_set: bool,
    pub sets: AtomicUsize,
}

impl FailingStore {
    pub fn failing_get() -> Self {
        Self {
            fail_get: true,
            ..Self::default()
        }
    }

    pub fn failing_set() -> Self {
        Self {
            fail_set: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>> {
        if self.fail_get {
            return Err(CacheError::store("failing", "connection refused"));
        }
        Ok(None)
    }

    async fn set(&self, _key: &CacheKey, _entry: CacheEntry) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_set {
            return Err(CacheError::store("failing", "connection reset"));
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
