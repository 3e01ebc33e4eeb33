//! # callcache
//!
//! Transparent memoization of function calls over an external key-value
//! store.
//!
//! A call is identified by an optional scope, an operation name, and its
//! arguments. The identity is fingerprinted into a stable key; the store is
//! consulted; on a hit the stored value is decoded and returned, on a miss
//! the computation runs and its result is written back with a TTL.
//!
//! ## Components
//!
//! - [`CallCache`]: the cache-or-compute orchestrator
//! - [`Fingerprinter`]: deterministic keys from call identities
//! - [`CacheStore`]: the store seam ([`MemoryStore`], [`NoopStore`], `RedisStore`)
//! - [`CachedFn`] / [`CacheScope`]: functions registered for caching up front
//!
//! ## Example
//!
//! ```rust
//! use std::convert::Infallible;
//! use std::sync::Arc;
//!
//! use callcache::{CallCache, CallIdentity, MemoryStore};
//!
//! # tokio_test::block_on(async {
//! let cache = CallCache::new(Arc::new(MemoryStore::new()));
//! let identity = CallIdentity::new("getUser").arg(&42).unwrap();
//!
//! let name: String = cache
//!     .cached_call(&identity, Some(20), || async { Ok::<_, Infallible>("Ann".to_string()) })
//!     .await
//!     .unwrap();
//! assert_eq!(name, "Ann");
//! # });
//! ```
//!
//! ## Failure policy
//!
//! - Key errors abort the call before the store is touched.
//! - Store `get` failures and undecodable entries degrade to a miss.
//! - Store `set` failures are logged; the computed value is still returned.
//! - Computation failures are returned unchanged and never cached.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
pub mod codec;
mod config;
mod error;
mod in_flight;
mod stats;
mod wrapper;

pub use cache::CallCache;
pub use config::CallCacheConfig;
pub use error::{CallError, CallResult};
pub use stats::CallCacheStats;
pub use wrapper::{scope_name, CacheScope, CachedFn, IntoArguments};

// Re-export the building blocks
pub use callcache_core::{
    ArgumentFilter, CacheEntry, CacheError, CacheKey, CacheStore, Cacheable, CallIdentity,
    Result, DEFAULT_TTL_SECONDS,
};
pub use callcache_key::{fingerprint, AnyOf, Fingerprinter, KeepAll, KeyEncoding, MarkerField};
pub use callcache_store::{MemoryStore, MemoryStoreConfig, NoopStore, RedisConfig};
#[cfg(feature = "redis")]
pub use callcache_store::RedisStore;
