//! # callcache Stores
//!
//! Backing store adapters implementing [`CacheStore`].
//!
//! This crate provides:
//!
//! - **Memory**: thread-safe in-process TTL store for tests and single-process use
//! - **Noop**: always misses, discards writes (caching disabled)
//! - **Redis**: `GET` / `SET .. EX` over a managed async connection (feature `redis`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use callcache_store::{RedisConfig, RedisStore};
//!
//! let store = RedisStore::connect(RedisConfig::from_env()).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod memory;
mod noop;
#[cfg(feature = "redis")]
mod redis;

pub use config::RedisConfig;
pub use memory::{MemoryStore, MemoryStoreConfig, MemoryStoreStats};
pub use noop::NoopStore;
#[cfg(feature = "redis")]
pub use crate::redis::RedisStore;

// Re-export the trait from core
pub use callcache_core::traits::CacheStore;
