//! Redis-backed store.
//!
//! Uses a [`ConnectionManager`], which reconnects transparently, so one
//! store can be cloned and shared across tasks.

use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use tracing::{info, instrument};

use callcache_core::error::{CacheError, Result};
use callcache_core::traits::CacheStore;
use callcache_core::types::{CacheEntry, CacheKey};

use crate::config::RedisConfig;

const BACKEND: &str = "redis";

/// Store speaking `GET key` and `SET key value EX ttl` to a Redis server.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    config: RedisConfig,
}

impl RedisStore {
    /// Connects to the server described by `config`.
    #[instrument(skip(config), fields(addr = %config.display_addr()))]
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let client = Client::open(config.url()).map_err(|e| CacheError::store(BACKEND, e))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::store(BACKEND, e))?;

        info!("Connected to Redis");
        Ok(Self { conn, config })
    }

    /// Wraps an existing connection manager.
    pub fn from_connection(conn: ConnectionManager, config: RedisConfig) -> Self {
        Self { conn, config }
    }

    /// Returns the connection settings.
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Checks that the server answers `PING`.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = ::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::store(BACKEND, e))?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn
            .get(key.as_str())
            .await
            .map_err(|e| CacheError::store(BACKEND, e))?;
        Ok(value)
    }

    async fn set(&self, key: &CacheKey, entry: CacheEntry) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key.as_str(), entry.value, entry.ttl_seconds)
            .await
            .map_err(|e| CacheError::store(BACKEND, e))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}
