//! Backing store connection settings.

use serde::{Deserialize, Serialize};

use callcache_core::constants::{DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT};

/// Redis connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Server host name
    pub host: String,
    /// Server port
    pub port: u16,
    /// Logical database index
    pub db: i64,
    /// Password for `AUTH`, if the server requires one
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_REDIS_HOST.into(),
            port: DEFAULT_REDIS_PORT,
            db: 0,
            password: None,
        }
    }
}

impl RedisConfig {
    /// Creates a config for `host:port` on database 0.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Loads settings from the environment (and `.env`, if present).
    ///
    /// Reads `CALLCACHE_REDIS_HOST`, `CALLCACHE_REDIS_PORT`,
    /// `CALLCACHE_REDIS_DB`, and `CALLCACHE_REDIS_PASSWORD`; absent or
    /// unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            host: std::env::var("CALLCACHE_REDIS_HOST").unwrap_or(defaults.host),
            port: std::env::var("CALLCACHE_REDIS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            db: std::env::var("CALLCACHE_REDIS_DB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db),
            password: std::env::var("CALLCACHE_REDIS_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }

    /// Sets the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the database index.
    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Returns the connection URL, `redis://[:password@]host:port/db`.
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    /// Returns `host:port/db` without credentials, for logs.
    pub fn display_addr(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db)
    }
}
