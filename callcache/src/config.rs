//! Cache configuration.

use serde::{Deserialize, Serialize};

use callcache_core::constants::DEFAULT_TTL_SECONDS;
use callcache_core::error::{CacheError, Result};
use callcache_key::{validate_prefix, Fingerprinter, KeyEncoding, MarkerField};

/// Settings for a [`CallCache`](crate::CallCache).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallCacheConfig {
    /// TTL for writes that do not pass one
    pub default_ttl_seconds: u64,
    /// How canonical call bytes become key strings
    pub key_encoding: KeyEncoding,
    /// Namespace prepended to every key
    pub key_prefix: Option<String>,
    /// Leave out object arguments carrying this field
    pub exclude_marker_field: Option<String>,
    /// Serialize concurrent misses for the same key
    pub dedupe_in_flight: bool,
}

impl Default for CallCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            key_encoding: KeyEncoding::Base64,
            key_prefix: None,
            exclude_marker_field: None,
            dedupe_in_flight: false,
        }
    }
}

impl CallCacheConfig {
    /// Loads settings from the environment (and `.env`, if present).
    ///
    /// | Variable                     | Field                  |
    /// |------------------------------|------------------------|
    /// | `CALLCACHE_DEFAULT_TTL`      | `default_ttl_seconds`  |
    /// | `CALLCACHE_KEY_ENCODING`     | `key_encoding`         |
    /// | `CALLCACHE_KEY_PREFIX`       | `key_prefix`           |
    /// | `CALLCACHE_EXCLUDE_MARKER`   | `exclude_marker_field` |
    /// | `CALLCACHE_DEDUPE_IN_FLIGHT` | `dedupe_in_flight`     |
    ///
    /// Absent or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            default_ttl_seconds: non_empty("CALLCACHE_DEFAULT_TTL")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.default_ttl_seconds),
            key_encoding: non_empty("CALLCACHE_KEY_ENCODING")
                .and_then(|v| KeyEncoding::parse(&v))
                .unwrap_or(defaults.key_encoding),
            key_prefix: non_empty("CALLCACHE_KEY_PREFIX"),
            exclude_marker_field: non_empty("CALLCACHE_EXCLUDE_MARKER"),
            dedupe_in_flight: non_empty("CALLCACHE_DEDUPE_IN_FLIGHT")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.dedupe_in_flight),
        }
    }

    /// Sets the default TTL.
    pub fn with_default_ttl(mut self, seconds: u64) -> Self {
        self.default_ttl_seconds = seconds;
        self
    }

    /// Sets the key encoding.
    pub fn with_key_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.key_encoding = encoding;
        self
    }

    /// Sets the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Excludes object arguments carrying `field` from keys.
    pub fn excluding_marker(mut self, field: impl Into<String>) -> Self {
        self.exclude_marker_field = Some(field.into());
        self
    }

    /// Enables or disables in-flight de-duplication.
    pub fn with_dedupe_in_flight(mut self, enabled: bool) -> Self {
        self.dedupe_in_flight = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.default_ttl_seconds == 0 {
            return Err(CacheError::ConfigError(
                "default_ttl_seconds must be positive".into(),
            ));
        }
        if let Some(prefix) = &self.key_prefix {
            validate_prefix(prefix)?;
        }
        if matches!(&self.exclude_marker_field, Some(field) if field.is_empty()) {
            return Err(CacheError::ConfigError(
                "exclude_marker_field must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Builds the fingerprinter these settings describe.
    pub fn fingerprinter(&self) -> Result<Fingerprinter> {
        let mut fingerprinter = Fingerprinter::new().with_encoding(self.key_encoding);
        if let Some(field) = &self.exclude_marker_field {
            fingerprinter = fingerprinter.with_filter(MarkerField::new(field.clone()));
        }
        if let Some(prefix) = &self.key_prefix {
            fingerprinter = fingerprinter.with_prefix(prefix.clone())?;
        }
        Ok(fingerprinter)
    }
}

/// Parses a boolean flag; anything unrecognised is `None`.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
