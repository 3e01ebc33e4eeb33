//! Defaults and fixed values for callcache.

// ═══════════════════════════════════════════════════════════════════════════════
// TTL
// ═══════════════════════════════════════════════════════════════════════════════

/// TTL applied to a cache write when the caller does not pass one.
pub const DEFAULT_TTL_SECONDS: u64 = 20;

// ═══════════════════════════════════════════════════════════════════════════════
// KEY CONSTRUCTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Joins scope and operation into the qualified name (`UserService.getUser`).
pub const QUALIFIED_NAME_SEPARATOR: &str = ".";

/// Marker field carried by request-scoped context arguments.
pub const DEFAULT_MARKER_FIELD: &str = "apiType";

/// Domain separator for digest-encoded cache keys.
pub const DOMAIN_CACHE_KEY: &[u8] = b"CALLCACHE_KEY_V1";

/// Size of a digest-encoded key before hex encoding (SHA3-256).
pub const DIGEST_KEY_SIZE: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// STORES
// ═══════════════════════════════════════════════════════════════════════════════

/// Default Redis host.
pub const DEFAULT_REDIS_HOST: &str = "localhost";

/// Default Redis port.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Default entry capacity of the in-process memory store.
pub const DEFAULT_MEMORY_CAPACITY: usize = 10_000;
