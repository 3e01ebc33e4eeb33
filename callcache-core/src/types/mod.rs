//! Domain types for callcache.
//!
//! - [`CallIdentity`]: what is being cached (scope, operation, arguments)
//! - [`CacheKey`]: the fingerprint a call identity is stored under
//! - [`CacheEntry`]: an encoded value plus its TTL, as written to a store
//! - [`to_argument`]: strict serialization of one call argument

mod argument;
mod entry;
mod identity;
mod key;

pub use argument::*;
pub use entry::*;
pub use identity::*;
pub use key::*;
