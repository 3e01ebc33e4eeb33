//! # callcache Core
//!
//! Core types, errors, and traits shared by every callcache crate.
//!
//! - **Types**: [`CallIdentity`], [`CacheKey`], [`CacheEntry`]
//! - **Errors**: [`CacheError`] and the crate-wide [`Result`] alias
//! - **Constants**: defaults (TTL, Redis endpoint) and key domain separators
//! - **Traits**: [`CacheStore`], [`ArgumentFilter`], [`Cacheable`]
//!
//! ## Example
//!
//! ```rust
//! use callcache_core::CallIdentity;
//!
//! let identity = CallIdentity::new("getUser")
//!     .with_scope("UserService")
//!     .arg(&42)
//!     .unwrap();
//! assert_eq!(identity.qualified_name(), "UserService.getUser");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{CacheError, Result};
pub use traits::*;
pub use types::*;
