//! # callcache Key Fingerprinting
//!
//! Turns a [`CallIdentity`] into a stable [`CacheKey`].
//!
//! This crate provides:
//!
//! - **Canonical**: compact JSON with recursively sorted object keys
//! - **Filter**: argument filter policies (marker fields, unions, closures)
//! - **Fingerprint**: the key pipeline and its encodings (base64, SHA3)
//!
//! ## Pipeline
//!
//! ```text
//! key = encode(canonical_json([qualified_name, ...filtered_arguments]))
//! ```
//!
//! ## Example
//!
//! ```rust
//! use callcache_core::CallIdentity;
//! use callcache_key::{fingerprint, KeepAll};
//!
//! let identity = CallIdentity::new("getUser").arg(&42).unwrap();
//! let key = fingerprint(&identity, &KeepAll).unwrap();
//! assert_eq!(key.as_str(), "WyJnZXRVc2VyIiw0Ml0=");
//! ```
//!
//! [`CallIdentity`]: callcache_core::CallIdentity
//! [`CacheKey`]: callcache_core::CacheKey

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod canonical;
pub mod filter;
pub mod fingerprint;

// Re-export main items at crate root
pub use canonical::{canonicalize, to_canonical_bytes};
pub use filter::{AnyOf, KeepAll, MarkerField};
pub use fingerprint::{fingerprint, validate_prefix, Fingerprinter, KeyEncoding};
