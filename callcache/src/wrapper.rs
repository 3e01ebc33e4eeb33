//! Functions registered for caching up front.
//!
//! Instead of intercepting calls at runtime, an operation is wrapped once
//! with its name, optional scope and TTL. Each call then builds the
//! identity from its arguments and runs the cache-or-compute protocol.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use callcache_core::error::Result;
use callcache_core::types::{to_argument, CallIdentity};

use crate::cache::CallCache;
use crate::error::CallResult;

// ═══════════════════════════════════════════════════════════════════════════════
// ARGUMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Argument lists that can be fingerprinted.
///
/// Implemented for `()`, tuples of up to six `Serialize` values, and
/// pre-built `Vec<Value>` lists. A single argument is a one-tuple: `(id,)`.
pub trait IntoArguments {
    /// Serializes each argument, in call order.
    fn to_arguments(&self) -> Result<Vec<Value>>;
}

impl IntoArguments for () {
    fn to_arguments(&self) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }
}

impl IntoArguments for Vec<Value> {
    fn to_arguments(&self) -> Result<Vec<Value>> {
        Ok(self.clone())
    }
}

macro_rules! impl_tuple_arguments {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Serialize),+> IntoArguments for ($($name,)+) {
            fn to_arguments(&self) -> Result<Vec<Value>> {
                Ok(vec![$(to_argument(&self.$idx)?),+])
            }
        }
    };
}

impl_tuple_arguments!(A: 0);
impl_tuple_arguments!(A: 0, B: 1);
impl_tuple_arguments!(A: 0, B: 1, C: 2);
impl_tuple_arguments!(A: 0, B: 1, C: 2, D: 3);
impl_tuple_arguments!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple_arguments!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

// ═══════════════════════════════════════════════════════════════════════════════
// CACHED FUNCTION
// ═══════════════════════════════════════════════════════════════════════════════

/// An async function whose calls go through a [`CallCache`].
///
/// ```rust
/// use std::convert::Infallible;
/// use std::sync::Arc;
///
/// use callcache::{CachedFn, CallCache, MemoryStore};
///
/// # tokio_test::block_on(async {
/// let cache = Arc::new(CallCache::new(Arc::new(MemoryStore::new())));
/// let double = CachedFn::new(cache, "double", |(n,): (u64,)| async move {
///     Ok::<_, Infallible>(n * 2)
/// });
///
/// assert_eq!(double.call((21,)).await.unwrap(), 42);
/// # });
/// ```
pub struct CachedFn<A, F> {
    cache: Arc<CallCache>,
    scope: Option<String>,
    operation: String,
    ttl_seconds: Option<u64>,
    func: F,
    _args: PhantomData<fn(A)>,
}

impl<A, F> CachedFn<A, F>
where
    A: IntoArguments,
{
    /// Registers `func` under `operation`.
    pub fn new<Fut>(cache: Arc<CallCache>, operation: impl Into<String>, func: F) -> Self
    where
        F: Fn(A) -> Fut,
    {
        Self {
            cache,
            scope: None,
            operation: operation.into(),
            ttl_seconds: None,
            func,
            _args: PhantomData,
        }
    }

    /// Qualifies the operation name with `scope`.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Overrides the cache's default TTL for this function.
    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.ttl_seconds = Some(seconds);
        self
    }

    /// Returns the operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the scope, if any.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Builds the identity a call with `args` is cached under.
    pub fn identity(&self, args: &A) -> Result<CallIdentity> {
        let mut identity = CallIdentity::new(self.operation.clone());
        if let Some(scope) = &self.scope {
            identity = identity.with_scope(scope.clone());
        }
        Ok(identity.with_arguments(args.to_arguments()?))
    }

    /// Calls the function through the cache.
    pub async fn call<Fut, T, E>(&self, args: A) -> CallResult<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        T: Serialize + DeserializeOwned,
    {
        let identity = self.identity(&args)?;
        self.cache
            .cached_call(&identity, self.ttl_seconds, || (self.func)(args))
            .await
    }
}

impl<A, F> fmt::Debug for CachedFn<A, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFn")
            .field("scope", &self.scope)
            .field("operation", &self.operation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCOPES
// ═══════════════════════════════════════════════════════════════════════════════

/// A group of functions sharing a scope name and TTL.
///
/// Plays the role of a cache injected into a service: every function
/// registered here is keyed as `Scope.operation`.
#[derive(Clone, Debug)]
pub struct CacheScope {
    cache: Arc<CallCache>,
    scope: Option<String>,
    ttl_seconds: Option<u64>,
}

impl CacheScope {
    /// Sets the TTL for functions registered afterwards.
    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.ttl_seconds = Some(seconds);
        self
    }

    /// Returns the scope name; `None` for free functions.
    pub fn name(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Registers `func` under `operation` in this scope.
    pub fn function<A, F, Fut>(&self, operation: impl Into<String>, func: F) -> CachedFn<A, F>
    where
        A: IntoArguments,
        F: Fn(A) -> Fut,
    {
        CachedFn {
            cache: Arc::clone(&self.cache),
            scope: self.scope.clone(),
            operation: operation.into(),
            ttl_seconds: self.ttl_seconds,
            func,
            _args: PhantomData,
        }
    }
}

impl CallCache {
    /// Opens a scope whose functions are keyed as `name.operation`.
    pub fn scope(self: &Arc<Self>, name: impl Into<String>) -> CacheScope {
        CacheScope {
            cache: Arc::clone(self),
            scope: Some(name.into()),
            ttl_seconds: None,
        }
    }

    /// Opens a scope for free functions, keyed by operation name alone.
    pub fn functions(self: &Arc<Self>) -> CacheScope {
        CacheScope {
            cache: Arc::clone(self),
            scope: None,
            ttl_seconds: None,
        }
    }

    /// Opens a scope named after the type `T`.
    pub fn scope_of<T: ?Sized>(self: &Arc<Self>) -> CacheScope {
        self.scope(scope_name::<T>())
    }
}

/// Short name of a type, without module path or generic parameters.
///
/// `my_app::services::UserService` becomes `UserService`.
pub fn scope_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
