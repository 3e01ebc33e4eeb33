//! End-to-end behavior of the cache-or-compute protocol.

mod common;

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use callcache::{
    CacheError, CacheKey, CacheStore, Cacheable, CallCache, CallCacheConfig, CallError,
    CallIdentity, MemoryStore, NoopStore, Result,
};
use common::{ann, init_tracing, CallCounter, FailingStore, User};

fn get_user(id: u64) -> CallIdentity {
    CallIdentity::new("getUser").arg(&id).unwrap()
}

async fn fetch(cache: &CallCache, counter: &CallCounter) -> User {
    cache
        .cached_call(&get_user(42), None, || async {
            counter.bump();
            Ok::<_, Infallible>(ann())
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_miss_stores_json_under_base64_key() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let cache = CallCache::new(store.clone());
    let counter = CallCounter::default();

    assert_eq!(fetch(&cache, &counter).await, ann());

    let key = CacheKey::new("WyJnZXRVc2VyIiw0Ml0=");
    assert_eq!(cache.fingerprint(&get_user(42)).unwrap(), key);
    assert_eq!(store.peek(&key).as_deref(), Some(&br#"{"id":42,"name":"Ann"}"#[..]));
    assert!(store.ttl_remaining(&key).unwrap() <= Duration::from_secs(20));
}

#[tokio::test]
async fn test_hit_skips_computation() {
    init_tracing();
    let cache = CallCache::new(Arc::new(MemoryStore::new()));
    let counter = CallCounter::default();

    fetch(&cache, &counter).await;
    assert_eq!(fetch(&cache, &counter).await, ann());
    assert_eq!(counter.count(), 1);

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.writes), (1, 1, 1));
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_default_ttl() {
    init_tracing();
    let cache = CallCache::new(Arc::new(MemoryStore::new()));
    let counter = CallCounter::default();

    fetch(&cache, &counter).await;
    tokio::time::advance(Duration::from_secs(19)).await;
    fetch(&cache, &counter).await;
    assert_eq!(counter.count(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    fetch(&cache, &counter).await;
    assert_eq!(counter.count(), 2);
}

#[tokio::test]
async fn test_failed_computation_is_not_cached() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let cache = CallCache::new(store.clone());

    let result = cache
        .cached_call(&get_user(42), None, || async { Err::<User, _>("db down".to_string()) })
        .await;

    assert_eq!(result.unwrap_err().into_compute().as_deref(), Some("db down"));
    assert!(store.is_empty());
    assert_eq!(cache.stats().compute_errors, 1);

    let counter = CallCounter::default();
    fetch(&cache, &counter).await;
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_marker_arguments_share_entry() {
    init_tracing();
    let config = CallCacheConfig::default().excluding_marker("apiType");
    let cache = CallCache::with_config(Arc::new(MemoryStore::new()), config).unwrap();
    let counter = CallCounter::default();

    for api_type in ["REST", "GRAPHQL"] {
        let identity = CallIdentity::new("getUser")
            .arg_value(json!({ "apiType": api_type, "requestId": "abc" }))
            .arg(&42)
            .unwrap();
        assert_eq!(cache.fingerprint(&identity).unwrap().as_str(), "WyJnZXRVc2VyIiw0Ml0=");

        let user: User = cache
            .cached_call(&identity, None, || async {
                counter.bump();
                Ok::<_, Infallible>(ann())
            })
            .await
            .unwrap();
        assert_eq!(user, ann());
    }

    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_distinct_arguments_get_distinct_entries() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let cache = CallCache::new(store.clone());

    for id in [1u64, 2, 1] {
        cache
            .cached_call_sync(&get_user(id), None, || Ok::<_, Infallible>(id * 10))
            .await
            .unwrap();
    }

    assert_eq!(store.len(), 2);
    assert_eq!(cache.stats().hits, 1);
}

#[tokio::test]
async fn test_store_read_failure_degrades_to_miss() {
    init_tracing();
    let store = Arc::new(FailingStore::failing_get());
    let cache = CallCache::new(store.clone());
    let counter = CallCounter::default();

    assert_eq!(fetch(&cache, &counter).await, ann());
    assert_eq!(fetch(&cache, &counter).await, ann());
    assert_eq!(counter.count(), 2);
    assert_eq!(cache.stats().store_errors, 2);
}

#[tokio::test]
async fn test_store_write_failure_still_returns_value() {
    init_tracing();
    let store = Arc::new(FailingStore::failing_set());
    let cache = CallCache::new(store.clone());
    let counter = CallCounter::default();

    assert_eq!(fetch(&cache, &counter).await, ann());
    assert_eq!(store.sets.load(std::sync::atomic::Ordering::SeqCst), 1);

    let stats = cache.stats();
    assert_eq!(stats.store_errors, 1);
    assert_eq!(stats.writes, 0);
}

#[tokio::test]
async fn test_corrupt_entry_is_recomputed_and_overwritten() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let cache = CallCache::new(store.clone());
    let counter = CallCounter::default();

    let key = cache.fingerprint(&get_user(42)).unwrap();
    store.insert_raw(&key, b"{not json".to_vec(), Duration::from_secs(20));

    assert_eq!(fetch(&cache, &counter).await, ann());
    assert_eq!(counter.count(), 1);
    assert_eq!(cache.stats().decode_errors, 1);
    assert_eq!(store.peek(&key).as_deref(), Some(&br#"{"id":42,"name":"Ann"}"#[..]));
}

#[tokio::test]
async fn test_empty_operation_aborts_before_store() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let cache = CallCache::new(store.clone());
    let counter = CallCounter::default();

    let result = cache
        .cached_call(&CallIdentity::new(""), None, || async {
            counter.bump();
            Ok::<_, Infallible>(1)
        })
        .await;

    assert!(matches!(result, Err(CallError::Cache(CacheError::EmptyOperation))));
    assert_eq!(counter.count(), 0);
    assert_eq!(store.stats().reads, 0);
}

#[tokio::test]
async fn test_non_finite_argument_aborts_before_store() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(CallCache::new(store.clone()));
    let counter = CallCounter::default();

    for rate in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let identity = CallIdentity::new("getRate").arg(&rate);
        assert!(matches!(identity, Err(CacheError::Fingerprint(_))));
    }

    let get_rate = cache.functions().function("getRate", |(rate,): (f64,)| {
        counter.bump();
        async move { Ok::<_, Infallible>(rate) }
    });

    assert!(matches!(
        get_rate.call((f64::INFINITY,)).await,
        Err(CallError::Cache(CacheError::Fingerprint(_)))
    ));
    assert!(get_rate.call((f64::NEG_INFINITY,)).await.is_err());
    assert_eq!(get_rate.call((1.5,)).await.unwrap(), 1.5);

    assert_eq!(counter.count(), 1);
    assert_eq!(store.stats().reads, 1);
}

#[tokio::test]
async fn test_noop_store_always_computes() {
    init_tracing();
    let cache = CallCache::new(Arc::new(NoopStore));
    let counter = CallCounter::default();

    fetch(&cache, &counter).await;
    fetch(&cache, &counter).await;
    assert_eq!(counter.count(), 2);
}

async fn concurrent_fetches(cache: &CallCache, counter: &CallCounter, n: usize) {
    let identity = get_user(42);
    let calls = (0..n).map(|_| {
        cache.cached_call(&identity, None, || async {
            counter.bump();
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, Infallible>(ann())
        })
    });
    for result in futures::future::join_all(calls).await {
        assert_eq!(result.unwrap(), ann());
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_misses_each_compute_by_default() {
    init_tracing();
    let cache = CallCache::new(Arc::new(MemoryStore::new()));
    let counter = CallCounter::default();

    concurrent_fetches(&cache, &counter, 5).await;
    assert_eq!(counter.count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_dedupe_runs_one_computation() {
    init_tracing();
    let config = CallCacheConfig::default().with_dedupe_in_flight(true);
    let cache = CallCache::with_config(Arc::new(MemoryStore::new()), config).unwrap();
    let counter = CallCounter::default();

    concurrent_fetches(&cache, &counter, 5).await;
    assert_eq!(counter.count(), 1);

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 4);
}

struct ProfileLookup {
    user_id: u64,
    counter: CallCounter,
}

#[async_trait]
impl Cacheable for ProfileLookup {
    type Output = User;
    type Error = String;

    fn identity(&self) -> Result<CallIdentity> {
        CallIdentity::new("getProfile")
            .with_scope("ProfileService")
            .arg(&self.user_id)
    }

    fn ttl_seconds(&self) -> Option<u64> {
        Some(120)
    }

    async fn compute(&self) -> std::result::Result<User, String> {
        self.counter.bump();
        Ok(User {
            id: self.user_id,
            name: "Ann".into(),
        })
    }
}

#[tokio::test]
async fn test_cacheable_run_uses_own_identity_and_ttl() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let cache = CallCache::new(store.clone());
    let lookup = ProfileLookup {
        user_id: 42,
        counter: CallCounter::default(),
    };

    assert_eq!(cache.run(&lookup).await.unwrap(), ann());
    assert_eq!(cache.run(&lookup).await.unwrap(), ann());
    assert_eq!(lookup.counter.count(), 1);

    let key = cache.fingerprint(&lookup.identity().unwrap()).unwrap();
    assert!(store.ttl_remaining(&key).unwrap() > Duration::from_secs(20));
    assert_eq!(store.backend_name(), "memory");
}
