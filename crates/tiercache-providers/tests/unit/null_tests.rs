//! Null backend tests

use std::collections::HashMap;
use std::time::Duration;
use tiercache_domain::ports::Cache;
use tiercache_providers::cache::NullCache;

#[tokio::test]
async fn test_null_accepts_writes_and_always_misses() {
    let cache = NullCache::new();

    cache.set("k", b"v".to_vec(), Duration::from_secs(1)).await.unwrap();
    assert!(cache.get("k").await.unwrap_err().is_miss());
    assert!(!cache.exists("k").await.unwrap());

    let mut items = HashMap::new();
    items.insert("a".to_string(), b"1".to_vec());
    cache.set_batch(items, Duration::ZERO).await.unwrap();
    assert!(cache.get_batch(&["a".to_string()]).await.unwrap().is_empty());

    assert!(cache.get_ttl("k").await.unwrap_err().is_miss());
    cache.ping().await.unwrap();
    assert_eq!(cache.backend_name(), "null");
}

#[tokio::test]
async fn test_null_closed() {
    let cache = NullCache::new();
    cache.close().await.unwrap();

    assert!(cache.ping().await.unwrap_err().is_closed());
    assert!(cache.delete("k").await.unwrap_err().is_closed());
}
