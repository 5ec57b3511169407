//! Typed Cache Tests

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tiercache_domain::error::Error;
use tiercache_domain::ports::Cache;
use tiercache_infrastructure::cache::{CacheManager, TypedCache};
use tiercache_infrastructure::config::ManagerConfig;
use tiercache_providers::cache::MemoryCache;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Player {
    name: String,
    level: u32,
}

fn player(name: &str, level: u32) -> Player {
    Player {
        name: name.to_string(),
        level,
    }
}

fn memory() -> Arc<dyn Cache> {
    Arc::new(MemoryCache::new("typed", Duration::ZERO))
}

#[tokio::test]
async fn test_typed_roundtrip() {
    let players: TypedCache<Player> = TypedCache::new(memory());

    players.set("42", &player("ada", 7), Duration::from_secs(60)).await.unwrap();

    assert_eq!(players.get("42").await.unwrap(), player("ada", 7));
    assert!(players.exists("42").await.unwrap());
    assert_eq!(players.get_optional("missing").await.unwrap(), None);

    players.delete("42").await.unwrap();
    assert!(players.get("42").await.unwrap_err().is_miss());
}

#[tokio::test]
async fn test_typed_decode_failure_is_invalid() {
    let cache = memory();
    cache.set("42", b"not json".to_vec(), Duration::ZERO).await.unwrap();
    cache.set("empty", Vec::new(), Duration::ZERO).await.unwrap();
    let players: TypedCache<Player> = TypedCache::new(cache);

    assert!(matches!(
        players.get("42").await.unwrap_err(),
        Error::Invalid { .. }
    ));
    assert!(matches!(
        players.get("empty").await.unwrap_err(),
        Error::Invalid { .. }
    ));
    assert!(matches!(
        players.get_optional("42").await.unwrap_err(),
        Error::Invalid { .. }
    ));
}

#[tokio::test]
async fn test_typed_batch() {
    let players: TypedCache<Player> = TypedCache::new(memory());
    let mut items = HashMap::new();
    items.insert("1".to_string(), player("ada", 1));
    items.insert("2".to_string(), player("grace", 2));
    players.set_batch(&items, Duration::ZERO).await.unwrap();

    let found = players
        .get_batch(&["1".to_string(), "2".to_string(), "3".to_string()])
        .await
        .unwrap();
    assert_eq!(found, items);
}

#[tokio::test]
async fn test_typed_over_manager() {
    let primary = memory();
    let secondary = memory();
    let manager: Arc<dyn Cache> = Arc::new(CacheManager::new(
        primary,
        Some(secondary),
        ManagerConfig::minimal(),
    ));
    let players: TypedCache<Player> = TypedCache::new(manager);

    players.set("7", &player("linus", 3), Duration::ZERO).await.unwrap();
    assert_eq!(players.get("7").await.unwrap().level, 3);
    assert_eq!(players.inner().backend_name(), "tiered");
}
