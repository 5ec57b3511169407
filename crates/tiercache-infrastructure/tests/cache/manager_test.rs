//! Cache Manager Tests

use crate::test_utils::{ScriptedCache, eventually};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tiercache_domain::error::Error;
use tiercache_domain::ports::{Cache, KeyTtl, NO_EXPIRATION};
use tiercache_infrastructure::cache::CacheManager;
use tiercache_infrastructure::config::ManagerConfig;
use tiercache_infrastructure::health::HealthStatus;

const TTL: Duration = Duration::from_secs(60);

fn config() -> ManagerConfig {
    ManagerConfig {
        use_fallback_on_read: true,
        fallback_on_write_error: true,
        sync_to_secondary: false,
        health_check_interval_secs: 0,
        retry_attempts: 2,
        retry_delay_ms: 0,
    }
}

fn tiers() -> (Arc<ScriptedCache>, Arc<ScriptedCache>) {
    (
        Arc::new(ScriptedCache::new("primary")),
        Arc::new(ScriptedCache::new("secondary")),
    )
}

fn manager(
    primary: &Arc<ScriptedCache>,
    secondary: &Arc<ScriptedCache>,
    config: ManagerConfig,
) -> CacheManager {
    CacheManager::new(primary.clone(), Some(secondary.clone()), config)
}

#[tokio::test]
async fn test_manager_roundtrip() {
    let (primary, secondary) = tiers();
    let manager = manager(&primary, &secondary, config());

    manager.set("k", b"v".to_vec(), TTL).await.unwrap();
    assert_eq!(manager.get("k").await.unwrap(), b"v");
    assert!(manager.exists("k").await.unwrap());

    let stats = manager.stats();
    assert_eq!(stats.primary_hits, 3);
    assert_eq!(stats.primary_errors, 0);
    assert_eq!(secondary.calls("set"), 0);
    assert_eq!(manager.backend_name(), "tiered");
}

#[tokio::test]
async fn test_fallback_on_read_serves_secondary_value() {
    let (primary, secondary) = tiers();
    secondary.set("k", b"from-secondary".to_vec(), TTL).await.unwrap();
    primary.fail_always("get");
    let manager = manager(&primary, &secondary, config());

    assert_eq!(manager.get("k").await.unwrap(), b"from-secondary");

    let stats = manager.stats();
    assert_eq!(stats.secondary_hits, 1);
    assert_eq!(stats.fallback_count, 1);
    assert_eq!(stats.primary_errors, 1);
}

#[tokio::test]
async fn test_fallback_on_read_disabled_surfaces_primary_error() {
    let (primary, secondary) = tiers();
    secondary.set("k", b"from-secondary".to_vec(), TTL).await.unwrap();
    primary.fail_always("get");
    let manager = manager(
        &primary,
        &secondary,
        ManagerConfig {
            use_fallback_on_read: false,
            ..config()
        },
    );

    let err = manager.get("k").await.unwrap_err();
    assert!(matches!(err, Error::Backend { .. }));
    assert_eq!(secondary.calls("get"), 0);
    assert_eq!(manager.stats().fallback_count, 0);
}

#[tokio::test]
async fn test_read_reports_primary_error_when_secondary_misses() {
    let (primary, secondary) = tiers();
    primary.fail_always("get");
    let manager = manager(&primary, &secondary, config());

    let err = manager.get("absent").await.unwrap_err();
    assert!(err.to_string().contains("primary get unavailable"));

    let stats = manager.stats();
    assert_eq!(stats.primary_errors, 1);
    assert_eq!(stats.secondary_errors, 1);
}

#[tokio::test]
async fn test_primary_miss_falls_back_to_secondary() {
    let (primary, secondary) = tiers();
    secondary.set("k", b"v".to_vec(), TTL).await.unwrap();
    let manager = manager(&primary, &secondary, config());

    assert_eq!(manager.get("k").await.unwrap(), b"v");
    let stats = manager.stats();
    assert_eq!(stats.secondary_hits, 1);
    assert_eq!(stats.primary_errors, 1);
    assert_eq!(primary.calls("get"), 3);
}

#[tokio::test]
async fn test_fallback_on_write_lands_in_secondary() {
    let (primary, secondary) = tiers();
    primary.fail_always("set");
    let manager = manager(&primary, &secondary, config());

    manager.set("k", b"v".to_vec(), TTL).await.unwrap();

    assert_eq!(secondary.get("k").await.unwrap(), b"v");
    assert_eq!(primary.calls("set"), 3);
    let stats = manager.stats();
    assert_eq!(stats.fallback_count, 1);
    assert_eq!(stats.primary_errors, 1);
}

#[tokio::test]
async fn test_write_without_fallback_returns_primary_error() {
    let (primary, secondary) = tiers();
    primary.fail_always("set");
    let manager = manager(
        &primary,
        &secondary,
        ManagerConfig {
            fallback_on_write_error: false,
            ..config()
        },
    );

    let err = manager.set("k", b"v".to_vec(), TTL).await.unwrap_err();
    assert!(matches!(err, Error::Backend { .. }));
    assert_eq!(secondary.calls("set"), 0);
}

#[tokio::test]
async fn test_write_failing_on_both_tiers() {
    let (primary, secondary) = tiers();
    primary.fail_always("set");
    secondary.fail_always("set");
    let manager = manager(&primary, &secondary, config());

    let err = manager.set("k", b"v".to_vec(), TTL).await.unwrap_err();
    match err {
        Error::BothTiersFailed { primary, secondary } => {
            assert!(primary.to_string().contains("primary set unavailable"));
            assert!(secondary.to_string().contains("secondary set unavailable"));
        }
        other => panic!("expected BothTiersFailed, got {other:?}"),
    }
    assert_eq!(manager.stats().secondary_errors, 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_bound() {
    let (primary, secondary) = tiers();
    primary.set("k", b"v".to_vec(), TTL).await.unwrap();
    primary.fail_times("get", 2);
    let manager = manager(
        &primary,
        &secondary,
        ManagerConfig {
            retry_attempts: 2,
            retry_delay_ms: 100,
            ..config()
        },
    );

    let started = tokio::time::Instant::now();
    assert_eq!(manager.get("k").await.unwrap(), b"v");

    assert_eq!(primary.calls("get"), 3);
    assert!(started.elapsed() >= Duration::from_millis(200));
    let stats = manager.stats();
    assert_eq!(stats.primary_hits, 1);
    assert_eq!(stats.primary_errors, 0);
    assert_eq!(secondary.calls("get"), 0);
}

#[tokio::test]
async fn test_retry_exhausted_counts_one_error() {
    let (primary, secondary) = tiers();
    primary.fail_always("get");
    let manager = manager(
        &primary,
        &secondary,
        ManagerConfig {
            use_fallback_on_read: false,
            retry_attempts: 4,
            ..config()
        },
    );

    assert!(manager.get("k").await.is_err());
    assert_eq!(primary.calls("get"), 5);
    assert_eq!(manager.stats().primary_errors, 1);
}

#[tokio::test]
async fn test_delete_applies_to_both_tiers() {
    let (primary, secondary) = tiers();
    primary.set("k", b"v".to_vec(), TTL).await.unwrap();
    secondary.set("k", b"v".to_vec(), TTL).await.unwrap();
    let manager = manager(&primary, &secondary, config());

    manager.delete("k").await.unwrap();

    assert!(!primary.exists("k").await.unwrap());
    assert!(!secondary.exists("k").await.unwrap());
}

#[tokio::test]
async fn test_delete_best_effort() {
    let (primary, secondary) = tiers();
    secondary.set("k", b"v".to_vec(), TTL).await.unwrap();
    primary.fail_always("delete");
    let manager = manager(&primary, &secondary, config());

    manager.delete("k").await.unwrap();
    assert!(!secondary.exists("k").await.unwrap());
    assert_eq!(manager.stats().primary_errors, 1);

    secondary.fail_always("delete");
    let err = manager.delete("k").await.unwrap_err();
    assert!(matches!(err, Error::BothTiersFailed { .. }));
}

#[tokio::test]
async fn test_delete_batch_and_clear_apply_to_both_tiers() {
    let (primary, secondary) = tiers();
    for key in ["a", "b", "c"] {
        primary.set(key, b"v".to_vec(), TTL).await.unwrap();
        secondary.set(key, b"v".to_vec(), TTL).await.unwrap();
    }
    let manager = manager(&primary, &secondary, config());

    manager
        .delete_batch(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert!(!primary.exists("a").await.unwrap());
    assert!(!secondary.exists("b").await.unwrap());
    assert!(secondary.exists("c").await.unwrap());

    manager.clear().await.unwrap();
    assert!(!primary.exists("c").await.unwrap());
    assert!(!secondary.exists("c").await.unwrap());
}

#[tokio::test]
async fn test_batch_partial_miss() {
    let (primary, secondary) = tiers();
    let manager = manager(&primary, &secondary, config());

    let items: HashMap<String, Vec<u8>> = ["k0", "k1", "k2"]
        .into_iter()
        .map(|k| (k.to_string(), k.as_bytes().to_vec()))
        .collect();
    manager.set_batch(items, TTL).await.unwrap();

    let keys: Vec<String> = (0..5).map(|i| format!("k{i}")).collect();
    let found = manager.get_batch(&keys).await.unwrap();

    assert_eq!(found.len(), 3);
    assert_eq!(found.get("k1"), Some(&b"k1".to_vec()));
}

#[tokio::test]
async fn test_replication_lands_in_secondary() {
    let (primary, secondary) = tiers();
    let manager = manager(
        &primary,
        &secondary,
        ManagerConfig {
            sync_to_secondary: true,
            ..config()
        },
    );

    manager.set("k", b"v".to_vec(), TTL).await.unwrap();
    let mut batch = HashMap::new();
    batch.insert("b".to_string(), b"w".to_vec());
    manager.set_batch(batch, TTL).await.unwrap();

    eventually(|| manager.stats().sync_count == 2).await;
    assert_eq!(secondary.get("k").await.unwrap(), b"v");
    assert_eq!(secondary.get("b").await.unwrap(), b"w");
}

#[tokio::test]
async fn test_replication_failure_is_only_logged() {
    let (primary, secondary) = tiers();
    secondary.fail_always("set");
    let manager = manager(
        &primary,
        &secondary,
        ManagerConfig {
            sync_to_secondary: true,
            ..config()
        },
    );

    manager.set("k", b"v".to_vec(), TTL).await.unwrap();
    eventually(|| secondary.calls("set") == 1).await;
    eventually(|| manager.background_tasks() == 0).await;

    let stats = manager.stats();
    assert_eq!(stats.sync_count, 0);
    assert_eq!(stats.secondary_errors, 0);
}

#[tokio::test]
async fn test_no_replication_when_disabled() {
    let (primary, secondary) = tiers();
    let manager = manager(&primary, &secondary, config());

    manager.set("k", b"v".to_vec(), TTL).await.unwrap();
    tokio::task::yield_now().await;

    assert_eq!(secondary.calls("set"), 0);
    assert_eq!(manager.stats().sync_count, 0);
}

#[tokio::test]
async fn test_close_drains_replication_before_closing_tiers() {
    let (primary, secondary) = tiers();
    let manager = manager(
        &primary,
        &secondary,
        ManagerConfig {
            sync_to_secondary: true,
            ..config()
        },
    );

    manager.set("k", b"v".to_vec(), TTL).await.unwrap();
    manager.close().await.unwrap();

    assert_eq!(manager.stats().sync_count, 1);
    assert_eq!(secondary.calls("set"), 1);
}

#[tokio::test]
async fn test_stats_monotonicity() {
    let (primary, secondary) = tiers();
    for i in 0..3 {
        primary.set(&format!("hot{i}"), b"v".to_vec(), TTL).await.unwrap();
    }
    for i in 0..2 {
        secondary.set(&format!("cold{i}"), b"v".to_vec(), TTL).await.unwrap();
    }
    let manager = manager(&primary, &secondary, config());

    let mut previous = manager.stats();
    let keys = ["hot0", "cold0", "hot1", "cold1", "hot2"];
    for key in keys {
        manager.get(key).await.unwrap();
        let current = manager.stats();
        assert!(current.primary_hits >= previous.primary_hits);
        assert!(current.secondary_hits >= previous.secondary_hits);
        assert!(current.primary_errors >= previous.primary_errors);
        assert!(current.fallback_count >= previous.fallback_count);
        previous = current;
    }

    assert_eq!(previous.primary_hits, 3);
    assert_eq!(previous.fallback_count, 2);
    assert_eq!(previous.secondary_hits, 2);
}

#[tokio::test]
async fn test_ttl_operations_follow_read_pattern() {
    let (primary, secondary) = tiers();
    let manager = manager(&primary, &secondary, config());
    manager.set("k", b"v".to_vec(), NO_EXPIRATION).await.unwrap();

    manager.set_ttl("k", Duration::from_secs(30)).await.unwrap();
    assert!(manager.get_ttl("k").await.unwrap().remaining().is_some());

    secondary.set("only-secondary", b"v".to_vec(), NO_EXPIRATION).await.unwrap();
    primary.fail_always("get_ttl");
    assert_eq!(
        manager.get_ttl("only-secondary").await.unwrap(),
        KeyTtl::Persistent
    );
}

#[tokio::test]
async fn test_manager_without_secondary() {
    let primary = Arc::new(ScriptedCache::new("primary"));
    let manager = CacheManager::primary_only(primary.clone(), config());

    primary.fail_always("get");
    let err = manager.get("k").await.unwrap_err();
    assert!(matches!(err, Error::Backend { .. }));

    primary.fail_always("delete");
    assert!(matches!(
        manager.delete("k").await.unwrap_err(),
        Error::Backend { .. }
    ));
}

#[tokio::test]
async fn test_close_closes_both_tiers_and_rejects_calls() {
    let (primary, secondary) = tiers();
    let manager = manager(&primary, &secondary, config());

    manager.close().await.unwrap();
    manager.close().await.unwrap();

    assert_eq!(primary.calls("close"), 1);
    assert_eq!(secondary.calls("close"), 1);
    assert!(primary.ping().await.unwrap_err().is_closed());
    assert!(secondary.ping().await.unwrap_err().is_closed());
    assert!(manager.get("k").await.unwrap_err().is_closed());
    assert!(manager.set("k", b"v".to_vec(), TTL).await.unwrap_err().is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_health_loop_pings_until_close() {
    let (primary, secondary) = tiers();
    let manager = manager(
        &primary,
        &secondary,
        ManagerConfig {
            health_check_interval_secs: 1,
            ..config()
        },
    );
    assert_eq!(manager.background_tasks(), 1);

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(primary.calls("ping"), 3);
    assert_eq!(secondary.calls("ping"), 3);

    manager.close().await.unwrap();
    assert_eq!(manager.background_tasks(), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(primary.calls("ping"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_health_interval_disables_loop() {
    let (primary, secondary) = tiers();
    let manager = manager(
        &primary,
        &secondary,
        ManagerConfig {
            health_check_interval_secs: u64::MAX,
            ..config()
        },
    );
    assert_eq!(manager.background_tasks(), 0);

    manager.set("k", b"v".to_vec(), TTL).await.unwrap();
    assert_eq!(manager.get("k").await.unwrap(), b"v");
    manager.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_dropping_manager_stops_health_loop() {
    let (primary, secondary) = tiers();
    let manager = manager(
        &primary,
        &secondary,
        ManagerConfig {
            health_check_interval_secs: 1,
            ..config()
        },
    );
    drop(manager);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(primary.calls("ping"), 0);
}

#[tokio::test]
async fn test_health_report() {
    let (primary, secondary) = tiers();
    let manager = manager(&primary, &secondary, config());

    let report = manager.health().await;
    assert_eq!(report.status, HealthStatus::Up);
    assert_eq!(report.checks.len(), 2);

    secondary.fail_always("ping");
    let report = manager.health().await;
    assert_eq!(report.status, HealthStatus::Degraded);
    assert_eq!(report.checks["secondary"].status, HealthStatus::Down);

    primary.fail_always("ping");
    let report = manager.health().await;
    assert_eq!(report.status, HealthStatus::Down);
    assert!(report.checks["primary"].error.is_some());
}

#[tokio::test]
async fn test_ping_tolerates_secondary_failure() {
    let (primary, secondary) = tiers();
    let manager = manager(&primary, &secondary, config());

    secondary.fail_always("ping");
    manager.ping().await.unwrap();

    primary.fail_always("ping");
    assert!(manager.ping().await.is_err());
}
