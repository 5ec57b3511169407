//! Tiered cache manager
//!
//! [`CacheManager`] composes a primary and an optional secondary [`Cache`]:
//!
//! - **Writes** go to the primary with fixed-delay retry. On success they
//!   are replicated to the secondary in a tracked background task when
//!   `sync_to_secondary` is set; on failure the secondary takes the write
//!   when `fallback_on_write_error` is set.
//! - **Reads** (`get`, `exists`, `get_batch`, `set_ttl`, `get_ttl`) go to
//!   the primary with retry and fall back to the secondary on error when
//!   `use_fallback_on_read` is set. A read that gets no value reports the
//!   primary's error.
//! - **Deletes** (`delete`, `delete_batch`, `clear`, `flush_db`) hit both
//!   tiers and succeed if either tier did.
//!
//! Consistency between the tiers is best-effort.
//!
//! ## Example
//!
//! ```ignore
//! use tiercache_infrastructure::cache::CacheManager;
//! use tiercache_infrastructure::config::ManagerConfig;
//!
//! let manager = CacheManager::new(memory, Some(redis), ManagerConfig::default());
//! manager.set("player:42", payload, Duration::from_secs(300)).await?;
//! let stats = manager.stats();
//! manager.close().await?;
//! ```

mod health;
mod retry;
mod stats;
mod tasks;

pub use stats::ManagerStats;

use crate::config::ManagerConfig;
use crate::constants::{BACKEND_TIERED, REPLICATION_DRAIN_TIMEOUT};
use crate::error_ext::either_tier;
use crate::health::HealthResponse;
use async_trait::async_trait;
use retry::RetryPolicy;
use stats::SharedStats;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tasks::BackgroundTasks;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{Cache, KeyTtl};
use tracing::{debug, error, info, warn};

/// Boxed future returned by a call on one tier
type TierFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Two-tier cache with retry, fallback, replication and health checks
///
/// Owns its background tasks: the health loop and in-flight replications
/// are stopped by [`CacheManager::close`], and the health loop also by
/// dropping the manager.
#[derive(Debug)]
pub struct CacheManager {
    primary: Arc<dyn Cache>,
    secondary: Option<Arc<dyn Cache>>,
    config: ManagerConfig,
    retry: RetryPolicy,
    stats: SharedStats,
    tasks: BackgroundTasks,
    closed: AtomicBool,
}

impl CacheManager {
    /// Create a manager over the given tiers
    ///
    /// Starts the health loop when `health_check_interval_secs > 0` and a
    /// Tokio runtime is available.
    pub fn new(
        primary: Arc<dyn Cache>,
        secondary: Option<Arc<dyn Cache>>,
        config: ManagerConfig,
    ) -> Self {
        let manager = Self {
            retry: RetryPolicy {
                attempts: config.retry_attempts,
                delay: config.retry_delay(),
            },
            primary,
            secondary,
            config,
            stats: SharedStats::default(),
            tasks: BackgroundTasks::new(),
            closed: AtomicBool::new(false),
        };
        manager.start_health_loop();

        info!(
            primary = manager.primary.backend_name(),
            secondary = manager.secondary.as_ref().map(|s| s.backend_name()),
            retry_attempts = manager.config.retry_attempts,
            "Cache manager created"
        );
        manager
    }

    /// Create a manager without a secondary tier
    pub fn primary_only(primary: Arc<dyn Cache>, config: ManagerConfig) -> Self {
        Self::new(primary, None, config)
    }

    /// Primary tier
    pub fn primary(&self) -> &Arc<dyn Cache> {
        &self.primary
    }

    /// Secondary tier, if configured
    pub fn secondary(&self) -> Option<&Arc<dyn Cache>> {
        self.secondary.as_ref()
    }

    /// Policy this manager was built with
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Copy of the current counters
    pub fn stats(&self) -> ManagerStats {
        self.stats.snapshot()
    }

    /// Number of background tasks still running (health loop included)
    pub fn background_tasks(&self) -> usize {
        self.tasks.active_tasks()
    }

    /// Probe both tiers now
    pub async fn health(&self) -> HealthResponse {
        health::check_tiers(&self.primary, self.secondary.as_ref()).await
    }

    fn start_health_loop(&self) {
        let Some(interval) = self.config.health_check_interval() else {
            debug!("Cache health loop disabled");
            return;
        };
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("No Tokio runtime available, cache health loop not started");
            return;
        }
        let Some(first_tick) = tokio::time::Instant::now().checked_add(interval) else {
            warn!(
                interval_secs = interval.as_secs(),
                "Health check interval out of range, cache health loop not started"
            );
            return;
        };
        self.tasks.spawn(
            "health-check",
            health::run_health_loop(
                Arc::clone(&self.primary),
                self.secondary.clone(),
                first_tick,
                interval,
                self.tasks.token(),
            ),
        );
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(Error::closed(BACKEND_TIERED))
        } else {
            Ok(())
        }
    }

    fn secondary_when(&self, enabled: bool) -> Option<&Arc<dyn Cache>> {
        if enabled { self.secondary.as_ref() } else { None }
    }

    /// Primary with retry, then the secondary on error if allowed
    async fn read<'a, T>(
        &'a self,
        op: &'static str,
        call: impl Fn(&'a dyn Cache) -> TierFuture<'a, T>,
    ) -> Result<T> {
        self.ensure_open()?;

        let primary_err = match self.retry.run(op, || call(self.primary.as_ref())).await {
            Ok(value) => {
                self.stats.record(|s| s.primary_hits += 1);
                return Ok(value);
            }
            Err(e) => e,
        };
        self.stats.record(|s| s.primary_errors += 1);

        if let Some(secondary) = self.secondary_when(self.config.use_fallback_on_read) {
            match call(secondary.as_ref()).await {
                Ok(value) => {
                    self.stats.record(|s| {
                        s.secondary_hits += 1;
                        s.fallback_count += 1;
                    });
                    if primary_err.is_miss() {
                        debug!(op, "Primary cache missed, served from secondary");
                    } else {
                        warn!(op, error = %primary_err, "Primary cache failed, served from secondary");
                    }
                    return Ok(value);
                }
                Err(secondary_err) => {
                    self.stats.record(|s| s.secondary_errors += 1);
                    debug!(op, error = %secondary_err, "Secondary cache fallback failed");
                }
            }
        }

        Err(primary_err)
    }

    /// Primary with retry, then replication or write fallback
    async fn write<'a>(
        &'a self,
        op: &'static str,
        call: impl Fn(&'a dyn Cache) -> TierFuture<'a, ()>,
        replicate: impl FnOnce(Arc<dyn Cache>) -> TierFuture<'static, ()>,
    ) -> Result<()> {
        self.ensure_open()?;

        let primary_err = match self.retry.run(op, || call(self.primary.as_ref())).await {
            Ok(()) => {
                self.stats.record(|s| s.primary_hits += 1);
                if let Some(secondary) = self.secondary_when(self.config.sync_to_secondary) {
                    if self.closed.load(Ordering::Acquire) {
                        debug!(op, "Manager closed, skipping replication");
                    } else {
                        self.spawn_replication(op, replicate(Arc::clone(secondary)));
                    }
                }
                return Ok(());
            }
            Err(e) => e,
        };
        self.stats.record(|s| s.primary_errors += 1);

        let Some(secondary) = self.secondary_when(self.config.fallback_on_write_error) else {
            return Err(primary_err);
        };

        match call(secondary.as_ref()).await {
            Ok(()) => {
                self.stats.record(|s| s.fallback_count += 1);
                warn!(op, error = %primary_err, "Primary cache write failed, written to secondary");
                Ok(())
            }
            Err(secondary_err) => {
                self.stats.record(|s| s.secondary_errors += 1);
                error!(
                    op,
                    primary_error = %primary_err,
                    secondary_error = %secondary_err,
                    "Cache write failed on both tiers"
                );
                Err(Error::both_tiers(primary_err, secondary_err))
            }
        }
    }

    /// Apply to both tiers; succeed if either did
    async fn on_both_tiers<'a>(
        &'a self,
        op: &'static str,
        call: impl Fn(&'a dyn Cache) -> TierFuture<'a, ()>,
    ) -> Result<()> {
        self.ensure_open()?;

        let primary = self.retry.run(op, || call(self.primary.as_ref())).await;
        if let Err(e) = &primary {
            self.stats.record(|s| s.primary_errors += 1);
            warn!(op, error = %e, "Primary cache operation failed");
        }

        let secondary = match &self.secondary {
            Some(secondary) => Some(call(secondary.as_ref()).await),
            None => None,
        };
        if let Some(Err(e)) = &secondary {
            self.stats.record(|s| s.secondary_errors += 1);
            warn!(op, error = %e, "Secondary cache operation failed");
        }

        either_tier(primary, secondary)
    }

    fn spawn_replication(&self, op: &'static str, replication: TierFuture<'static, ()>) {
        let stats = self.stats.clone();
        let spawned = self.tasks.spawn("replication", async move {
            match replication.await {
                Ok(()) => stats.record(|s| s.sync_count += 1),
                Err(e) => warn!(op, error = %e, "Replication to secondary cache failed"),
            }
        });
        if !spawned {
            debug!(op, "Background tasks stopped, skipping replication");
        }
    }
}

#[async_trait]
impl Cache for CacheManager {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let value = &value;
        self.write(
            "set",
            move |c| c.set(key, value.clone(), ttl),
            move |secondary| {
                let key = key.to_owned();
                let value = value.clone();
                Box::pin(async move { secondary.set(&key, value, ttl).await })
            },
        )
        .await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.read("get", move |c| c.get(key)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.on_both_tiers("delete", move |c| c.delete(key)).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.read("exists", move |c| c.exists(key)).await
    }

    async fn set_batch(&self, items: HashMap<String, Vec<u8>>, ttl: Duration) -> Result<()> {
        let items = &items;
        self.write(
            "set_batch",
            move |c| c.set_batch(items.clone(), ttl),
            move |secondary| {
                let items = items.clone();
                Box::pin(async move { secondary.set_batch(items, ttl).await })
            },
        )
        .await
    }

    async fn get_batch(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        self.read("get_batch", move |c| c.get_batch(keys)).await
    }

    async fn delete_batch(&self, keys: &[String]) -> Result<()> {
        self.on_both_tiers("delete_batch", move |c| c.delete_batch(keys))
            .await
    }

    async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<()> {
        self.read("set_ttl", move |c| c.set_ttl(key, ttl)).await
    }

    async fn get_ttl(&self, key: &str) -> Result<KeyTtl> {
        self.read("get_ttl", move |c| c.get_ttl(key)).await
    }

    async fn clear(&self) -> Result<()> {
        self.on_both_tiers("clear", |c| c.clear()).await
    }

    async fn flush_db(&self) -> Result<()> {
        self.on_both_tiers("flush_db", |c| c.flush_db()).await
    }

    /// Ping the primary, and the secondary when present
    ///
    /// Only a primary failure fails the call; a secondary failure is logged.
    async fn ping(&self) -> Result<()> {
        self.ensure_open()?;
        self.primary.ping().await?;
        if let Some(secondary) = &self.secondary {
            if let Err(e) = secondary.ping().await {
                warn!(error = %e, "Secondary cache ping failed");
            }
        }
        Ok(())
    }

    /// Stop background work, then close both tiers
    ///
    /// Cancels the health loop, waits up to [`REPLICATION_DRAIN_TIMEOUT`]
    /// for in-flight replications, then closes primary and secondary.
    /// Calling it again is a no-op.
    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        if !self.tasks.shutdown(REPLICATION_DRAIN_TIMEOUT).await {
            warn!("Closing cache tiers with replications still in flight");
        }

        let primary = self.primary.close().await;
        let secondary = match &self.secondary {
            Some(secondary) => secondary.close().await,
            None => Ok(()),
        };
        info!("Cache manager closed");

        match (primary, secondary) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Err(p), Err(s)) => Err(Error::both_tiers(p, s)),
        }
    }

    fn backend_name(&self) -> &str {
        BACKEND_TIERED
    }
}

impl Drop for CacheManager {
    fn drop(&mut self) {
        self.tasks.cancel();
    }
}
