//! Tier probing and the periodic health loop

use crate::constants::{PRIMARY_TIER, SECONDARY_TIER};
use crate::health::{HealthCheck, HealthResponse};
use crate::logging::log_health_check;
use crate::utils::TimedOperation;
use std::sync::Arc;
use std::time::Duration;
use tiercache_domain::constants::HEALTH_PING_TIMEOUT;
use tiercache_domain::ports::Cache;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Ping one tier under a fresh [`HEALTH_PING_TIMEOUT`] and log the outcome
pub(crate) async fn probe(name: &str, cache: &dyn Cache) -> HealthCheck {
    let timer = TimedOperation::start();
    let outcome = tokio::time::timeout(HEALTH_PING_TIMEOUT, cache.ping()).await;
    let elapsed = timer.elapsed();

    let check = match outcome {
        Ok(Ok(())) => HealthCheck::healthy(name, cache.backend_name()),
        Ok(Err(e)) => HealthCheck::failed(name, cache.backend_name(), e.to_string()),
        Err(_) => HealthCheck::failed(
            name,
            cache.backend_name(),
            format!("ping timed out after {}s", HEALTH_PING_TIMEOUT.as_secs()),
        ),
    }
    .with_response_time(elapsed);

    log_health_check(
        name,
        check.status.is_healthy(),
        elapsed,
        check.error.as_deref(),
    );
    check
}

/// Probe the primary, then the secondary
///
/// The primary is critical; a failing secondary only degrades the report.
pub(crate) async fn check_tiers(
    primary: &Arc<dyn Cache>,
    secondary: Option<&Arc<dyn Cache>>,
) -> HealthResponse {
    let timer = TimedOperation::start();
    let mut response = HealthResponse::new().add_check(probe(PRIMARY_TIER, primary.as_ref()).await);
    if let Some(secondary) = secondary {
        response = response.add_optional_check(probe(SECONDARY_TIER, secondary.as_ref()).await);
    }
    response.with_response_time(timer.elapsed())
}

/// Ping both tiers at `first_tick`, then every `interval`, until `token` is cancelled
pub(crate) async fn run_health_loop(
    primary: Arc<dyn Cache>,
    secondary: Option<Arc<dyn Cache>>,
    first_tick: Instant,
    interval: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(first_tick, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                // A cancelled token also aborts a check in progress
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = check_tiers(&primary, secondary.as_ref()) => {}
                }
            }
        }
    }

    debug!("Cache health loop stopped");
}
