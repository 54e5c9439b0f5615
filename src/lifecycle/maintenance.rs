//! Periodic reclamation of expired state.
//!
//! Both tasks skip the immediate first tick, run on a fixed interval, and
//! exit when the shutdown broadcast fires. A pass walks the whole map, so it
//! runs on the blocking pool rather than an async worker, and it locks one
//! shard at a time so request handling on other shards is never blocked.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::{self, JoinHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::artifacts::ArtifactStore;
use crate::observability::metrics;
use crate::security::rate_limit::SlidingWindowLimiter;

/// Drop idle rate-limiter clients once the table outgrows its ceiling.
pub fn spawn_rate_limit_cleanup(
    limiter: Arc<SlidingWindowLimiter>,
    every: Duration,
    shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    spawn_periodic("rate_limiter", every, shutdown, move || {
        let removed = limiter.cleanup_old_entries();
        metrics::record_rate_limiter_clients(limiter.tracked_clients());
        removed
    })
}

/// Remove artifacts older than the retention period.
pub fn spawn_artifact_sweep(
    store: Arc<ArtifactStore>,
    every: Duration,
    shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    spawn_periodic("artifacts", every, shutdown, move || {
        let removed = store.sweep();
        metrics::record_artifacts_stored(store.len());
        removed
    })
}

fn spawn_periodic<F>(
    name: &'static str,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
    pass: F,
) -> JoinHandle<()>
where
    F: Fn() -> usize + Send + Sync + 'static,
{
    let pass = Arc::new(pass);
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let pass = pass.clone();
                    let removed = match task::spawn_blocking(move || pass()).await {
                        Ok(removed) => removed,
                        Err(e) => {
                            tracing::error!(store = name, error = %e, "Sweep pass failed");
                            continue;
                        }
                    };
                    metrics::record_sweep(name, removed);
                    if removed > 0 {
                        tracing::info!(store = name, removed, "Expired entries reclaimed");
                    } else {
                        tracing::debug!(store = name, "Sweep found nothing to reclaim");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!(store = name, "Maintenance task stopping");
                    break;
                }
            }
        }
    })
}
