use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::AppState;
use crate::observability::metrics;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub environment: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimiterStatus {
    pub enabled: bool,
    pub tracked_clients: usize,
    pub window_secs: u64,
    pub max_requests: usize,
    pub max_map_size: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactStatus {
    pub stored: usize,
    pub retention_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub limiter_removed: usize,
    pub artifacts_removed: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        environment: state.config().environment.as_str(),
    })
}

pub async fn get_limiter(State(state): State<AppState>) -> Json<LimiterStatus> {
    let limits = state.rate_limiter.limits();
    Json(LimiterStatus {
        enabled: state.config().rate_limit.enabled,
        tracked_clients: state.rate_limiter.tracked_clients(),
        window_secs: limits.window.as_secs(),
        max_requests: limits.max_requests,
        max_map_size: limits.max_map_size,
    })
}

pub async fn get_artifacts(State(state): State<AppState>) -> Json<ArtifactStatus> {
    Json(ArtifactStatus {
        stored: state.artifacts.len(),
        retention_secs: state.artifacts.retention().as_secs(),
        sweep_interval_secs: state.config().artifacts.sweep_interval_secs,
    })
}

/// Reclaim expired state now, ignoring the limiter's size ceiling.
pub async fn run_sweep(State(state): State<AppState>) -> Json<SweepReport> {
    let limiter_removed = state.rate_limiter.purge_expired();
    let artifacts_removed = state.artifacts.sweep();

    metrics::record_sweep("rate_limiter", limiter_removed);
    metrics::record_sweep("artifacts", artifacts_removed);
    metrics::record_rate_limiter_clients(state.rate_limiter.tracked_clients());
    metrics::record_artifacts_stored(state.artifacts.len());

    tracing::info!(limiter_removed, artifacts_removed, "Manual sweep completed");
    Json(SweepReport {
        limiter_removed,
        artifacts_removed,
    })
}
