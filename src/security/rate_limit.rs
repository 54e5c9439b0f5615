//! Per-client sliding window rate limiting.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::clock::SharedClock;
use crate::config::RateLimitConfig;
use crate::http::request::RequestId;
use crate::http::response::ApiError;
use crate::http::state::AppState;
use crate::observability::metrics;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            RateLimitDecision::Allowed => None,
            RateLimitDecision::Limited { retry_after_secs } => Some(*retry_after_secs),
        }
    }
}

/// The live limits, swapped as a unit on config reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub window: Duration,
    pub max_requests: usize,
    pub max_map_size: usize,
}

impl From<&RateLimitConfig> for RateLimits {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            window: config.window(),
            max_requests: config.max_requests,
            max_map_size: config.max_map_size,
        }
    }
}

/// Sliding window limiter keyed by client.
///
/// Each client owns a queue of admission timestamps in arrival order. Expired
/// timestamps are dropped lazily on access; clients that went quiet are
/// reclaimed by [`SlidingWindowLimiter::cleanup_old_entries`].
///
/// The read-filter-append sequence for one key runs under that key's shard
/// lock, so concurrent requests from the same client cannot lose updates.
pub struct SlidingWindowLimiter {
    windows: DashMap<String, VecDeque<u64>>,
    limits: ArcSwap<RateLimits>,
    clock: SharedClock,
}

impl SlidingWindowLimiter {
    pub fn new(limits: RateLimits, clock: SharedClock) -> Self {
        Self {
            windows: DashMap::new(),
            limits: ArcSwap::from_pointee(limits),
            clock,
        }
    }

    pub fn limits(&self) -> RateLimits {
        **self.limits.load()
    }

    pub fn set_limits(&self, limits: RateLimits) {
        self.limits.store(std::sync::Arc::new(limits));
    }

    /// Admit or reject one request from `client_key`.
    pub fn check(&self, client_key: &str) -> RateLimitDecision {
        let limits = self.limits();
        let window_ms = limits.window.as_millis() as u64;
        let now = self.clock.now_ms();

        let mut requests = self.windows.entry(client_key.to_owned()).or_default();
        prune(&mut requests, now, window_ms);

        if requests.len() >= limits.max_requests {
            let oldest = requests.iter().min().copied().unwrap_or(now);
            // a stamp from before a backwards clock jump can sit in the future
            let wait_ms = (oldest + window_ms).saturating_sub(now).min(window_ms);
            return RateLimitDecision::Limited {
                retry_after_secs: wait_ms.div_ceil(1000),
            };
        }

        requests.push_back(now);
        RateLimitDecision::Allowed
    }

    /// Prune every client, but only once the table has grown past
    /// `max_map_size`. Returns the number of clients removed.
    pub fn cleanup_old_entries(&self) -> usize {
        if self.windows.len() <= self.limits().max_map_size {
            return 0;
        }
        self.purge_expired()
    }

    /// Prune every client regardless of table size. Clients left with no
    /// live timestamps are removed. Locks one shard at a time.
    pub fn purge_expired(&self) -> usize {
        let window_ms = self.limits().window.as_millis() as u64;
        let now = self.clock.now_ms();
        let mut removed = 0;

        self.windows.retain(|_, requests| {
            prune(requests, now, window_ms);
            if requests.is_empty() {
                removed += 1;
                false
            } else {
                true
            }
        });

        removed
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Drop timestamps at least `window_ms` old.
///
/// The wall clock can step backwards, so arrival order does not imply
/// timestamp order and the whole queue is scanned.
fn prune(requests: &mut VecDeque<u64>, now: u64, window_ms: u64) {
    requests.retain(|&stamp| now.saturating_sub(stamp) < window_ms);
}

/// Client identity: first `X-Forwarded-For` hop when trusted, else the peer IP.
pub fn client_key(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    peer.ip().to_string()
}

/// Middleware guarding the artifact-producing endpoints.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request_id: RequestId,
    request: Request<Body>,
    next: Next,
) -> Response {
    let config = state.config();
    if !config.rate_limit.enabled {
        return next.run(request).await;
    }

    let key = client_key(request.headers(), addr, config.rate_limit.trust_forwarded_for);
    match state.rate_limiter.check(&key) {
        RateLimitDecision::Allowed => next.run(request).await,
        RateLimitDecision::Limited { retry_after_secs } => {
            tracing::warn!(
                request_id = %request_id,
                client = %key,
                retry_after_secs,
                "Rate limit exceeded"
            );
            metrics::record_rate_limited();
            ApiError::RateLimited { retry_after_secs }.into_response()
        }
    }
}
