//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::artifacts::ArtifactStore;
use crate::clock::SharedClock;
use crate::config::GatewayConfig;
use crate::security::rate_limit::{RateLimits, SlidingWindowLimiter};
use crate::static_files::SafeFileResolver;
use crate::validation::Validator;

/// Startup failures that keep the server from being built.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid validation pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("static root {path:?} is unusable: {source}")]
    StaticRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a handler can reach. Cheap to clone.
///
/// The rate limiter and artifact store are owned here rather than living in
/// globals, so each server (and each test) gets its own.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ArcSwap<GatewayConfig>>,
    validator: Arc<ArcSwap<Validator>>,
    pub rate_limiter: Arc<SlidingWindowLimiter>,
    pub artifacts: Arc<ArtifactStore>,
    pub resolver: Arc<SafeFileResolver>,
}

impl AppState {
    pub fn new(config: GatewayConfig, clock: SharedClock) -> Result<Self, StartupError> {
        let validator = Validator::from_config(&config)?;
        let resolver = SafeFileResolver::new(&config.static_files.root, &config.static_files.fallback)
            .map_err(|source| StartupError::StaticRoot {
                path: PathBuf::from(&config.static_files.root),
                source,
            })?
            .clean_urls(config.static_files.clean_urls);
        let rate_limiter =
            SlidingWindowLimiter::new(RateLimits::from(&config.rate_limit), clock.clone());
        let artifacts = ArtifactStore::new(config.artifacts.retention(), clock);

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            validator: Arc::new(ArcSwap::from_pointee(validator)),
            rate_limiter: Arc::new(rate_limiter),
            artifacts: Arc::new(artifacts),
            resolver: Arc::new(resolver),
        })
    }

    /// Snapshot of the live configuration.
    pub fn config(&self) -> Arc<GatewayConfig> {
        self.config.load_full()
    }

    pub fn validator(&self) -> Arc<Validator> {
        self.validator.load_full()
    }

    /// Swap in a reloaded configuration.
    ///
    /// Validation policy, rate limits and artifact retention change
    /// immediately. Bind addresses and the static root are fixed at startup.
    pub fn apply_config(&self, new_config: GatewayConfig) -> Result<(), regex::Error> {
        let validator = Validator::from_config(&new_config)?;
        let current = self.config.load();

        if current.listener.bind_address != new_config.listener.bind_address
            || current.admin.bind_address != new_config.admin.bind_address
            || current.observability.metrics_address != new_config.observability.metrics_address
        {
            tracing::warn!("Bind address changes require a restart and were not applied");
        }
        if current.static_files.root != new_config.static_files.root
            || current.static_files.fallback != new_config.static_files.fallback
            || current.static_files.clean_urls != new_config.static_files.clean_urls
        {
            tracing::warn!("Static file settings require a restart and were not applied");
        }
        if current.security.cors != new_config.security.cors
            || current.environment != new_config.environment
        {
            tracing::warn!("CORS policy changes require a restart and were not applied");
        }

        self.validator.store(Arc::new(validator));
        self.rate_limiter
            .set_limits(RateLimits::from(&new_config.rate_limit));
        self.artifacts.set_retention(new_config.artifacts.retention());
        self.config.store(Arc::new(new_config));

        tracing::info!("Configuration reloaded");
        Ok(())
    }
}
