//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → AppState (shared via Arc / ArcSwap)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → HttpServer applies it (validator, rate limits, retention swap live)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes arrive as whole new values
//! - All fields have defaults to allow minimal configs
//! - Bind addresses and the static root are read once at startup

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AdminConfig, ArtifactConfig, CorsConfig, CvConfig, Environment, GatewayConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RateLimitConfig, SecurityConfig, StaticFilesConfig, TemplateConfig,
    TimeoutConfig, UploadClassConfig, UploadConfig, ValidationConfig,
};
pub use validation::{validate_config, ConfigViolation};
