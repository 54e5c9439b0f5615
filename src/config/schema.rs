//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every section falls back to defaults so a minimal (or absent) file works.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Deployment environment; controls how much detail errors expose.
    pub environment: Environment,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Per-client sliding window rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Text and contact field validation policy.
    pub validation: ValidationConfig,

    /// Upload policy per upload class.
    pub uploads: UploadConfig,

    /// Retention of generated artifacts.
    pub artifacts: ArtifactConfig,

    /// Static content served from disk.
    pub static_files: StaticFilesConfig,

    /// Resume templates offered to callers.
    pub cv: CvConfig,

    /// Security hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Length of the sliding window in seconds.
    pub window_secs: u64,

    /// Requests admitted per client within one window.
    pub max_requests: usize,

    /// Tracked client count above which the periodic cleanup prunes the table.
    pub max_map_size: usize,

    /// How often the cleanup task runs, in seconds.
    pub cleanup_interval_secs: u64,

    /// Key clients on the first `X-Forwarded-For` hop instead of the peer
    /// address. Only enable behind a proxy that overwrites the header;
    /// otherwise clients pick their own key.
    pub trust_forwarded_for: bool,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 60 * 60,
            max_requests: 50,
            max_map_size: 1000,
            cleanup_interval_secs: 30 * 60,
            trust_forwarded_for: false,
        }
    }
}

/// Field validation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum trimmed length for required text fields.
    pub min_text_length: usize,

    /// Sanitized text is truncated to this many characters.
    pub max_text_length: usize,

    pub email_pattern: String,

    pub phone_pattern: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_text_length: 2,
            max_text_length: 2000,
            email_pattern: r"^[^\s@]+@[^\s@]+\.[^\s@]+$".to_string(),
            phone_pattern: r"^[0-9\s()+\-]{8,20}$".to_string(),
        }
    }
}

/// Upload policy, one entry per upload class.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    pub photo: UploadClassConfig,
    pub resume: UploadClassConfig,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            photo: UploadClassConfig {
                max_bytes: 5 * 1024 * 1024,
                allowed_types: vec![
                    "image/jpeg".to_string(),
                    "image/jpg".to_string(),
                    "image/png".to_string(),
                ],
                allowed_extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
                accepted_label: "JPG or PNG".to_string(),
            },
            resume: UploadClassConfig {
                max_bytes: 10 * 1024 * 1024,
                allowed_types: vec![
                    "application/pdf".to_string(),
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                        .to_string(),
                ],
                allowed_extensions: vec!["pdf".to_string(), "docx".to_string()],
                accepted_label: "PDF or DOCX".to_string(),
            },
        }
    }
}

/// Size ceiling and allow-lists for one upload class.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadClassConfig {
    /// Maximum file size in bytes.
    pub max_bytes: u64,

    /// Accepted declared MIME types.
    pub allowed_types: Vec<String>,

    /// Accepted extensions, with or without the leading dot.
    pub allowed_extensions: Vec<String>,

    /// Human readable list of accepted kinds used in error messages.
    pub accepted_label: String,
}

/// Artifact retention configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Age in seconds after which a record becomes eligible for removal.
    pub retention_secs: u64,

    /// How often the sweep runs, in seconds.
    pub sweep_interval_secs: u64,
}

impl ArtifactConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            retention_secs: 24 * 60 * 60,
            sweep_interval_secs: 30 * 60,
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory every static request is confined to.
    pub root: String,

    /// Page served (relative to `root`) when a requested file does not exist.
    pub fallback: String,

    /// Serve `<name>.html` for an extensionless request before falling back.
    pub clean_urls: bool,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: "public".to_string(),
            fallback: "index.html".to_string(),
            clean_urls: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CvConfig {
    pub templates: Vec<TemplateConfig>,

    /// Template used when the caller does not pick one.
    pub default_template: String,
}

impl CvConfig {
    pub fn has_template(&self, id: &str) -> bool {
        self.templates.iter().any(|t| t.id == id)
    }
}

impl Default for CvConfig {
    fn default() -> Self {
        Self {
            templates: vec![
                TemplateConfig::new("simples", "Simples"),
                TemplateConfig::new("moderno", "Moderno"),
                TemplateConfig::new("executivo", "Executivo"),
            ],
            default_template: "simples".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TemplateConfig {
    pub id: String,
    pub label: String,
}

impl TemplateConfig {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Cross-origin policy.
    pub cors: CorsConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 12 * 1024 * 1024, // resume ceiling plus multipart overhead
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin resource sharing.
///
/// Outside production every origin is allowed. In production only origins
/// ending with one of `allowed_origin_suffixes` are. Requests without an
/// `Origin` header are never affected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,

    /// e.g. ".vercel.app" admits `https://my-app.vercel.app`.
    pub allowed_origin_suffixes: Vec<String>,

    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origin_suffixes: vec![".vercel.app".to_string()],
            allow_credentials: true,
            max_age_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

pub const PLACEHOLDER_ADMIN_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_ADMIN_KEY.to_string(),
            bind_address: "127.0.0.1:3001".to_string(),
        }
    }
}
