//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows, caps and intervals > 0)
//! - Check that configured regex patterns compile
//! - Check that the static fallback cannot escape the static root
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ConfigViolation>>
//! - Runs before config is accepted into the system (startup and hot reload)

use std::net::SocketAddr;
use std::path::{Component, Path};

use regex::Regex;

use crate::config::schema::{GatewayConfig, UploadClassConfig, PLACEHOLDER_ADMIN_KEY};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ConfigViolation {
    pub field: String,
    pub message: String,
}

impl ConfigViolation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ConfigViolation>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if config.timeouts.request_secs == 0 {
        errors.push(ConfigViolation::new("timeouts.request_secs", "must be greater than 0"));
    }

    let rl = &config.rate_limit;
    for (field, value) in [
        ("rate_limit.window_secs", rl.window_secs),
        ("rate_limit.cleanup_interval_secs", rl.cleanup_interval_secs),
        ("rate_limit.max_requests", rl.max_requests as u64),
        ("rate_limit.max_map_size", rl.max_map_size as u64),
    ] {
        if value == 0 {
            errors.push(ConfigViolation::new(field, "must be greater than 0"));
        }
    }

    let v = &config.validation;
    if v.max_text_length == 0 {
        errors.push(ConfigViolation::new("validation.max_text_length", "must be greater than 0"));
    }
    if v.min_text_length > v.max_text_length {
        errors.push(ConfigViolation::new(
            "validation.min_text_length",
            "must not exceed validation.max_text_length",
        ));
    }
    for (field, pattern) in [
        ("validation.email_pattern", &v.email_pattern),
        ("validation.phone_pattern", &v.phone_pattern),
    ] {
        if let Err(e) = Regex::new(pattern) {
            errors.push(ConfigViolation::new(field, format!("invalid regex: {e}")));
        }
    }

    check_upload_class(&mut errors, "uploads.photo", &config.uploads.photo);
    check_upload_class(&mut errors, "uploads.resume", &config.uploads.resume);

    if config.artifacts.retention_secs == 0 {
        errors.push(ConfigViolation::new("artifacts.retention_secs", "must be greater than 0"));
    }
    if config.artifacts.sweep_interval_secs == 0 {
        errors.push(ConfigViolation::new(
            "artifacts.sweep_interval_secs",
            "must be greater than 0",
        ));
    }

    if config.static_files.root.trim().is_empty() {
        errors.push(ConfigViolation::new("static_files.root", "must not be empty"));
    }
    let fallback = Path::new(&config.static_files.fallback);
    if config.static_files.fallback.is_empty()
        || fallback
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
    {
        errors.push(ConfigViolation::new(
            "static_files.fallback",
            "must be a plain relative path inside the static root",
        ));
    }

    if config.cv.templates.is_empty() {
        errors.push(ConfigViolation::new("cv.templates", "at least one template is required"));
    } else if !config.cv.has_template(&config.cv.default_template) {
        errors.push(ConfigViolation::new(
            "cv.default_template",
            format!("'{}' is not a configured template", config.cv.default_template),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ConfigViolation::new("security.max_body_size", "must be greater than 0"));
    }
    // an empty suffix matches every origin
    if config
        .security
        .cors
        .allowed_origin_suffixes
        .iter()
        .any(|s| s.trim().is_empty())
    {
        errors.push(ConfigViolation::new(
            "security.cors.allowed_origin_suffixes",
            "entries must not be empty",
        ));
    }

    if config.observability.metrics_enabled {
        check_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        check_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() || config.admin.api_key == PLACEHOLDER_ADMIN_KEY {
            errors.push(ConfigViolation::new(
                "admin.api_key",
                "must be set to a real key when the admin API is enabled",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ConfigViolation>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ConfigViolation::new(field, format!("'{value}' is not a socket address")));
    }
}

fn check_upload_class(errors: &mut Vec<ConfigViolation>, prefix: &str, class: &UploadClassConfig) {
    if class.max_bytes == 0 {
        errors.push(ConfigViolation::new(format!("{prefix}.max_bytes"), "must be greater than 0"));
    }
    if class.allowed_types.is_empty() {
        errors.push(ConfigViolation::new(format!("{prefix}.allowed_types"), "must not be empty"));
    }
    if class.allowed_extensions.is_empty() {
        errors.push(ConfigViolation::new(
            format!("{prefix}.allowed_extensions"),
            "must not be empty",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_violation() {
        let mut config = GatewayConfig::default();
        config.rate_limit.max_requests = 0;
        config.validation.phone_pattern = "([".to_string();
        config.static_files.fallback = "../index.html".to_string();
        config.cv.default_template = "missing".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "rate_limit.max_requests",
                "validation.phone_pattern",
                "static_files.fallback",
                "cv.default_template",
            ]
        );
    }

    #[test]
    fn test_empty_cors_suffix_is_rejected() {
        let mut config = GatewayConfig::default();
        config.security.cors.allowed_origin_suffixes = vec![".vercel.app".into(), " ".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "security.cors.allowed_origin_suffixes");
    }

    #[test]
    fn test_admin_requires_real_key() {
        let mut config = GatewayConfig::default();
        config.admin.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "admin.api_key");

        config.admin.api_key = "s3cret".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
