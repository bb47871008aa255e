//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, depth > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all violations, not just the first
//! - Pure function: DispatchConfig → Result<(), Vec<ConfigViolation>>

use std::net::SocketAddr;

use crate::config::schema::DispatchConfig;

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ConfigViolation {
    pub field: &'static str,
    pub message: String,
}

impl ConfigViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ConfigViolation>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ConfigViolation::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let routes = &config.routes;
    let mount = routes.mount.trim_matches('/');
    if mount.is_empty() || mount.contains('/') {
        errors.push(ConfigViolation::new(
            "routes.mount",
            "must be a single non-empty path segment",
        ));
    }
    if routes.max_depth == 0 {
        errors.push(ConfigViolation::new("routes.max_depth", "must be at least 1"));
    }
    if !is_plain_extension(&routes.module_extension) {
        errors.push(ConfigViolation::new(
            "routes.module_extension",
            "must be non-empty and contain no dot or slash",
        ));
    }
    if !is_plain_extension(&config.hooks.extension) {
        errors.push(ConfigViolation::new(
            "hooks.extension",
            "must be non-empty and contain no dot or slash",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ConfigViolation::new("timeouts.request_secs", "must be greater than 0"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ConfigViolation::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_plain_extension(ext: &str) -> bool {
    !ext.is_empty() && !ext.contains(['.', '/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&DispatchConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_violation() {
        let mut config = DispatchConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.routes.mount = "a/b".into();
        config.routes.max_depth = 0;
        config.routes.module_extension = ".rs".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "routes.mount",
                "routes.max_depth",
                "routes.module_extension",
                "timeouts.request_secs",
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = DispatchConfig::default();
        config.observability.metrics_address = "bad".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
