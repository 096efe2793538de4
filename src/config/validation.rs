//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Backend endpoints must be absolute http(s) URLs
//! - Validate value ranges (limits > 0, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::IpAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backend.token_endpoint.trim().is_empty() {
        errors.push(ValidationError::new("backend.token_endpoint", "is required"));
    } else if let Err(message) = check_endpoint(&config.backend.token_endpoint) {
        errors.push(ValidationError::new("backend.token_endpoint", message));
    }

    if let Some(endpoint) = &config.backend.introspection_endpoint {
        if let Err(message) = check_endpoint(endpoint) {
            errors.push(ValidationError::new("backend.introspection_endpoint", message));
        }
    }

    if config.listener.host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.host",
            format!("'{}' is not an IP address", config.listener.host),
        ));
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be greater than 0"));
    }

    if config.timeouts.backend_secs == Some(0) {
        errors.push(ValidationError::new(
            "timeouts.backend_secs",
            "must be greater than 0 (omit it to wait indefinitely)",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("'{}' is not a valid URL: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.backend.token_endpoint = "https://idp.example.com/token".into();
        config
    }

    #[test]
    fn accepts_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn rejects_non_http_scheme() {
        let mut config = valid_config();
        config.backend.introspection_endpoint = Some("ftp://idp.example.com/introspect".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "backend.introspection_endpoint");
    }

    #[test]
    fn reports_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.host = "not-an-ip".into();
        config.listener.max_connections = 0;
        config.limits.max_body_bytes = 0;
        config.timeouts.backend_secs = Some(0);

        let fields: Vec<_> = validate_config(&config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "backend.token_endpoint",
                "listener.host",
                "listener.max_connections",
                "limits.max_body_bytes",
                "timeouts.backend_secs",
            ]
        );
    }

    #[test]
    fn rejects_relative_url() {
        let mut config = valid_config();
        config.backend.token_endpoint = "/oauth/token".into();
        assert!(validate_config(&config).is_err());
    }
}
