//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//!
//! ```yaml
//! backend:
//!   token_endpoint: https://idp.example.com/oauth2/token
//!   introspection_endpoint: https://idp.example.com/oauth2/introspect
//! listener:
//!   port: 8080
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the token proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Authorization server endpoints.
    pub backend: BackendConfig,

    /// Listener configuration (host, port, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Upstream authorization server endpoints.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BackendConfig {
    /// Token endpoint URL; `/token` proxies here.
    pub token_endpoint: String,

    /// Introspection endpoint URL. `/introspection` is only mounted when set.
    pub introspection_endpoint: Option<String>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// TCP port to bind.
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl ListenerConfig {
    /// `host:port` string suitable for parsing into a socket address.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_connections: 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound on one backend round trip, in seconds.
    /// `None` waits indefinitely.
    pub backend_secs: Option<u64>,

    /// How long shutdown waits for in-flight connections to drain.
    pub shutdown_secs: u64,
}

impl TimeoutConfig {
    pub fn backend(&self) -> Option<Duration> {
        self.backend_secs.map(Duration::from_secs)
    }

    pub fn shutdown(&self) -> Duration {
        Duration::from_secs(self.shutdown_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            backend_secs: None,
            shutdown_secs: 10,
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let yaml = "backend:\n  token_endpoint: http://idp/token\nlistener:\n  port: 9000\n";
        let config: ProxyConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.backend.token_endpoint, "http://idp/token");
        assert!(config.backend.introspection_endpoint.is_none());
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.timeouts.backend(), None);
        assert_eq!(config.limits.max_body_bytes, 2 * 1024 * 1024);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn bind_address_brackets_ipv6() {
        let mut listener = ListenerConfig::default();
        assert_eq!(listener.bind_address(), "0.0.0.0:8080");

        listener.host = "::1".into();
        listener.port = 7000;
        assert_eq!(listener.bind_address(), "[::1]:7000");
    }
}
