//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config
//! files. Every field has a default so a minimal (or empty) config works:
//! listener on `127.0.0.1:3000`, plaintext upstream on `127.0.0.1:8000`.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// The single upstream the relay forwards to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// TLS key material. When absent the relay serves plaintext, which is
    /// only intended for tests and local runs.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// The fixed plaintext backend requests are forwarded to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream host (name or IP).
    pub host: String,

    /// Upstream port.
    pub port: u16,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl UpstreamConfig {
    /// The `host:port` authority placed on forwarded request URIs.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the upstream to produce response headers, in
    /// seconds. Body streaming is not bounded by this.
    pub request_secs: u64,

    /// Grace period for draining in-flight sessions on shutdown, in
    /// seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_loopback_only() {
        let config = RelayConfig::default();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert!(config.listener.tls.is_none());
        assert_eq!(config.upstream.authority(), "127.0.0.1:8000");
    }

    #[test]
    fn minimal_toml_deserializes_with_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [upstream]
            port = 9100
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.host, "127.0.0.1");
        assert_eq!(config.upstream.port, 9100);
        assert_eq!(config.timeouts.connect_secs, 5);
    }
}
