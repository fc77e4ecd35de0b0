//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (port, timeouts, TLS).
    pub listener: ListenerConfig,

    /// Request handling settings.
    pub gateway: HandlerConfig,

    /// Upstream dispatch service used by the binary.
    pub backend: BackendConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// TCP port to listen on, on all interfaces. `0` picks an ephemeral port.
    pub port: u16,

    /// Deadline for reading request headers and the request body, in seconds.
    pub read_timeout_secs: u64,

    /// Deadline for producing the response, in seconds.
    pub write_timeout_secs: u64,

    /// Upper bound on the size of request headers.
    pub max_header_bytes: usize,

    /// Certificate/key pairs. Non-empty means the listener serves HTTPS.
    pub tls: Vec<TlsConfig>,
}

impl ListenerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            read_timeout_secs: 10,
            write_timeout_secs: 10,
            max_header_bytes: 1 << 20,
            tls: Vec::new(),
        }
    }
}

/// TLS certificate pair for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate chain file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Per-request handling settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HandlerConfig {
    /// Log the duration of every backend call at info level.
    pub print_request_time: bool,
}

/// Upstream dispatch service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL calls are forwarded to, e.g. `http://127.0.0.1:9000/rpc`.
    pub upstream_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            upstream_url: "http://127.0.0.1:9000".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Bind address of the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "rpc_gateway=info,tower_http=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_uses_defaults() {
        let config: GatewayConfig = toml::from_str("[listener]\nport = 9443\n").unwrap();
        assert_eq!(config.listener.port, 9443);
        assert_eq!(config.listener.read_timeout(), Duration::from_secs(10));
        assert_eq!(config.listener.max_header_bytes, 1 << 20);
        assert!(config.listener.tls.is_empty());
        assert!(!config.gateway.print_request_time);
    }

    #[test]
    fn tls_pairs_parse_in_order() {
        let raw = r#"
            [[listener.tls]]
            cert_path = "a.crt"
            key_path = "a.key"

            [[listener.tls]]
            cert_path = "b.crt"
            key_path = "b.key"
        "#;
        let config: GatewayConfig = toml::from_str(raw).unwrap();
        let certs: Vec<_> = config.listener.tls.iter().map(|t| t.cert_path.as_str()).collect();
        assert_eq!(certs, ["a.crt", "b.crt"]);
    }
}
