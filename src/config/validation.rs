//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, header cap large enough)
//! - Validate addresses and URLs before anything binds or connects
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::Uri;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// Smallest read buffer hyper accepts for HTTP/1.
pub const MIN_HEADER_BYTES: usize = 8 * 1024;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("listener.max_header_bytes must be at least {MIN_HEADER_BYTES}, got {0}")]
    HeaderLimitTooSmall(usize),

    #[error("listener.tls[{0}] has an empty certificate or key path")]
    EmptyTlsPath(usize),

    #[error("backend.upstream_url {0:?} is not an absolute http URL")]
    InvalidUpstream(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let listener = &config.listener;

    if listener.read_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("read_timeout_secs"));
    }
    if listener.write_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("write_timeout_secs"));
    }
    if listener.max_header_bytes < MIN_HEADER_BYTES {
        errors.push(ValidationError::HeaderLimitTooSmall(listener.max_header_bytes));
    }
    for (i, tls) in listener.tls.iter().enumerate() {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath(i));
        }
    }

    let upstream_ok = config
        .backend
        .upstream_url
        .parse::<Uri>()
        .map(|uri| {
            uri.scheme_str() == Some("http") && uri.authority().is_some()
        })
        .unwrap_or(false);
    if !upstream_ok {
        errors.push(ValidationError::InvalidUpstream(config.backend.upstream_url.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsConfig;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = GatewayConfig::default();
        config.listener.read_timeout_secs = 0;
        config.listener.max_header_bytes = 512;
        config.listener.tls.push(TlsConfig {
            cert_path: "server.crt".into(),
            key_path: String::new(),
        });
        config.backend.upstream_url = "not a url".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroTimeout("read_timeout_secs"),
                ValidationError::HeaderLimitTooSmall(512),
                ValidationError::EmptyTlsPath(0),
                ValidationError::InvalidUpstream("not a url".into()),
            ]
        );
    }

    #[test]
    fn upstream_must_be_plain_http() {
        let mut config = GatewayConfig::default();
        config.backend.upstream_url = "https://dispatch.internal".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidUpstream(
                "https://dispatch.internal".into()
            )])
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress("nowhere".into())])
        );
    }
}
