//! The gateway: routing, filtering, dispatch and response writing.
//!
//! # Responsibilities
//! - Collect filters, TLS pairs and timing settings while configuring
//! - Build the per-instance router and hand it to the listener
//! - Per request: read body → filter chain → call identifier → backend → response
//!
//! # States
//! [`Gateway`] is the configuring state. [`Gateway::start`] consumes it and
//! returns a [`RunningGateway`], which has no configuration methods left.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};

use crate::backend::Backend;
use crate::config::{GatewayConfig, ListenerConfig, TlsConfig};
use crate::filter::{FilterChain, HttpFilter};
use crate::http::request::InboundEnvelope;
use crate::http::response::{OutboundEnvelope, JSON_CONTENT_TYPE};
use crate::net::{Listener, ListenerError, ListenerHandle};
use crate::observability::metrics;
use crate::routing::{build_router, CallIdentifier};

/// Shared, read-only state injected into the handler.
#[derive(Clone)]
struct AppState {
    filters: Arc<FilterChain>,
    backend: Arc<dyn Backend>,
    print_request_time: bool,
}

/// A gateway being configured.
pub struct Gateway {
    port: u16,
    read_timeout: Duration,
    write_timeout: Duration,
    max_header_bytes: usize,
    certificates: Vec<TlsConfig>,
    filters: FilterChain,
    backend: Arc<dyn Backend>,
    print_request_time: bool,
}

impl Gateway {
    /// A plaintext gateway on `port` with the default timeouts and header cap.
    pub fn new(port: u16, backend: impl Backend) -> Self {
        let defaults = ListenerConfig::default();
        Self {
            port,
            read_timeout: defaults.read_timeout(),
            write_timeout: defaults.write_timeout(),
            max_header_bytes: defaults.max_header_bytes,
            certificates: Vec::new(),
            filters: FilterChain::new(),
            backend: Arc::new(backend),
            print_request_time: false,
        }
    }

    /// A gateway set up from a loaded configuration, TLS pairs included.
    pub fn from_config(config: &GatewayConfig, backend: impl Backend) -> Result<Self, ListenerError> {
        let listener = &config.listener;
        let mut gateway = Self::new(listener.port, backend)
            .with_timeouts(listener.read_timeout(), listener.write_timeout())
            .with_max_header_bytes(listener.max_header_bytes);
        for pair in &listener.tls {
            gateway.enable_tls(pair.cert_path.as_str(), pair.key_path.as_str())?;
        }
        gateway.set_print_request_time(config.gateway.print_request_time);
        Ok(gateway)
    }

    pub fn with_timeouts(mut self, read_timeout: Duration, write_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self.write_timeout = write_timeout;
        self
    }

    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    /// Append a filter. Filters run in the order they were appended.
    pub fn append_filter(&mut self, filter: impl HttpFilter) {
        self.filters.append(filter);
    }

    /// Register a certificate/key pair; the gateway then serves HTTPS.
    pub fn enable_tls(
        &mut self,
        cert_path: impl Into<String>,
        key_path: impl Into<String>,
    ) -> Result<(), ListenerError> {
        let cert_path = cert_path.into();
        let key_path = key_path.into();
        if cert_path.is_empty() || key_path.is_empty() {
            return Err(ListenerError::MissingTlsPath);
        }
        self.certificates.push(TlsConfig {
            cert_path,
            key_path,
        });
        Ok(())
    }

    pub fn set_print_request_time(&mut self, enabled: bool) {
        self.print_request_time = enabled;
    }

    pub fn print_request_time(&self) -> bool {
        self.print_request_time
    }

    pub fn is_tls(&self) -> bool {
        !self.certificates.is_empty()
    }

    /// Freeze the configuration into a router without binding anything.
    pub fn into_router(self) -> Router {
        let state = AppState {
            filters: Arc::new(self.filters),
            backend: self.backend,
            print_request_time: self.print_request_time,
        };
        build_router(any(call_handler).with_state(state))
    }

    /// Freeze the configuration into a listener that has not started yet.
    pub fn into_listener(mut self) -> Result<Listener, ListenerError> {
        let (port, read_timeout, write_timeout) = (self.port, self.read_timeout, self.write_timeout);
        let max_header_bytes = self.max_header_bytes;
        let certificates = std::mem::take(&mut self.certificates);

        let mut listener = Listener::new(port, self.into_router(), read_timeout, write_timeout)
            .with_max_header_bytes(max_header_bytes);
        for pair in certificates {
            listener.enable_tls(pair.cert_path, pair.key_path)?;
        }
        Ok(listener)
    }

    /// Start serving on a background task.
    pub fn start(self) -> Result<RunningGateway, ListenerError> {
        let filters = self.filters.len();
        let listener = self.into_listener()?;
        tracing::info!(
            port = listener.port(),
            tls = listener.is_tls(),
            filters,
            "Gateway starting"
        );
        Ok(RunningGateway {
            handle: listener.start(),
        })
    }
}

/// A gateway that is serving traffic.
#[derive(Clone)]
pub struct RunningGateway {
    handle: ListenerHandle,
}

impl RunningGateway {
    /// Wait for the listener to bind and return its address.
    pub async fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.handle.local_addr().await
    }

    /// Stop accepting connections; in-flight calls get `grace` to finish.
    pub fn shutdown(&self, grace: Duration) {
        self.handle.shutdown(grace);
    }

    pub fn connection_count(&self) -> usize {
        self.handle.connection_count()
    }
}

async fn call_handler(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("rpc: failed to read request body: {e}"),
            )
                .into_response();
        }
    };

    let path = parts.uri.path().to_string();
    let mut response_headers = HeaderMap::new();
    if let Err(rejection) = state.filters.evaluate(&path, &mut response_headers, &parts) {
        tracing::debug!(path = %path, reason = %rejection, "Request rejected by filter");
        return (response_headers, rejection.to_string()).into_response();
    }

    let start = Instant::now();
    let identifier = match CallIdentifier::from_path(&path) {
        Ok(id) => id,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, response_headers, e.to_string()).into_response()
        }
    };

    let inbound = InboundEnvelope::new(parts.headers, body);
    let mut outbound = OutboundEnvelope::default();
    let result = state.backend.call(&identifier, inbound, &mut outbound).await;
    let elapsed = start.elapsed();

    metrics::record_call(result.is_ok(), elapsed);
    if state.print_request_time {
        tracing::info!(elapsed = ?elapsed, call = %identifier, "Call completed");
    }

    if let Err(e) = result {
        tracing::error!(call = %identifier, error = %e, "Backend call failed");
        outbound.set_payload(e.to_string());
    }

    (
        response_headers,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        outbound.into_payload(),
    )
        .into_response()
}
