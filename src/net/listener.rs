//! HTTP/HTTPS listener.
//!
//! # Responsibilities
//! - Hold the endpoint configuration (port, handler, timeouts, certificates)
//! - Load TLS material before accepting any connection
//! - Bind and serve on a background task
//! - Turn startup and serve failures into process exit

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use axum_server::Handle;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use hyper_util::server::conn::auto;
use thiserror::Error;
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};

use crate::config::validation::MIN_HEADER_BYTES;
use crate::config::TlsConfig;
use crate::net::tls::{self, TlsError};

/// Default cap on request header size.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 1 << 20;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// `enable_tls` was given an empty certificate or key path.
    #[error("TLS needs both a certificate file and a key file")]
    MissingTlsPath,

    /// A registered certificate pair could not be loaded.
    #[error("failed to load TLS pair [{cert}]-[{key}]: {source}")]
    Tls {
        cert: String,
        key: String,
        source: TlsError,
    },

    /// The header cap is below what hyper accepts for HTTP/1.
    #[error("max header bytes must be at least {MIN_HEADER_BYTES}, got {0}")]
    HeaderLimitTooSmall(usize),

    /// Binding or serving failed.
    #[error("failed to serve on {addr}: {source}")]
    Serve {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

/// A plaintext or TLS HTTP endpoint.
///
/// Configuration happens through `&mut self` methods; [`Listener::start`]
/// consumes the listener, so nothing can change once it is serving.
pub struct Listener {
    port: u16,
    handler: Router,
    read_timeout: Duration,
    write_timeout: Duration,
    max_header_bytes: usize,
    certificates: Vec<TlsConfig>,
    handle: Handle,
}

impl Listener {
    /// Store the endpoint configuration. No I/O happens here.
    pub fn new(port: u16, handler: Router, read_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            port,
            handler,
            read_timeout,
            write_timeout,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            certificates: Vec::new(),
            handle: Handle::new(),
        }
    }

    /// Override the request header size cap.
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    /// Register a certificate/key pair and switch the listener to HTTPS.
    ///
    /// Can be called once per domain served on this port. Empty paths are
    /// rejected and leave the listener untouched.
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

    /// Whether the listener will serve HTTPS.
    pub fn is_tls(&self) -> bool {
        !self.certificates.is_empty()
    }

    /// Registered certificate pairs, in registration order.
    pub fn certificates(&self) -> &[TlsConfig] {
        &self.certificates
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve on a background task and return immediately.
    ///
    /// Any failure inside [`Listener::serve`] terminates the process.
    pub fn start(self) -> ListenerHandle {
        let handle = ListenerHandle {
            inner: self.handle.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = self.serve().await {
                fatal(&e);
            }
        });
        handle
    }

    /// Load TLS material, bind and serve until shut down.
    pub async fn serve(self) -> Result<(), ListenerError> {
        if self.max_header_bytes < MIN_HEADER_BYTES {
            return Err(ListenerError::HeaderLimitTooSmall(self.max_header_bytes));
        }
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let app = self
            .handler
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.write_timeout,
            ))
            .layer(RequestBodyTimeoutLayer::new(self.read_timeout))
            .into_make_service();

        let result = if self.certificates.is_empty() {
            let mut server = axum_server::bind(addr).handle(self.handle);
            apply_limits(server.http_builder(), self.read_timeout, self.max_header_bytes);

            tracing::info!(address = %addr, "HTTP listener starting");
            server.serve(app).await
        } else {
            let provider = tls::provider();
            let mut keys = Vec::with_capacity(self.certificates.len());
            for pair in &self.certificates {
                let key = tls::load_certified_key(
                    &provider,
                    Path::new(&pair.cert_path),
                    Path::new(&pair.key_path),
                )
                .await
                .map_err(|source| ListenerError::Tls {
                    cert: pair.cert_path.clone(),
                    key: pair.key_path.clone(),
                    source,
                })?;
                keys.push(key);
            }
            let first = &self.certificates[0];
            let rustls_config =
                tls::load_tls_config(provider, keys).map_err(|source| ListenerError::Tls {
                    cert: first.cert_path.clone(),
                    key: first.key_path.clone(),
                    source,
                })?;

            let mut server = axum_server::bind_rustls(addr, rustls_config).handle(self.handle);
            apply_limits(server.http_builder(), self.read_timeout, self.max_header_bytes);

            tracing::info!(
                address = %addr,
                certificates = self.certificates.len(),
                "HTTPS listener starting"
            );
            server.serve(app).await
        };

        result.map_err(|source| ListenerError::Serve { addr, source })?;
        tracing::info!(address = %addr, "Listener stopped");
        Ok(())
    }
}

fn apply_limits(
    builder: &mut auto::Builder<TokioExecutor>,
    read_timeout: Duration,
    max_header_bytes: usize,
) {
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(read_timeout)
        .max_buf_size(max_header_bytes);
}

/// Log at fatal severity and exit the process.
fn fatal(err: &ListenerError) -> ! {
    tracing::error!(fatal = true, error = %err, "Listener failed, exiting");
    std::process::exit(1);
}

/// Control handle for a started listener.
#[derive(Clone)]
pub struct ListenerHandle {
    inner: Handle,
}

impl ListenerHandle {
    /// Wait until the listener is bound and return its address.
    ///
    /// Returns `None` if binding failed.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.listening().await
    }

    /// Stop accepting connections and let in-flight requests finish within `grace`.
    pub fn shutdown(&self, grace: Duration) {
        self.inner.graceful_shutdown(Some(grace));
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.inner.connection_count()
    }
}
