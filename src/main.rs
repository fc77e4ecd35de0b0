//! rpc-gateway
//!
//! Terminates HTTP(S), maps `/{server}/{method}` to `_<server>.HTTP_<method>`
//! and forwards each call to an upstream dispatch service.
//!
//! ```text
//!     Client ──▶ listener ──▶ CORS / request ID ──▶ path match ──▶ filters
//!                                                                    │
//!     Client ◀── JSON payload ◀── response writer ◀── UpstreamBackend ◀┘
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use axum::http::Uri;
use clap::Parser;

use rpc_gateway::backend::UpstreamBackend;
use rpc_gateway::config::{self, validation::validate_config, ConfigError, GatewayConfig};
use rpc_gateway::observability::{logging, metrics};
use rpc_gateway::{lifecycle, Gateway};

#[derive(Parser)]
#[command(name = "rpc-gateway")]
#[command(about = "HTTP-to-RPC gateway", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration file.
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream dispatch service URL, overriding the configuration file.
    #[arg(short, long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    if let Some(upstream) = cli.upstream {
        config.backend.upstream_url = upstream;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rpc-gateway starting");

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let upstream: Uri = config.backend.upstream_url.parse()?;
    let backend = UpstreamBackend::new(
        &upstream,
        Duration::from_secs(config.backend.connect_timeout_secs),
    );

    let gateway = Gateway::from_config(&config, backend)?;
    let running = gateway.start()?;
    if let Some(addr) = running.local_addr().await {
        tracing::info!(address = %addr, upstream = %upstream, "Gateway ready");
    }

    lifecycle::shutdown_signal().await;

    let grace = config.listener.write_timeout();
    running.shutdown(grace);
    let deadline = Instant::now() + grace;
    while running.connection_count() > 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
