//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_calls_total` (counter): backend calls by outcome (`ok`/`error`)
//! - `gateway_call_duration_seconds` (histogram): backend call latency
//!
//! # Design Decisions
//! - No per-call-identifier label: identifiers come from client paths
//! - Recording is a no-op until an exporter is installed

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one backend call.
pub fn record_call(ok: bool, elapsed: Duration) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("gateway_calls_total", "outcome" => outcome).increment(1);
    metrics::histogram!("gateway_call_duration_seconds").record(elapsed.as_secs_f64());
}
