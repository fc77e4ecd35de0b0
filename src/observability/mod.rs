//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! gateway handler, listener, backends
//!     → logging.rs (structured log events)
//!     → metrics.rs (call counters and latency histogram)
//!
//! Consumers:
//!     → stdout (human-readable or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
