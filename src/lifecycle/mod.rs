//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Configure gateway → Start listener
//!
//! Shutdown (signals.rs):
//!     SIGTERM/SIGINT → stop accepting → drain in-flight calls → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Shutdown has a deadline; calls still running after it are dropped

pub mod signals;

pub use signals::shutdown_signal;
