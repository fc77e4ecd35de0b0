//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Listener::new (port, handler, timeouts)
//!     → enable_tls (zero or more certificate pairs)
//!     → start (spawn serve task)
//!     → serve: tls.rs loads every pair → bind → accept loop
//! ```
//!
//! # Design Decisions
//! - Every failure while loading certificates or binding is fatal
//! - TLS material is loaded before the port is bound
//! - Configured read/write timeouts are enforced, not just recorded

pub mod listener;
pub mod tls;

pub use listener::{Listener, ListenerError, ListenerHandle};
pub use tls::TlsError;
