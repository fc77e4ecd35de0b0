//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Listener (plaintext or TLS)
//!     → routing (CORS, request ID, /{server}/{method} match)
//!     → server.rs (read body, filter chain, call identifier)
//!     → request.rs (InboundEnvelope handed to the backend)
//!     → response.rs (OutboundEnvelope payload)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{InboundEnvelope, X_REQUEST_ID};
pub use response::{OutboundEnvelope, JSON_CONTENT_TYPE, SERVICE_ERROR_ENVELOPE};
pub use server::{Gateway, RunningGateway};
