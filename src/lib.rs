//! HTTP-to-RPC gateway library.
//!
//! Maps `/{server}/{method}` requests to `_<server>.HTTP_<method>` calls,
//! runs them through a filter chain and dispatches them to a [`Backend`].

pub mod backend;
pub mod config;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use backend::{Backend, CallError};
pub use config::GatewayConfig;
pub use filter::{FilterRejection, HttpFilter};
pub use http::{Gateway, InboundEnvelope, OutboundEnvelope, RunningGateway};
pub use routing::CallIdentifier;
