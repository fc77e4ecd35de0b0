//! Backend call interface.
//!
//! The gateway does not execute calls itself. It hands every request, keyed
//! by its [`CallIdentifier`], to a [`Backend`] and writes back whatever
//! payload the backend produced.
//!
//! # Adapters
//! - [`BlockingBackend`] runs a synchronous dispatch function on tokio's
//!   blocking pool
//! - [`UpstreamBackend`] forwards calls to an HTTP dispatch service

pub mod blocking;
pub mod upstream;

use std::sync::Arc;

use axum::http::StatusCode;
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::http::{InboundEnvelope, OutboundEnvelope};
use crate::routing::CallIdentifier;

pub use blocking::BlockingBackend;
pub use upstream::UpstreamBackend;

/// Future returned by [`Backend::call`].
pub type CallFuture<'a> = BoxFuture<'a, Result<(), CallError>>;

/// Why a backend call failed. The display text is what the client receives.
#[derive(Debug, Error)]
pub enum CallError {
    /// The dispatch subsystem reported an error for this call.
    #[error("{0}")]
    Service(String),

    /// The upstream dispatch service answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The upstream dispatch service could not be reached.
    #[error("upstream unavailable: {0}")]
    Transport(String),

    /// A blocking dispatch function panicked or was cancelled.
    #[error("call {0} did not complete")]
    Aborted(String),
}

impl CallError {
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }
}

/// The external dispatch subsystem.
///
/// `response` may hold a partial payload when an error is returned; the
/// gateway replaces it with the error text.
pub trait Backend: Send + Sync + 'static {
    fn call<'a>(
        &'a self,
        identifier: &'a CallIdentifier,
        request: InboundEnvelope,
        response: &'a mut OutboundEnvelope,
    ) -> CallFuture<'a>;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn call<'a>(
        &'a self,
        identifier: &'a CallIdentifier,
        request: InboundEnvelope,
        response: &'a mut OutboundEnvelope,
    ) -> CallFuture<'a> {
        (**self).call(identifier, request, response)
    }
}
