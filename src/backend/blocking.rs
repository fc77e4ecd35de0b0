//! Adapter for synchronous dispatch functions.

use std::sync::Arc;

use crate::backend::{Backend, CallError, CallFuture};
use crate::http::{InboundEnvelope, OutboundEnvelope};
use crate::routing::CallIdentifier;

/// Runs a synchronous dispatch function on tokio's blocking pool, so a slow
/// call never stalls the connection tasks.
pub struct BlockingBackend<F> {
    dispatch: Arc<F>,
}

impl<F> BlockingBackend<F>
where
    F: Fn(&CallIdentifier, InboundEnvelope) -> Result<OutboundEnvelope, CallError>
        + Send
        + Sync
        + 'static,
{
    pub fn new(dispatch: F) -> Self {
        Self {
            dispatch: Arc::new(dispatch),
        }
    }
}

impl<F> Backend for BlockingBackend<F>
where
    F: Fn(&CallIdentifier, InboundEnvelope) -> Result<OutboundEnvelope, CallError>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        identifier: &'a CallIdentifier,
        request: InboundEnvelope,
        response: &'a mut OutboundEnvelope,
    ) -> CallFuture<'a> {
        let dispatch = Arc::clone(&self.dispatch);
        let owned = identifier.clone();
        Box::pin(async move {
            let result = tokio::task::spawn_blocking(move || dispatch(&owned, request))
                .await
                .map_err(|e| {
                    tracing::error!(call = %identifier, error = %e, "Dispatch task failed");
                    CallError::Aborted(identifier.to_string())
                })?;
            *response = result?;
            Ok(())
        })
    }
}
