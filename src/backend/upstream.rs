//! Forwarding calls to an HTTP dispatch service.
//!
//! Each call becomes `POST {base}/{identifier}` carrying the original headers
//! and body. A 2xx answer's body is the payload; anything else is a
//! [`CallError`].

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, Uri};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::backend::{Backend, CallError, CallFuture};
use crate::http::{InboundEnvelope, OutboundEnvelope};
use crate::routing::CallIdentifier;

/// Largest upstream response body accepted.
const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

/// Headers that describe a single hop and must not be forwarded.
const HOP_BY_HOP: [header::HeaderName; 8] = [
    header::CONNECTION,
    header::HOST,
    header::CONTENT_LENGTH,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Backend that forwards every call over HTTP.
#[derive(Clone)]
pub struct UpstreamBackend {
    client: Client<HttpConnector, Body>,
    base: String,
}

impl UpstreamBackend {
    /// Create a backend for `base`, e.g. `http://127.0.0.1:9000/rpc`.
    pub fn new(base: &Uri, connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            base: base.to_string().trim_end_matches('/').to_string(),
        }
    }

    /// URI a call is forwarded to.
    pub fn target(&self, identifier: &CallIdentifier) -> Result<Uri, CallError> {
        format!("{}/{}", self.base, identifier)
            .parse()
            .map_err(|e| CallError::Transport(format!("invalid upstream URI: {e}")))
    }

    async fn forward(
        &self,
        identifier: &CallIdentifier,
        request: InboundEnvelope,
        response: &mut OutboundEnvelope,
    ) -> Result<(), CallError> {
        let uri = self.target(identifier)?;
        let (headers, body) = request.into_parts();

        let mut upstream = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::from(body))
            .map_err(|e| CallError::Transport(e.to_string()))?;
        *upstream.headers_mut() = forwardable(headers);

        let reply: hyper::Response<Incoming> = self
            .client
            .request(upstream)
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        let status = reply.status();
        let bytes = axum::body::to_bytes(Body::new(reply.into_body()), MAX_RESPONSE_BYTES)
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        if status.is_success() {
            response.set_payload(bytes);
            Ok(())
        } else {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            response.set_payload(bytes);
            Err(CallError::Status { status, body })
        }
    }
}

impl Backend for UpstreamBackend {
    fn call<'a>(
        &'a self,
        identifier: &'a CallIdentifier,
        request: InboundEnvelope,
        response: &'a mut OutboundEnvelope,
    ) -> CallFuture<'a> {
        Box::pin(self.forward(identifier, request, response))
    }
}

fn forwardable(mut headers: HeaderMap) -> HeaderMap {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
    headers
}
