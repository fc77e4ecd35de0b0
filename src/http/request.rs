//! Inbound request envelope.
//!
//! # Responsibilities
//! - Capture the request headers and the fully read body once
//! - Hand both to the backend unchanged
//!
//! # Design Decisions
//! - Immutable after capture; the backend takes it by value, so it is
//!   consumed exactly once
//! - Headers keep every value of repeated names, in arrival order

use axum::body::Bytes;
use axum::http::HeaderMap;

/// Header set by the request ID middleware and forwarded to the backend.
pub const X_REQUEST_ID: &str = "x-request-id";

/// What the backend receives for one HTTP call.
#[derive(Debug, Clone, Default)]
pub struct InboundEnvelope {
    headers: HeaderMap,
    body: Bytes,
}

impl InboundEnvelope {
    pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// All values sent for `name`, in order. Values that are not visible ASCII are skipped.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// The request ID assigned at the edge, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }

    pub fn into_parts(self) -> (HeaderMap, Bytes) {
        (self.headers, self.body)
    }
}
