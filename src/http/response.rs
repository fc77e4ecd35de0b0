//! Outbound response envelope.
//!
//! # Responsibilities
//! - Carry the raw payload produced by the backend
//! - Serialize typed results to JSON for backend implementations
//!
//! # Design Decisions
//! - A value that fails to serialize never yields a partial payload; the
//!   fixed service error envelope is written instead

use axum::body::Bytes;
use serde::Serialize;

/// Content type of every dispatched response.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Payload written when a result cannot be serialized.
pub const SERVICE_ERROR_ENVELOPE: &[u8] = br#"{"Code": 2,"Message":"service error"}"#;

/// What the backend hands back for one HTTP call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundEnvelope {
    payload: Bytes,
}

impl OutboundEnvelope {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
        self.payload = payload.into();
    }

    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Serialize `value` as the payload.
    ///
    /// On failure the payload becomes [`SERVICE_ERROR_ENVELOPE`], the error is
    /// logged, and returned so callers can tell it apart from success.
    pub fn write_response<T>(&mut self, value: &T) -> Result<(), serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_vec(value) {
            Ok(json) => {
                self.payload = Bytes::from(json);
                Ok(())
            }
            Err(e) => {
                self.payload = Bytes::from_static(SERVICE_ERROR_ENVELOPE);
                tracing::error!(error = %e, "Failed to serialize response");
                Err(e)
            }
        }
    }
}
