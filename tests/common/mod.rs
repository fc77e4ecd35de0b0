//! Shared utilities for the integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use rpc_gateway::backend::{Backend, CallError, CallFuture};
use rpc_gateway::{CallIdentifier, InboundEnvelope, OutboundEnvelope};
use tempfile::NamedTempFile;
use tower::ServiceExt;

/// One call observed by a [`RecordingBackend`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub identifier: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
enum Reply {
    Payload(Bytes),
    Fail { partial: Bytes, message: String },
}

/// Backend that records every call and answers with a fixed reply.
#[derive(Clone)]
pub struct RecordingBackend {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    reply: Reply,
}

impl RecordingBackend {
    /// Answer every call with `payload`.
    pub fn replying(payload: &'static str) -> Self {
        Self {
            calls: Arc::default(),
            reply: Reply::Payload(Bytes::from_static(payload.as_bytes())),
        }
    }

    /// Write `partial` into the response, then fail with `message`.
    pub fn failing(partial: &'static str, message: &'static str) -> Self {
        Self {
            calls: Arc::default(),
            reply: Reply::Fail {
                partial: Bytes::from_static(partial.as_bytes()),
                message: message.to_string(),
            },
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Backend for RecordingBackend {
    fn call<'a>(
        &'a self,
        identifier: &'a CallIdentifier,
        request: InboundEnvelope,
        response: &'a mut OutboundEnvelope,
    ) -> CallFuture<'a> {
        Box::pin(async move {
            let (headers, body) = request.into_parts();
            self.calls.lock().unwrap().push(RecordedCall {
                identifier: identifier.to_string(),
                headers,
                body,
            });
            match &self.reply {
                Reply::Payload(payload) => {
                    response.set_payload(payload.clone());
                    Ok(())
                }
                Reply::Fail { partial, message } => {
                    response.set_payload(partial.clone());
                    Err(CallError::service(message.clone()))
                }
            }
        })
    }
}

/// Response pieces the tests assert on.
pub struct Captured {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Drive one request through a router in-process.
pub async fn send(router: Router, request: Request<Body>) -> Captured {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    Captured {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Self-signed certificate and key for `names`, written to temp files.
pub fn self_signed(names: &[&str]) -> (NamedTempFile, NamedTempFile) {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(names.iter().map(|n| n.to_string()).collect::<Vec<_>>())
            .unwrap();
    let mut cert_file = NamedTempFile::new().unwrap();
    cert_file.write_all(cert.pem().as_bytes()).unwrap();
    let mut key_file = NamedTempFile::new().unwrap();
    key_file.write_all(key_pair.serialize_pem().as_bytes()).unwrap();
    (cert_file, key_file)
}

/// Path of a temp file as the `String` the TLS API takes.
pub fn path_of(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().into_owned()
}
