//! Router assembly.
//!
//! # Responsibilities
//! - Register the single `/{server}/{method}` route
//! - Reject every other path with 400 before any handler runs
//! - Wrap everything in CORS, request ID and tracing middleware
//!
//! # Design Decisions
//! - One router per gateway instance; nothing is registered globally
//! - Path validation happens in a route layer, ahead of body reads and filters

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::routing::matcher::{self, RouteError, ROUTE_PATTERN};

/// Build the gateway router around `call`, the handler for matched call paths.
pub fn build_router(call: MethodRouter) -> Router {
    Router::new()
        .route(ROUTE_PATTERN, call)
        .route_layer(middleware::from_fn(require_call_path))
        .fallback(reject_path)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

async fn require_call_path(request: Request, next: Next) -> Response {
    match matcher::split_call_path(request.uri().path()) {
        Ok(_) => next.run(request).await,
        Err(e) => bad_path(e),
    }
}

async fn reject_path(request: Request) -> Response {
    bad_path(RouteError::Shape(request.uri().path().to_string()))
}

fn bad_path(error: RouteError) -> Response {
    tracing::debug!(error = %error, "Rejected request path");
    (StatusCode::BAD_REQUEST, error.to_string()).into_response()
}
