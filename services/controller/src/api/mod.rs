//! HTTP API handlers and routing.

pub mod error;
mod health;
pub mod ingress;
mod request_context;
mod v1;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Request},
    routing::post,
    Router,
};
use gridwide_id::RequestId;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId as HeaderRequestId, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Largest accepted request body; region archives travel inline.
pub const MAX_BODY_BYTES: usize = 1024 * 1024 * 1024;

/// Stamps requests lacking an `x-request-id` with a fresh [`RequestId`].
#[derive(Debug, Clone, Copy, Default)]
struct MakeGridRequestId;

impl MakeRequestId for MakeGridRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<HeaderRequestId> {
        HeaderValue::from_str(&RequestId::new().to_string())
            .ok()
            .map(HeaderRequestId::new)
    }
}

/// Create the main API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        // Operator API
        .nest("/v1", v1::routes())
        // Announce paths minted per registration session
        .route("/{callback}", post(ingress::announce))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeGridRequestId))
        .with_state(state)
}
