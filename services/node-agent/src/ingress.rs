//! Command ingress.
//!
//! The controller POSTs commands to the URLs minted in announces. Unknown
//! paths answer 404. Every request to a live path answers an empty 200; host
//! failures are logged here and never reach the controller.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use gridwide_id::{NodeCallbackId, RequestId};
use gridwide_protocol::{Command, Envelope};
use serde::Serialize;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId as HeaderRequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, warn};

use crate::agent::NodeAgent;

/// Largest accepted command body; region archives travel inline.
pub const MAX_BODY_BYTES: usize = 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default)]
struct MakeGridRequestId;

impl MakeRequestId for MakeGridRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<HeaderRequestId> {
        HeaderValue::from_str(&RequestId::new().to_string())
            .ok()
            .map(HeaderRequestId::new)
    }
}

/// Create the node router.
pub fn create_router(agent: Arc<NodeAgent>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/{callback}", post(handle_command))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeGridRequestId))
        .with_state(agent)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    phase: String,
    hosted_regions: Vec<String>,
}

async fn healthz(State(agent): State<Arc<NodeAgent>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        phase: agent.phase().to_string(),
        hosted_regions: agent.hosted_regions().await,
    })
}

async fn handle_command(
    State(agent): State<Arc<NodeAgent>>,
    Path(callback): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Ok(id) = NodeCallbackId::parse(&callback) else {
        return StatusCode::NOT_FOUND;
    };
    let Some(region) = agent.routes().resolve(&id).await else {
        debug!(path = %id, "Command on an unknown path");
        return StatusCode::NOT_FOUND;
    };

    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let command = match Command::decode(&body) {
        Ok(command) => command,
        Err(e) if e.is_unknown_method() => {
            debug!(request_id = %request_id, region = %region.name, error = %e, "Ignoring command");
            return StatusCode::OK;
        }
        Err(e) => {
            warn!(request_id = %request_id, region = %region.name, error = %e, "Dropping malformed command");
            return StatusCode::OK;
        }
    };

    let method = command.method();
    if let Err(e) = agent.execute(region.clone(), command).await {
        error!(
            request_id = %request_id,
            region = %region.name,
            method,
            error = %e,
            "Command failed"
        );
    }

    StatusCode::OK
}
