//! Registration session endpoints.
//!
//! A session owns the announce paths minted for it. Restoring lets a
//! restarted controller accept announces on URLs handed out earlier.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::callbacks::CallbackError;
use crate::state::AppState;

/// Create session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(mint_session))
        .route("/{session_id}", put(restore_session).delete(remove_session))
}

#[derive(Debug, Deserialize)]
pub struct MintSessionRequest {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RestoreSessionRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub url: String,
}

async fn mint_session(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<MintSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = req.session_id.trim();
    if session_id.is_empty() {
        return Err(ApiError::bad_request("invalid_session", "session_id must not be empty")
            .with_request_id(ctx.request_id));
    }

    let url = state.announce_routes().mint(session_id).await;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: session_id.to_string(),
            url,
        }),
    ))
}

async fn restore_session(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(session_id): Path<String>,
    Json(req): Json<RestoreSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let routes = state.announce_routes();
    let id = routes
        .restore(&session_id, &req.url)
        .await
        .map_err(|e| {
            let err = match &e {
                CallbackError::InvalidUrl { .. } => ApiError::bad_request("invalid_url", e.to_string()),
                CallbackError::PathInUse(..) => ApiError::conflict("path_in_use", e.to_string()),
            };
            err.with_request_id(ctx.request_id.clone())
        })?;

    Ok(Json(SessionResponse {
        session_id,
        url: routes.url_for(&id),
    }))
}

async fn remove_session(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.announce_routes().remove(&session_id).await == 0 {
        return Err(
            ApiError::not_found("session_not_found", format!("no announce paths for '{session_id}'"))
                .with_request_id(ctx.request_id),
        );
    }
    Ok(StatusCode::NO_CONTENT)
}
