//! Region endpoints.
//!
//! Operators list the registry and issue commands to a region picked by a
//! case-insensitive substring of its name. Commands are delivered once; a
//! 202 only means the node accepted the POST.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use gridwide_protocol::{Command, Envelope};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::dispatch::{CloseAllReport, Delivery};
use crate::registry::RegistryEntry;
use crate::state::AppState;

/// Create region routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_regions))
        .route("/close-all", post(close_all))
        .route("/{query}/commands", post(issue_command))
}

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionStatus {
    Online,
    Offline,
}

/// A region as seen by the registry.
#[derive(Debug, Serialize)]
pub struct RegionResponse {
    pub name: String,
    pub region_id: String,
    pub loc_x: i32,
    pub loc_y: i32,
    pub status: RegionStatus,
    pub callback_url: String,
    pub registered_at: DateTime<Utc>,
}

impl RegionResponse {
    fn new(entry: &RegistryEntry, status: RegionStatus) -> Self {
        Self {
            name: entry.name().to_string(),
            region_id: entry.region.region_id.to_string(),
            loc_x: entry.region.loc_x,
            loc_y: entry.region.loc_y,
            status,
            callback_url: entry.callback_url.clone(),
            registered_at: entry.registered_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListRegionsResponse {
    pub items: Vec<RegionResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListRegionsQuery {
    /// Include declared regions that are not running.
    #[serde(default)]
    pub all: bool,
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_regions(
    State(state): State<AppState>,
    Query(query): Query<ListRegionsQuery>,
) -> Json<ListRegionsResponse> {
    let registry = state.registry();

    let mut items: Vec<RegionResponse> = registry
        .running()
        .await
        .entries()
        .iter()
        .map(|entry| RegionResponse::new(entry, RegionStatus::Online))
        .collect();

    if query.all {
        items.extend(
            registry
                .declared_not_running()
                .await
                .entries()
                .iter()
                .map(|entry| RegionResponse::new(entry, RegionStatus::Offline)),
        );
    }

    Json(ListRegionsResponse { items })
}

async fn issue_command(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(query): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id;

    let command = Command::decode(&body).map_err(|e| {
        ApiError::bad_request("invalid_command", e.to_string()).with_request_id(request_id.clone())
    })?;

    let delivery: Delivery = state
        .dispatcher()
        .issue_by_query(&query, &command)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(request_id.clone()))?;

    tracing::info!(
        request_id = %request_id,
        region = %delivery.region,
        method = delivery.method,
        command_request_id = %delivery.request_id,
        "Operator command issued"
    );

    Ok((StatusCode::ACCEPTED, Json(delivery)))
}

async fn close_all(State(state): State<AppState>) -> Json<CloseAllReport> {
    Json(state.dispatcher().close_all().await)
}
