//! API v1 routes (operator surface).

mod regions;
mod sessions;

use axum::Router;

use crate::state::AppState;

/// Create API v1 routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/regions", regions::routes())
        .nest("/sessions", sessions::routes())
}
