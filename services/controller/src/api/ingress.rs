//! Announce ingress.
//!
//! Nodes POST lifecycle announces to the URL minted for their registration
//! session. Paths that were never minted answer 404; every request to a live
//! path answers an empty 200, whatever its body held.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use gridwide_id::ControllerCallbackId;
use gridwide_protocol::{Announce, Envelope};
use tracing::{debug, warn};

use crate::api::request_context::RequestContext;
use crate::registry::RegionRegistry;
use crate::state::AppState;

/// Handle a POST to `/{callback}`.
pub async fn announce(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(callback): Path<String>,
    body: Bytes,
) -> StatusCode {
    let Ok(id) = ControllerCallbackId::parse(&callback) else {
        return StatusCode::NOT_FOUND;
    };
    let Some(session) = state.announce_routes().session(&id).await else {
        debug!(path = %id, "Announce on an unknown path");
        return StatusCode::NOT_FOUND;
    };

    match Announce::decode(&body) {
        Ok(announce) => {
            debug!(
                request_id = %ctx.request_id,
                session = %session,
                method = announce.method(),
                region = %announce.region().name,
                "Announce received"
            );
            apply_announce(state.registry(), announce).await;
        }
        Err(e) if e.is_unknown_method() => {
            debug!(request_id = %ctx.request_id, session = %session, error = %e, "Ignoring announce");
        }
        Err(e) => {
            warn!(request_id = %ctx.request_id, session = %session, error = %e, "Dropping malformed announce");
        }
    }

    StatusCode::OK
}

/// Apply one announce to the registry.
pub async fn apply_announce(registry: &RegionRegistry, announce: Announce) {
    match announce {
        Announce::RegionOnline { region, url } => registry.register_running(region, url).await,
        Announce::RegionProvided { region, url } => registry.register_declared(region, url).await,
        Announce::RegionOffline { region } => {
            registry.unregister(&region.name).await;
        }
    }
}
