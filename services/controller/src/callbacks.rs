//! Announce endpoints installed on the controller.
//!
//! Each node registration session receives its own randomly named announce
//! path (`/grm_<ULID>`). Requests to any other path are rejected before the
//! body is looked at. A path lives until its session is removed or the
//! controller exits; sessions restored from configuration keep their paths
//! across controller restarts.

use std::collections::HashMap;

use gridwide_id::{callback_id_from_url, ControllerCallbackId, IdError};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Errors from announce route management.
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("invalid announce url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: IdError,
    },

    #[error("announce path {0} already belongs to session '{1}'")]
    PathInUse(ControllerCallbackId, String),
}

/// Table of announce paths installed on this controller.
#[derive(Debug)]
pub struct AnnounceRoutes {
    public_url: String,
    routes: RwLock<HashMap<ControllerCallbackId, String>>,
}

impl AnnounceRoutes {
    /// Create an empty table; minted URLs are rooted at `public_url`.
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into().trim_end_matches('/').to_string(),
            routes: RwLock::new(HashMap::new()),
        }
    }

    /// Absolute URL of an announce path.
    pub fn url_for(&self, id: &ControllerCallbackId) -> String {
        format!("{}/{}", self.public_url, id)
    }

    /// Install a fresh announce path for `session_id` and return its URL.
    pub async fn mint(&self, session_id: &str) -> String {
        let id = ControllerCallbackId::new();
        self.routes
            .write()
            .await
            .insert(id, session_id.to_string());

        let url = self.url_for(&id);
        info!(session_id, url = %url, "Announce path minted");
        url
    }

    /// Re-install a previously minted announce URL for `session_id`.
    ///
    /// Only the last path segment matters; it must be a controller callback
    /// id. Restoring a path already bound to the same session is a no-op.
    pub async fn restore(
        &self,
        session_id: &str,
        url: &str,
    ) -> Result<ControllerCallbackId, CallbackError> {
        let id: ControllerCallbackId =
            callback_id_from_url(url).map_err(|source| CallbackError::InvalidUrl {
                url: url.to_string(),
                source,
            })?;

        let mut routes = self.routes.write().await;
        match routes.get(&id) {
            Some(owner) if owner != session_id => {
                return Err(CallbackError::PathInUse(id, owner.clone()));
            }
            Some(_) => {}
            None => {
                routes.insert(id, session_id.to_string());
            }
        }
        drop(routes);

        info!(session_id, path = %id, "Announce path restored");
        Ok(id)
    }

    /// Uninstall every announce path of `session_id`; returns how many.
    pub async fn remove(&self, session_id: &str) -> usize {
        let mut routes = self.routes.write().await;
        let before = routes.len();
        routes.retain(|_, owner| owner != session_id);
        let removed = before - routes.len();
        drop(routes);

        debug!(session_id, removed, "Announce paths removed");
        removed
    }

    /// The session owning an announce path, if it is installed.
    pub async fn session(&self, id: &ControllerCallbackId) -> Option<String> {
        self.routes.read().await.get(id).cloned()
    }
}
