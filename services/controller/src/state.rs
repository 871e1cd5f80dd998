//! Application state shared across request handlers.

use std::sync::Arc;

use crate::callbacks::AnnounceRoutes;
use crate::config::Config;
use crate::dispatch::CommandDispatcher;
use crate::registry::RegionRegistry;

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: Arc<RegionRegistry>,
    announce_routes: AnnounceRoutes,
    dispatcher: CommandDispatcher,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        registry: Arc<RegionRegistry>,
        announce_routes: AnnounceRoutes,
        dispatcher: CommandDispatcher,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                registry,
                announce_routes,
                dispatcher,
            }),
        }
    }

    /// Build the state described by `config`, with an empty registry.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let registry = Arc::new(RegionRegistry::new());
        let dispatcher = CommandDispatcher::new(Arc::clone(&registry), config.dispatch)?;
        Ok(Self::new(
            registry,
            AnnounceRoutes::new(config.public_url.clone()),
            dispatcher,
        ))
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.inner.registry
    }

    pub fn announce_routes(&self) -> &AnnounceRoutes {
        &self.inner.announce_routes
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.inner.dispatcher
    }
}
