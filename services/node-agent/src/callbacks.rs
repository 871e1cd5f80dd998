//! Command endpoints installed on the node.
//!
//! Every announce carries a freshly minted `/rrm_<ULID>` URL bound to one
//! region. Paths are never uninstalled: the controller may keep using the URL
//! of a closed region to start it again.

use std::collections::HashMap;

use gridwide_id::NodeCallbackId;
use gridwide_protocol::RegionDescriptor;
use tokio::sync::RwLock;
use tracing::debug;

/// Table of command paths installed on this node.
#[derive(Debug)]
pub struct CommandRoutes {
    public_url: String,
    routes: RwLock<HashMap<NodeCallbackId, RegionDescriptor>>,
}

impl CommandRoutes {
    /// Create an empty table; minted URLs are rooted at `public_url`.
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into().trim_end_matches('/').to_string(),
            routes: RwLock::new(HashMap::new()),
        }
    }

    /// Install a fresh command path for `region` and return its URL.
    pub async fn mint(&self, region: &RegionDescriptor) -> String {
        let id = NodeCallbackId::new();
        self.routes.write().await.insert(id, region.clone());

        let url = format!("{}/{}", self.public_url, id);
        debug!(region = %region.name, url = %url, "Command path minted");
        url
    }

    /// The region a command path is bound to.
    pub async fn resolve(&self, id: &NodeCallbackId) -> Option<RegionDescriptor> {
        self.routes.read().await.get(id).cloned()
    }

    /// Number of installed paths.
    pub async fn len(&self) -> usize {
        self.routes.read().await.len()
    }
}
