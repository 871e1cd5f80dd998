//! Node agent lifecycle.
//!
//! ```text
//! Initializing -> Announcing -> Operational -> Closing -> Terminated
//! ```
//!
//! While announcing, every hosted region is reported online with its own
//! command URL. Once operational, the remaining configured regions are
//! reported as provided so the controller can start them later. Closing
//! reports every hosted region offline. Announces are best effort: failures
//! are logged and never block a transition.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gridwide_protocol::{Announce, Envelope, RegionDescriptor};
use tokio::sync::{watch, RwLock};
use tracing::{error, info, warn};

use crate::callbacks::CommandRoutes;
use crate::client::Announcer;
use crate::host::SimulationHost;
use crate::state::RegionStore;

/// Lifecycle phase of the agent process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    Initializing,
    Announcing,
    Operational,
    Closing,
    Terminated,
}

impl std::fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AgentPhase::Initializing => "initializing",
            AgentPhase::Announcing => "announcing",
            AgentPhase::Operational => "operational",
            AgentPhase::Closing => "closing",
            AgentPhase::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// The node agent.
pub struct NodeAgent {
    pub(crate) host: Arc<dyn SimulationHost>,
    pub(crate) store: Arc<dyn RegionStore>,
    announcer: Arc<dyn Announcer>,
    routes: CommandRoutes,
    /// Regions running on this node, by name.
    hosted: RwLock<BTreeMap<String, RegionDescriptor>>,
    declared_announced: AtomicBool,
    phase: watch::Sender<AgentPhase>,
}

impl NodeAgent {
    /// Create an agent whose command URLs are rooted at `public_url`.
    pub fn new(
        host: Arc<dyn SimulationHost>,
        store: Arc<dyn RegionStore>,
        announcer: Arc<dyn Announcer>,
        public_url: impl Into<String>,
    ) -> Self {
        let (phase, _) = watch::channel(AgentPhase::Initializing);
        Self {
            host,
            store,
            announcer,
            routes: CommandRoutes::new(public_url),
            hosted: RwLock::new(BTreeMap::new()),
            declared_announced: AtomicBool::new(false),
            phase,
        }
    }

    pub fn routes(&self) -> &CommandRoutes {
        &self.routes
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> AgentPhase {
        *self.phase.borrow()
    }

    /// Watch phase transitions.
    pub fn subscribe_phase(&self) -> watch::Receiver<AgentPhase> {
        self.phase.subscribe()
    }

    fn transition(&self, next: AgentPhase) {
        let previous = self.phase.send_replace(next);
        info!(from = %previous, to = %next, "Agent phase changed");
    }

    /// Names of the regions running on this node.
    pub async fn hosted_regions(&self) -> Vec<String> {
        self.hosted.read().await.keys().cloned().collect()
    }

    pub async fn is_hosted(&self, name: &str) -> bool {
        self.hosted.read().await.contains_key(name)
    }

    /// Start `regions` on the host. Regions that fail to start are skipped.
    pub async fn boot(&self, regions: Vec<RegionDescriptor>) {
        for region in regions {
            match self.host.start_region(&region).await {
                Ok(()) => {
                    self.hosted.write().await.insert(region.name.clone(), region);
                }
                Err(e) => error!(region = %region.name, error = %e, "Failed to start region"),
            }
        }
    }

    /// Announce every hosted region online, then the declared ones.
    pub async fn announce_startup(&self) {
        self.transition(AgentPhase::Announcing);

        let hosted: Vec<RegionDescriptor> = self.hosted.read().await.values().cloned().collect();
        for region in hosted {
            self.announce_online(region).await;
        }

        self.transition(AgentPhase::Operational);
        self.announce_declared().await;
    }

    /// Report every configured region that is not hosted here as provided.
    ///
    /// Only the first call per process does anything.
    pub async fn announce_declared(&self) {
        if self.declared_announced.swap(true, Ordering::SeqCst) {
            return;
        }

        let declared = match self.store.list_declared() {
            Ok(declared) => declared,
            Err(e) => {
                error!(error = %e, "Failed to list declared regions");
                return;
            }
        };

        for region in declared {
            if self.is_hosted(&region.name).await {
                continue;
            }
            let url = self.routes.mint(&region).await;
            self.send(Announce::RegionProvided { region, url }).await;
        }
    }

    /// Mark `region` hosted and announce it online under a fresh URL.
    pub async fn announce_online(&self, region: RegionDescriptor) {
        self.hosted
            .write()
            .await
            .insert(region.name.clone(), region.clone());

        let url = self.routes.mint(&region).await;
        self.send(Announce::RegionOnline { region, url }).await;
    }

    /// Drop `region` from the hosted set and announce it offline.
    pub async fn region_closed(&self, region: &RegionDescriptor) {
        if self.hosted.write().await.remove(&region.name).is_none() {
            warn!(region = %region.name, "Closed a region that was not hosted");
        }
        self.send(Announce::RegionOffline {
            region: region.clone(),
        })
        .await;
    }

    /// Close the hosted regions and report each one offline.
    pub async fn close(&self) {
        self.transition(AgentPhase::Closing);

        let hosted: Vec<RegionDescriptor> = {
            let mut hosted = self.hosted.write().await;
            std::mem::take(&mut *hosted).into_values().collect()
        };

        for region in hosted {
            if let Err(e) = self.host.close_region(&region).await {
                warn!(region = %region.name, error = %e, "Failed to close region");
            }
            self.send(Announce::RegionOffline { region }).await;
        }

        self.transition(AgentPhase::Terminated);
    }

    async fn send(&self, announce: Announce) {
        if let Err(e) = self.announcer.announce(&announce).await {
            warn!(
                method = announce.method(),
                region = %announce.region().name,
                error = %e,
                "Announce failed"
            );
        }
    }
}
