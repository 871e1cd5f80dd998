//! Registry of the regions this controller knows about.
//!
//! Two maps are kept, both keyed by region name:
//! - `running`: regions that announced themselves online and have not since
//!   gone offline. These are the actionable targets.
//! - `declared`: every region any node has ever reported, online or not. An
//!   operator can target a declared region with `Start` before it ever ran.
//!
//! Every running region is also declared. Declared entries are never pruned;
//! they are only read, never assumed to be live.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gridwide_protocol::RegionDescriptor;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A region paired with the callback URL its node installed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub region: RegionDescriptor,
    pub callback_url: String,
    pub registered_at: DateTime<Utc>,
}

impl RegistryEntry {
    fn new(region: RegionDescriptor, callback_url: String) -> Self {
        Self {
            region,
            callback_url,
            registered_at: Utc::now(),
        }
    }

    /// The region name.
    pub fn name(&self) -> &str {
        &self.region.name
    }
}

/// A point-in-time listing of registry entries, ordered by name.
///
/// Iteration is lazy and can be restarted any number of times; later registry
/// mutations do not affect an existing listing.
#[derive(Debug, Clone, Default)]
pub struct RegionListing {
    entries: Vec<RegistryEntry>,
}

impl RegionListing {
    /// Region names in this listing.
    pub fn names(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.entries.iter().map(RegistryEntry::name)
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RegionListing {
    type Item = &'a RegistryEntry;
    type IntoIter = std::slice::Iter<'a, RegistryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Default)]
struct RegistryMaps {
    running: BTreeMap<String, RegistryEntry>,
    declared: BTreeMap<String, RegistryEntry>,
}

/// Registry of running and declared regions.
///
/// Both maps sit behind a single lock so that readers never observe a running
/// region that is missing from `declared`.
#[derive(Debug, Default)]
pub struct RegionRegistry {
    maps: RwLock<RegistryMaps>,
}

impl RegionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a region as running, reachable at `callback_url`.
    ///
    /// Overwrites any previous entry for the same name, so re-announcements
    /// refresh both the metadata and the callback URL.
    pub async fn register_running(&self, region: RegionDescriptor, callback_url: String) {
        let entry = RegistryEntry::new(region, callback_url);
        let name = entry.region.name.clone();

        let mut maps = self.maps.write().await;
        maps.declared.insert(name.clone(), entry.clone());
        let previous = maps.running.insert(name.clone(), entry);
        drop(maps);

        if previous.is_some() {
            debug!(region = %name, "Region re-announced as running");
        } else {
            info!(region = %name, "Region online");
        }
    }

    /// Record a region as declared, reachable at `callback_url`.
    pub async fn register_declared(&self, region: RegionDescriptor, callback_url: String) {
        let entry = RegistryEntry::new(region, callback_url);
        let name = entry.region.name.clone();

        self.maps.write().await.declared.insert(name.clone(), entry);
        debug!(region = %name, "Region declared");
    }

    /// Remove a region from the running set.
    ///
    /// Returns whether the region was running. The declared entry is kept.
    pub async fn unregister(&self, name: &str) -> bool {
        let removed = self.maps.write().await.running.remove(name).is_some();
        if removed {
            info!(region = %name, "Region offline");
        } else {
            debug!(region = %name, "Offline announce for a region that was not running");
        }
        removed
    }

    /// Find a region by case-insensitive substring of its name.
    ///
    /// Running regions are searched first, so an online region wins over a
    /// declared-only one matching the same query. Within each map, regions are
    /// visited in name order.
    pub async fn find(&self, query: &str) -> Option<RegistryEntry> {
        let maps = self.maps.read().await;
        maps.running
            .values()
            .chain(maps.declared.values())
            .find(|entry| entry.region.name_matches(query))
            .cloned()
    }

    /// Whether a region is currently running.
    pub async fn is_running(&self, name: &str) -> bool {
        self.maps.read().await.running.contains_key(name)
    }

    /// Regions currently running.
    pub async fn running(&self) -> RegionListing {
        let maps = self.maps.read().await;
        RegionListing {
            entries: maps.running.values().cloned().collect(),
        }
    }

    /// Declared regions that are not currently running.
    pub async fn declared_not_running(&self) -> RegionListing {
        let maps = self.maps.read().await;
        RegionListing {
            entries: maps
                .declared
                .values()
                .filter(|entry| !maps.running.contains_key(entry.name()))
                .cloned()
                .collect(),
        }
    }

    /// Number of (running, declared) regions.
    pub async fn counts(&self) -> (usize, usize) {
        let maps = self.maps.read().await;
        (maps.running.len(), maps.declared.len())
    }
}
