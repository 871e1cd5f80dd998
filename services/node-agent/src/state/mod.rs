//! Local state persistence for the node agent.
//!
//! The store holds every region configured on this node, whether or not it is
//! running, together with its startup flag. The agent reads it to decide what
//! to start at boot and which regions to advertise as declared.

mod store;

pub use store::{RegionStore, SqliteRegionStore, StoreError, StoredRegion};
