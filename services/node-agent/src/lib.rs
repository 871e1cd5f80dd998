//! gridwide node agent library.
//!
//! The node agent runs beside a region simulator. It announces the regions the
//! simulator hosts to the controller and executes the lifecycle commands the
//! controller sends back.
//!
//! ## Modules
//!
//! - `agent`: lifecycle phases and announces
//! - `commands`: command execution against the host
//! - `ingress`: HTTP endpoints for commands
//! - `host`: simulation host interface (mock in dev)
//! - `state`: local SQLite region store

pub mod agent;
pub mod callbacks;
pub mod client;
pub mod commands;
pub mod config;
pub mod host;
pub mod ingress;
pub mod state;

// Re-export commonly used types
pub use agent::{AgentPhase, NodeAgent};
pub use client::{Announcer, ControllerClient};
pub use host::{HostCall, MockHost, SimulationHost};
pub use state::{RegionStore, SqliteRegionStore};
