//! Region descriptor carried by announces.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_region_size() -> i32 {
    RegionDescriptor::DEFAULT_SIZE
}

/// Descriptive metadata of one simulated region.
///
/// The region name is the identity used by the controller; everything else is
/// metadata that a re-announcement may refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    /// Grid-wide region UUID.
    #[serde(rename = "RegionID")]
    pub region_id: Uuid,

    /// Region name, unique within the grid.
    #[serde(rename = "RegionName")]
    pub name: String,

    /// Grid location (X), in meters.
    #[serde(rename = "RegionLocX")]
    pub loc_x: i32,

    /// Grid location (Y), in meters.
    #[serde(rename = "RegionLocY")]
    pub loc_y: i32,

    #[serde(rename = "RegionSizeX", default = "default_region_size")]
    pub size_x: i32,

    #[serde(rename = "RegionSizeY", default = "default_region_size")]
    pub size_y: i32,

    /// Host name viewers use to reach the region.
    #[serde(rename = "ExternalHostName", default)]
    pub external_host_name: String,

    /// HTTP port of the simulator hosting the region.
    #[serde(rename = "HttpPort", default)]
    pub http_port: u16,

    #[serde(rename = "ServerURI", default)]
    pub server_uri: String,
}

impl RegionDescriptor {
    /// Default edge length of a region.
    pub const DEFAULT_SIZE: i32 = 256;

    /// Creates a descriptor with a fresh region id and default size.
    pub fn new(name: impl Into<String>, loc_x: i32, loc_y: i32) -> Self {
        Self {
            region_id: Uuid::new_v4(),
            name: name.into(),
            loc_x,
            loc_y,
            size_x: Self::DEFAULT_SIZE,
            size_y: Self::DEFAULT_SIZE,
            external_host_name: String::new(),
            http_port: 0,
            server_uri: String::new(),
        }
    }

    /// Sets the network location of the hosting simulator.
    #[must_use]
    pub fn with_endpoint(mut self, host: impl Into<String>, http_port: u16) -> Self {
        self.external_host_name = host.into();
        self.http_port = http_port;
        self.server_uri = format!("http://{}:{}", self.external_host_name, http_port);
        self
    }

    /// Case-insensitive substring match against the region name.
    ///
    /// An empty query never matches.
    pub fn name_matches(&self, query: &str) -> bool {
        !query.is_empty() && self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

impl std::fmt::Display for RegionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.loc_x, self.loc_y)
    }
}
