//! Node-to-controller lifecycle announces.

use serde::{Deserialize, Serialize};

use crate::{Envelope, RegionDescriptor};

/// A lifecycle notification sent by a node to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Method")]
pub enum Announce {
    /// The region is running and reachable at `url`.
    RegionOnline {
        #[serde(rename = "Region")]
        region: RegionDescriptor,
        #[serde(rename = "URL")]
        url: String,
    },

    /// The region is configured on the node but not necessarily running.
    RegionProvided {
        #[serde(rename = "Region")]
        region: RegionDescriptor,
        #[serde(rename = "URL")]
        url: String,
    },

    /// The region has stopped.
    RegionOffline {
        #[serde(rename = "Region")]
        region: RegionDescriptor,
    },
}

impl Announce {
    /// The region this announce is about.
    pub fn region(&self) -> &RegionDescriptor {
        match self {
            Announce::RegionOnline { region, .. }
            | Announce::RegionProvided { region, .. }
            | Announce::RegionOffline { region } => region,
        }
    }
}

impl Envelope for Announce {
    const METHODS: &'static [&'static str] = &["RegionOnline", "RegionProvided", "RegionOffline"];

    fn method(&self) -> &'static str {
        match self {
            Announce::RegionOnline { .. } => "RegionOnline",
            Announce::RegionProvided { .. } => "RegionProvided",
            Announce::RegionOffline { .. } => "RegionOffline",
        }
    }
}
