//! Simulation host interface and mock implementation.
//!
//! The host owns the simulated regions themselves. The agent drives it:
//! - Starting and closing regions
//! - Toggling script execution
//! - Applying region archives
//! - Broadcasting warnings to connected sessions
//!
//! A mock implementation is provided for testing and development.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use gridwide_protocol::{ArchiveOptions, RegionDescriptor};
use tracing::info;

/// Simulation host interface.
#[async_trait]
pub trait SimulationHost: Send + Sync {
    /// Close a running region.
    async fn close_region(&self, region: &RegionDescriptor) -> Result<()>;

    /// Bring a region up.
    async fn start_region(&self, region: &RegionDescriptor) -> Result<()>;

    /// Enable or disable script execution in a region.
    async fn set_script_execution(&self, region: &RegionDescriptor, enabled: bool) -> Result<()>;

    /// Load an archive into a region. Returns once the archive is applied.
    async fn apply_archive(
        &self,
        region: &RegionDescriptor,
        archive: &[u8],
        options: &ArchiveOptions,
    ) -> Result<()>;

    /// Send a notice to every connected root agent in a region.
    async fn broadcast_warning(&self, region: &RegionDescriptor, message: &str) -> Result<()>;
}

/// A call recorded by [`MockHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Close(String),
    Start(String),
    Scripts { region: String, enabled: bool },
    Archive {
        region: String,
        archive: Vec<u8>,
        options: ArchiveOptions,
    },
    Warning { region: String, message: String },
}

/// Mock host for testing and development.
#[derive(Debug, Default)]
pub struct MockHost {
    calls: Mutex<Vec<HostCall>>,

    /// Whether archives should "fail" to apply.
    fail_archives: bool,

    /// Whether warnings should "fail" to reach any session.
    fail_broadcasts: bool,
}

impl MockHost {
    /// Create a new mock host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock host that rejects every archive.
    pub fn failing_archives() -> Self {
        Self {
            fail_archives: true,
            ..Self::default()
        }
    }

    /// Create a mock host whose warning broadcasts never get through.
    pub fn failing_broadcasts() -> Self {
        Self {
            fail_broadcasts: true,
            ..Self::default()
        }
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: HostCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl SimulationHost for MockHost {
    async fn close_region(&self, region: &RegionDescriptor) -> Result<()> {
        info!(region = %region.name, "[MOCK] Closing region");
        self.record(HostCall::Close(region.name.clone()));
        Ok(())
    }

    async fn start_region(&self, region: &RegionDescriptor) -> Result<()> {
        info!(region = %region.name, loc_x = region.loc_x, loc_y = region.loc_y, "[MOCK] Starting region");
        self.record(HostCall::Start(region.name.clone()));
        Ok(())
    }

    async fn set_script_execution(&self, region: &RegionDescriptor, enabled: bool) -> Result<()> {
        info!(region = %region.name, enabled, "[MOCK] Setting script execution");
        self.record(HostCall::Scripts {
            region: region.name.clone(),
            enabled,
        });
        Ok(())
    }

    async fn apply_archive(
        &self,
        region: &RegionDescriptor,
        archive: &[u8],
        options: &ArchiveOptions,
    ) -> Result<()> {
        info!(
            region = %region.name,
            bytes = archive.len(),
            merge = options.merge,
            skip_assets = options.skip_assets,
            "[MOCK] Applying archive"
        );

        self.record(HostCall::Archive {
            region: region.name.clone(),
            archive: archive.to_vec(),
            options: *options,
        });

        if self.fail_archives {
            anyhow::bail!("Mock host configured to reject archives");
        }
        Ok(())
    }

    async fn broadcast_warning(&self, region: &RegionDescriptor, message: &str) -> Result<()> {
        info!(region = %region.name, message, "[MOCK] Broadcasting warning");
        self.record(HostCall::Warning {
            region: region.name.clone(),
            message: message.to_string(),
        });

        if self.fail_broadcasts {
            anyhow::bail!("Mock host has no reachable sessions");
        }
        Ok(())
    }
}
