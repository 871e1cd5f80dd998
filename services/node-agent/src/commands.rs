//! Execution of controller commands against the simulation host.

use std::sync::Arc;

use anyhow::Result;
use gridwide_protocol::{Command, Envelope, RegionDescriptor, ShutdownDirective};
use tracing::{debug, error, info, warn};

use crate::agent::NodeAgent;

/// Text broadcast to a region's sessions before a delayed shutdown.
pub fn shutdown_warning(region: &str, seconds: u32) -> String {
    format!("The region {region} will shut down in {seconds} seconds.")
}

impl NodeAgent {
    /// Run `command` against `region`.
    ///
    /// Returns once the host has acted, except for a delayed shutdown, which
    /// returns after the warning goes out and closes the region from a
    /// detached task. That task cannot be cancelled. Shutting down a region
    /// that is not running does nothing.
    pub async fn execute(self: &Arc<Self>, region: RegionDescriptor, command: Command) -> Result<()> {
        info!(region = %region.name, method = command.method(), "Executing command");
        let directive = command.shutdown_directive();

        match command {
            Command::Shutdown { .. } => {
                self.shutdown(region, directive.unwrap_or(ShutdownDirective::Immediate))
                    .await
            }
            Command::Start => {
                self.host.start_region(&region).await?;
                self.announce_online(region).await;
                Ok(())
            }
            Command::ChangeStartupStatus { enabled } => {
                self.store.persist_startup_flag(&region.name, enabled)?;
                Ok(())
            }
            Command::StartScripts => self.host.set_script_execution(&region, true).await,
            Command::StopScripts => self.host.set_script_execution(&region, false).await,
            Command::LoadOar(upload) => {
                self.host
                    .apply_archive(&region, &upload.data, &upload.options)
                    .await
            }
        }
    }

    async fn shutdown(self: &Arc<Self>, region: RegionDescriptor, directive: ShutdownDirective) -> Result<()> {
        if !self.is_hosted(&region.name).await {
            info!(region = %region.name, "Region is not running; shutdown skipped");
            return Ok(());
        }

        let (seconds, delay) = match (directive, directive.grace_period()) {
            (ShutdownDirective::Delayed { seconds }, Some(delay)) => (seconds, delay),
            _ => return self.close_region(&region).await,
        };

        // A missed warning never cancels the shutdown.
        if let Err(e) = self
            .host
            .broadcast_warning(&region, &shutdown_warning(&region.name, seconds))
            .await
        {
            warn!(region = %region.name, error = %e, "Failed to broadcast shutdown warning");
        }

        info!(region = %region.name, seconds, "Shutdown scheduled");

        let agent = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = agent.close_region(&region).await {
                error!(region = %region.name, error = %e, "Delayed shutdown failed");
            }
        });

        Ok(())
    }

    async fn close_region(&self, region: &RegionDescriptor) -> Result<()> {
        if !self.is_hosted(&region.name).await {
            debug!(region = %region.name, "Region already closed");
            return Ok(());
        }

        self.host.close_region(region).await?;
        self.region_closed(region).await;
        Ok(())
    }
}
