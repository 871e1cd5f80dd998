//! Controller announce client for the node agent.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use gridwide_protocol::{Announce, Envelope};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error};

/// Delivers lifecycle announces to the controller.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(&self, announce: &Announce) -> Result<()>;
}

/// Controller API client.
pub struct ControllerClient {
    client: reqwest::Client,
    announce_url: String,
}

impl ControllerClient {
    /// Create a client posting to `announce_url`.
    pub fn new(announce_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            announce_url: announce_url.into(),
        })
    }

    pub fn announce_url(&self) -> &str {
        &self.announce_url
    }
}

#[async_trait]
impl Announcer for ControllerClient {
    async fn announce(&self, announce: &Announce) -> Result<()> {
        debug!(
            method = announce.method(),
            region = %announce.region().name,
            "Sending announce"
        );

        let response = self
            .client
            .post(&self.announce_url)
            .header(CONTENT_TYPE, "application/json")
            .body(announce.encode()?)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            error!(
                status = %status,
                method = announce.method(),
                region = %announce.region().name,
                "Controller rejected announce"
            );
            anyhow::bail!("Announce {} rejected: {}", announce.method(), status);
        }

        Ok(())
    }
}
