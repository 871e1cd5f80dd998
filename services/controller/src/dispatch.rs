//! Command delivery to region nodes.
//!
//! Delivery is at-most-once: a command is POSTed once to the region's callback
//! URL and the node's reply body is never read. Only transport failures and
//! non-success statuses are reported back, and nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use gridwide_id::RequestId;
use gridwide_protocol::{Command, Envelope, ProtocolError, ShutdownKind};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::registry::{RegionRegistry, RegistryEntry};

/// Header carrying the correlation id of an issued command.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors from issuing a command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No running or declared region matches the query.
    #[error("no matching region for '{0}'")]
    UnknownRegion(String),

    #[error("failed to encode command: {0}")]
    Encode(#[from] ProtocolError),

    /// The request never completed (connection refused, timeout, ...).
    #[error("failed to deliver {method} to {region}: {source}")]
    Transport {
        region: String,
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The node answered with a non-success status.
    #[error("{region} rejected {method} with status {status}")]
    Status {
        region: String,
        method: &'static str,
        status: reqwest::StatusCode,
    },
}

/// Timeouts applied to command delivery.
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Timeout for every command except `LoadOAR`.
    pub command_timeout: Duration,
    /// Timeout for `LoadOAR`, which the node applies before answering.
    pub archive_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            archive_timeout: Duration::from_secs(60 * 60),
        }
    }
}

/// Record of a delivered command.
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub region: String,
    pub method: &'static str,
    pub request_id: RequestId,
}

/// Per-region outcome of closing every running region.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CloseAllReport {
    pub closed: Vec<String>,
    pub failed: Vec<FailedDelivery>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedDelivery {
    pub region: String,
    pub error: String,
}

/// Issues commands to the regions held in a [`RegionRegistry`].
#[derive(Clone)]
pub struct CommandDispatcher {
    client: reqwest::Client,
    registry: Arc<RegionRegistry>,
    config: DispatchConfig,
}

impl CommandDispatcher {
    /// Create a dispatcher over `registry`.
    pub fn new(registry: Arc<RegionRegistry>, config: DispatchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            registry,
            config,
        })
    }

    /// Resolve `query` against the registry and issue `command` to the match.
    ///
    /// The registry lock is released before the request goes out.
    pub async fn issue_by_query(
        &self,
        query: &str,
        command: &Command,
    ) -> Result<Delivery, DispatchError> {
        let entry = self
            .registry
            .find(query)
            .await
            .ok_or_else(|| DispatchError::UnknownRegion(query.to_string()))?;

        self.issue(&entry, command).await
    }

    /// POST `command` to the callback URL of `entry`.
    pub async fn issue(
        &self,
        entry: &RegistryEntry,
        command: &Command,
    ) -> Result<Delivery, DispatchError> {
        let method = command.method();
        let body = command.encode()?;
        let request_id = RequestId::new();
        let url = normalize_callback_url(&entry.callback_url);
        let timeout = match command {
            Command::LoadOar(_) => self.config.archive_timeout,
            _ => self.config.command_timeout,
        };

        debug!(
            region = %entry.name(),
            method,
            request_id = %request_id,
            "Issuing command"
        );

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .timeout(timeout)
            .body(body)
            .send()
            .await
            .map_err(|source| {
                warn!(
                    region = %entry.name(),
                    method,
                    request_id = %request_id,
                    error = %source,
                    "Command delivery failed"
                );
                DispatchError::Transport {
                    region: entry.name().to_string(),
                    method,
                    source,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                region = %entry.name(),
                method,
                request_id = %request_id,
                status = %status,
                "Command rejected by node"
            );
            return Err(DispatchError::Status {
                region: entry.name().to_string(),
                method,
                status,
            });
        }

        info!(region = %entry.name(), method, request_id = %request_id, "Command delivered");
        Ok(Delivery {
            region: entry.name().to_string(),
            method,
            request_id,
        })
    }

    /// Send an immediate shutdown to every running region.
    ///
    /// Works from a snapshot of the running set; regions that announce while
    /// this runs are not included.
    pub async fn close_all(&self) -> CloseAllReport {
        let command = Command::Shutdown {
            kind: ShutdownKind::Immediate,
            seconds: Some(0),
        };

        let mut report = CloseAllReport::default();
        for entry in &self.registry.running().await {
            match self.issue(entry, &command).await {
                Ok(delivery) => report.closed.push(delivery.region),
                Err(e) => report.failed.push(FailedDelivery {
                    region: entry.name().to_string(),
                    error: e.to_string(),
                }),
            }
        }

        info!(
            closed = report.closed.len(),
            failed = report.failed.len(),
            "Close-all finished"
        );
        report
    }
}

/// Nodes may report callback URLs as `host:port/path`; assume plain HTTP then.
fn normalize_callback_url(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}
