//! Controller configuration, read once from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::dispatch::DispatchConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,

    /// Base URL nodes use to reach this controller; minted announce URLs are
    /// rooted here.
    pub public_url: String,

    pub log_level: String,

    pub dispatch: DispatchConfig,

    /// Announce URLs handed out by an earlier run, re-installed at boot.
    pub announce_urls: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_addr: SocketAddr = std::env::var("GRID_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .context("GRID_LISTEN_ADDR must be a socket address")?;

        let public_url =
            std::env::var("GRID_PUBLIC_URL").unwrap_or_else(|_| format!("http://{listen_addr}"));

        let log_level = std::env::var("GRID_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = DispatchConfig::default();
        let dispatch = DispatchConfig {
            command_timeout: secs_from_env("GRID_COMMAND_TIMEOUT_SECS")?
                .unwrap_or(defaults.command_timeout),
            archive_timeout: secs_from_env("GRID_ARCHIVE_TIMEOUT_SECS")?
                .unwrap_or(defaults.archive_timeout),
        };

        let announce_urls = std::env::var("GRID_ANNOUNCE_URLS")
            .map(|v| parse_url_list(&v))
            .unwrap_or_default();

        Ok(Self {
            listen_addr,
            public_url,
            log_level,
            dispatch,
            announce_urls,
        })
    }
}

fn secs_from_env(name: &str) -> Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(value) => {
            let secs: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("{name} must be a whole number of seconds"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

fn parse_url_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
