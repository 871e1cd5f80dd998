//! Configuration for the node agent.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use gridwide_protocol::RegionDescriptor;
use serde::Deserialize;
use uuid::Uuid;

/// Node agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the command ingress binds to.
    pub listen_addr: SocketAddr,

    /// Base URL the controller uses to reach this node; minted command URLs
    /// are rooted here.
    pub public_url: String,

    /// Announce URL handed out by the controller.
    pub region_manager_url: String,

    /// Data directory for local state.
    pub data_dir: PathBuf,

    /// Optional TOML file of regions imported into the store at boot.
    pub regions_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Timeout of a single announce POST.
    pub announce_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let listen_addr: SocketAddr = std::env::var("GRID_NODE_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:9000".to_string())
            .parse()
            .context("GRID_NODE_LISTEN_ADDR must be a socket address")?;

        let public_url = std::env::var("GRID_NODE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{listen_addr}"));

        let region_manager_url = std::env::var("GRID_REGION_MANAGER_URL")
            .context("GRID_REGION_MANAGER_URL is required")?;

        let data_dir = std::env::var("GRID_DATA_DIR")
            .unwrap_or_else(|_| "/var/lib/gridwide".to_string())
            .into();

        let regions_file = std::env::var("GRID_REGIONS_FILE").ok().map(PathBuf::from);

        let log_level = std::env::var("GRID_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let announce_timeout = std::env::var("GRID_ANNOUNCE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        Ok(Self {
            listen_addr,
            public_url,
            region_manager_url,
            data_dir,
            regions_file,
            log_level,
            announce_timeout,
        })
    }

    /// Path of the SQLite region store.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("regions.db")
    }
}

/// One `[[regions]]` entry of the regions file.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionSeed {
    pub name: String,
    pub region_id: Option<Uuid>,
    pub loc_x: i32,
    pub loc_y: i32,
    #[serde(default = "default_size")]
    pub size_x: i32,
    #[serde(default = "default_size")]
    pub size_y: i32,
    #[serde(default)]
    pub external_host_name: String,
    #[serde(default)]
    pub http_port: u16,
    /// Start the region when the agent boots.
    #[serde(default = "default_startup")]
    pub startup: bool,
}

fn default_size() -> i32 {
    RegionDescriptor::DEFAULT_SIZE
}

fn default_startup() -> bool {
    true
}

impl RegionSeed {
    /// Build the descriptor, keeping `existing_id` when the file names none.
    pub fn to_descriptor(&self, existing_id: Option<Uuid>) -> RegionDescriptor {
        let mut region = RegionDescriptor::new(self.name.clone(), self.loc_x, self.loc_y);
        if let Some(id) = self.region_id.or(existing_id) {
            region.region_id = id;
        }
        region.size_x = self.size_x;
        region.size_y = self.size_y;
        if !self.external_host_name.is_empty() {
            region = region.with_endpoint(self.external_host_name.clone(), self.http_port);
        }
        region
    }
}

#[derive(Debug, Deserialize)]
struct RegionsFile {
    #[serde(default)]
    regions: Vec<RegionSeed>,
}

/// Parse a regions file.
pub fn load_regions_file(path: &Path) -> Result<Vec<RegionSeed>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read regions file {}", path.display()))?;
    parse_regions(&text).with_context(|| format!("invalid regions file {}", path.display()))
}

fn parse_regions(text: &str) -> Result<Vec<RegionSeed>> {
    let file: RegionsFile = toml::from_str(text)?;
    Ok(file.regions)
}
