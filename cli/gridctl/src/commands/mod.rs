//! CLI commands.

mod regions;
mod sessions;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::ApiClient;
use crate::output::OutputFormat;

/// gridctl - manage the regions of a gridwide controller.
#[derive(Debug, Parser)]
#[command(name = "gridctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Controller base URL.
    #[arg(
        long,
        global = true,
        env = "GRIDCTL_CONTROLLER_URL",
        default_value = "http://127.0.0.1:8080"
    )]
    controller: String,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List regions and send them lifecycle commands.
    Regions(regions::RegionsCommand),

    /// Manage announce URLs handed to nodes.
    Sessions(sessions::SessionsCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let ctx = CommandContext {
            controller: self.controller,
            format: self.format,
        };

        match self.command {
            Commands::Regions(cmd) => cmd.run(ctx).await,
            Commands::Sessions(cmd) => cmd.run(ctx).await,
            Commands::Version => {
                println!("gridctl {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub controller: String,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Get an operator API client.
    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.controller)
    }
}
