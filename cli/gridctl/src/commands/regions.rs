//! Region commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use gridwide_protocol::{ArchiveOptions, ArchiveUpload, Command, ShutdownDirective};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::client::Delivery;
use crate::output::{print_output, print_single, print_success, print_warning, OutputFormat};

use super::CommandContext;

/// Region commands.
#[derive(Debug, Args)]
pub struct RegionsCommand {
    #[command(subcommand)]
    command: RegionsSubcommand,
}

#[derive(Debug, Subcommand)]
enum RegionsSubcommand {
    /// List running regions.
    List(ListRegionsArgs),

    /// Shut a region down, optionally after warning its visitors.
    Close(CloseArgs),

    /// Shut every running region down immediately.
    CloseAll,

    /// Start a region.
    Start(QueryArgs),

    /// Enable or disable starting a region with its simulator.
    Startup(StartupArgs),

    /// Start or stop script execution in a region.
    Scripts(ScriptsArgs),

    /// Load a region archive (OAR) into a region.
    LoadOar(LoadOarArgs),
}

#[derive(Debug, Args)]
struct ListRegionsArgs {
    /// Include declared regions that are not running.
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Region name or part of it (case-insensitive).
    query: String,
}

#[derive(Debug, Args)]
struct CloseArgs {
    /// Region name or part of it (case-insensitive).
    query: String,

    /// Seconds to wait after warning visitors.
    #[arg(long)]
    delay: Option<u32>,
}

#[derive(Debug, Args)]
struct StartupArgs {
    /// Region name or part of it (case-insensitive).
    query: String,

    /// Disable startup instead of enabling it.
    #[arg(long)]
    disable: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScriptsAction {
    Start,
    Stop,
}

#[derive(Debug, Args)]
struct ScriptsArgs {
    /// Region name or part of it (case-insensitive).
    query: String,

    action: ScriptsAction,
}

#[derive(Debug, Args)]
struct LoadOarArgs {
    /// Region name or part of it (case-insensitive).
    query: String,

    /// Archive file.
    file: PathBuf,

    /// Load parameters: --merge, --skip-assets, --OffsetX=<n>, --OffsetY=<n>,
    /// --OffsetZ=<n>, --FlipX, --FlipY, --UseParcelOwnership, --CheckOwnership.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    params: Vec<String>,
}

impl RegionsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            RegionsSubcommand::List(args) => list_regions(ctx, args).await,
            RegionsSubcommand::Close(args) => {
                let directive = match args.delay {
                    Some(seconds) => ShutdownDirective::Delayed { seconds },
                    None => ShutdownDirective::Immediate,
                };
                issue(ctx, &args.query, Command::shutdown(directive)).await
            }
            RegionsSubcommand::CloseAll => close_all(ctx).await,
            RegionsSubcommand::Start(args) => issue(ctx, &args.query, Command::Start).await,
            RegionsSubcommand::Startup(args) => {
                let command = Command::ChangeStartupStatus {
                    enabled: !args.disable,
                };
                issue(ctx, &args.query, command).await
            }
            RegionsSubcommand::Scripts(args) => {
                let command = match args.action {
                    ScriptsAction::Start => Command::StartScripts,
                    ScriptsAction::Stop => Command::StopScripts,
                };
                issue(ctx, &args.query, command).await
            }
            RegionsSubcommand::LoadOar(args) => load_oar(ctx, args).await,
        }
    }
}

/// Region as listed by the controller.
#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
struct RegionResponse {
    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "X")]
    loc_x: i32,

    #[tabled(rename = "Y")]
    loc_y: i32,

    #[tabled(rename = "Callback")]
    callback_url: String,

    #[tabled(skip)]
    region_id: String,

    #[tabled(rename = "Registered")]
    registered_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ListRegionsResponse {
    items: Vec<RegionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FailedDelivery {
    region: String,
    error: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CloseAllReport {
    closed: Vec<String>,
    failed: Vec<FailedDelivery>,
}

async fn list_regions(ctx: CommandContext, args: ListRegionsArgs) -> Result<()> {
    let client = ctx.client()?;

    let response: ListRegionsResponse = client
        .get(&format!("/v1/regions?all={}", args.all))
        .await?;

    print_output(&response.items, ctx.format);
    Ok(())
}

async fn issue(ctx: CommandContext, query: &str, command: Command) -> Result<()> {
    let client = ctx.client()?;
    let delivery = client.issue(query, &command).await?;
    print_delivery(&delivery, ctx.format);
    Ok(())
}

fn print_delivery(delivery: &Delivery, format: OutputFormat) {
    match format {
        OutputFormat::Table => print_success(&format!(
            "{} sent to {} ({})",
            delivery.method, delivery.region, delivery.request_id
        )),
        OutputFormat::Json => print_single(delivery),
    }
}

async fn close_all(ctx: CommandContext) -> Result<()> {
    let client = ctx.client()?;
    let report: CloseAllReport = client
        .post("/v1/regions/close-all", &serde_json::json!({}))
        .await?;

    match ctx.format {
        OutputFormat::Table => {
            for region in &report.closed {
                print_success(&format!("Shutdown sent to {region}"));
            }
            for failed in &report.failed {
                print_warning(&format!("{}: {}", failed.region, failed.error));
            }
            if report.closed.is_empty() && report.failed.is_empty() {
                print_warning("No running regions");
            }
        }
        OutputFormat::Json => print_single(&report),
    }
    Ok(())
}

async fn load_oar(ctx: CommandContext, args: LoadOarArgs) -> Result<()> {
    let data = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read archive {}", args.file.display()))?;

    let upload = ArchiveUpload {
        data,
        options: ArchiveOptions::from_console_params(&args.params.join(" ")),
    };
    issue(ctx, &args.query, Command::LoadOar(upload)).await
}
