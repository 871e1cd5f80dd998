//! Session commands (announce URLs handed to nodes).

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use crate::output::{print_single, print_success, OutputFormat};

use super::CommandContext;

/// Session commands.
#[derive(Debug, Args)]
pub struct SessionsCommand {
    #[command(subcommand)]
    command: SessionsSubcommand,
}

#[derive(Debug, Subcommand)]
enum SessionsSubcommand {
    /// Mint a fresh announce URL for a session.
    Mint {
        /// Session name.
        session_id: String,
    },

    /// Re-install an announce URL minted by an earlier controller run.
    Restore {
        /// Session name.
        session_id: String,

        /// Previously minted announce URL.
        url: String,
    },

    /// Remove every announce URL of a session.
    Remove {
        /// Session name.
        session_id: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionResponse {
    session_id: String,
    url: String,
}

impl SessionsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let client = ctx.client()?;

        let session: SessionResponse = match self.command {
            SessionsSubcommand::Mint { session_id } => {
                client
                    .post("/v1/sessions", &serde_json::json!({ "session_id": session_id }))
                    .await?
            }
            SessionsSubcommand::Restore { session_id, url } => {
                client
                    .put(
                        &format!("/v1/sessions/{}", urlencoding::encode(&session_id)),
                        &serde_json::json!({ "url": url }),
                    )
                    .await?
            }
            SessionsSubcommand::Remove { session_id } => {
                client.delete(&format!("/v1/sessions/{}", urlencoding::encode(&session_id))).await?;
                print_success(&format!("Removed session {session_id}"));
                return Ok(());
            }
        };

        match ctx.format {
            OutputFormat::Table => {
                print_success(&format!("Announce URL for {}: {}", session.session_id, session.url))
            }
            OutputFormat::Json => print_single(&session),
        }
        Ok(())
    }
}
