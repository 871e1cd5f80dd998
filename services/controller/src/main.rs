//! gridwide controller
//!
//! Tracks which regions exist on the grid and which are running, and relays
//! operator commands to the nodes hosting them.

use anyhow::Result;
use gridwide_controller::{api, config, state::AppState, CONFIGURED_SESSION};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to GRID_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting gridwide controller");
    info!(
        listen_addr = %config.listen_addr,
        public_url = %config.public_url,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config)?;

    for url in &config.announce_urls {
        if let Err(e) = state.announce_routes().restore(CONFIGURED_SESSION, url).await {
            warn!(url = %url, error = %e, "Skipping configured announce URL");
        }
    }

    // Create shutdown channel for graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    let mut server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow() {
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(true);
            let shutdown_timeout = std::time::Duration::from_secs(10);
            if tokio::time::timeout(shutdown_timeout, &mut server_handle).await.is_err() {
                warn!("HTTP server did not shut down in time");
            }
        }
        result = &mut server_handle => {
            match result {
                Ok(Ok(())) => info!("Server exited normally"),
                Ok(Err(e)) => error!(error = %e, "Server error"),
                Err(e) => error!(error = %e, "Server task panicked"),
            }
        }
    }

    info!("Controller shutdown complete");
    Ok(())
}
