//! gridwide node agent
//!
//! Runs beside a region simulator: starts the regions flagged for startup,
//! announces them to the controller, and serves the controller's commands
//! until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use gridwide_node_agent::{
    config, ingress, ControllerClient, MockHost, NodeAgent, SqliteRegionStore,
};
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

    info!("Starting gridwide node agent");
    info!(
        listen_addr = %config.listen_addr,
        public_url = %config.public_url,
        region_manager_url = %config.region_manager_url,
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("failed to create data dir {}", config.data_dir.display())
    })?;
    let store = SqliteRegionStore::open(config.store_path())?;
    if let Some(path) = &config.regions_file {
        store.import(&config::load_regions_file(path)?)?;
    }
    let startup = store.startup_regions()?;
    let store = Arc::new(store);

    let client = ControllerClient::new(config.region_manager_url.clone(), config.announce_timeout)?;

    // The simulator itself is external; run against the mock host.
    let host = Arc::new(MockHost::new());

    let agent = Arc::new(NodeAgent::new(
        host,
        store,
        Arc::new(client),
        config.public_url.clone(),
    ));

    // Create shutdown channel
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    // Listen before announcing: the controller may answer with a command at once.
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for commands");

    let app = ingress::create_router(Arc::clone(&agent));
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

    agent.boot(startup).await;
    agent.announce_startup().await;
    info!(hosted = ?agent.hosted_regions().await, "Node agent operational");

    let server_running = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            true
        }
        result = &mut server_handle => {
            match result {
                Ok(Ok(())) => info!("Server exited normally"),
                Ok(Err(e)) => error!(error = %e, "Server error"),
                Err(e) => error!(error = %e, "Server task panicked"),
            }
            false
        }
    };

    agent.close().await;

    if server_running {
        let _ = shutdown_tx.send(true);
        let shutdown_timeout = std::time::Duration::from_secs(10);
        if tokio::time::timeout(shutdown_timeout, server_handle).await.is_err() {
            warn!("HTTP server did not shut down in time");
        }
    }

    info!("Node agent shutdown complete");
    Ok(())
}
