//! End-to-end happy path test.
//!
//! Runs a real controller and a real node agent over loopback HTTP and walks
//! a region through its lifecycle:
//!
//! 1. Mint an announce URL for the node
//! 2. Boot the node: Alpha starts and goes online, Beta is only provided
//! 3. Start Beta by substring through the operator API
//! 4. Disable Alpha's startup flag
//! 5. Delayed shutdown of Alpha: visitors warned, then offline
//! 6. Close-all takes Beta offline
//!
//! ## Running
//!
//! ```bash
//! cargo test -p gridwide-e2e --test happy_path
//! ```

use std::sync::Arc;
use std::time::Duration;

use gridwide_controller::{api, config::Config, dispatch::DispatchConfig, state::AppState};
use gridwide_node_agent::{
    ingress, AgentPhase, ControllerClient, HostCall, MockHost, NodeAgent, SqliteRegionStore,
};
use gridwide_protocol::RegionDescriptor;
use tokio::net::TcpListener;

struct Grid {
    controller_url: String,
    client: reqwest::Client,
    controller: AppState,
    agent: Arc<NodeAgent>,
    host: Arc<MockHost>,
    store: Arc<SqliteRegionStore>,
    _data_dir: tempfile::TempDir,
}

impl Grid {
    async fn start() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    "info,gridwide_controller=debug,gridwide_node_agent=debug".into()
                }),
            )
            .with_test_writer()
            .try_init();

        // Controller
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let controller_url = format!("http://{addr}");
        let config = Config {
            listen_addr: addr,
            public_url: controller_url.clone(),
            log_level: "debug".to_string(),
            dispatch: DispatchConfig::default(),
            announce_urls: Vec::new(),
        };
        let controller = AppState::from_config(&config).unwrap();
        let app = api::create_router(controller.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::new();
        let session: serde_json::Value = client
            .post(format!("{controller_url}/v1/sessions"))
            .json(&serde_json::json!({ "session_id": "sim-1" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let announce_url = session["url"].as_str().unwrap().to_string();

        // Node
        let data_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteRegionStore::open(data_dir.path().join("regions.db")).unwrap());
        store
            .upsert_region(&RegionDescriptor::new("Alpha", 256_000, 256_000), true)
            .unwrap();
        store
            .upsert_region(&RegionDescriptor::new("Beta", 256_256, 256_000), false)
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let node_url = format!("http://{}", listener.local_addr().unwrap());

        let host = Arc::new(MockHost::new());
        let announcer = ControllerClient::new(announce_url, Duration::from_secs(5)).unwrap();
        let agent = Arc::new(NodeAgent::new(
            host.clone(),
            store.clone(),
            Arc::new(announcer),
            node_url,
        ));

        let app = ingress::create_router(Arc::clone(&agent));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        agent.boot(store.startup_regions().unwrap()).await;
        agent.announce_startup().await;

        Self {
            controller_url,
            client,
            controller,
            agent,
            host,
            store,
            _data_dir: data_dir,
        }
    }

    async fn regions(&self, all: bool) -> Vec<(String, String)> {
        let body: serde_json::Value = self
            .client
            .get(format!("{}/v1/regions?all={all}", self.controller_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| {
                (
                    item["name"].as_str().unwrap().to_string(),
                    item["status"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    }

    async fn command(&self, query: &str, body: serde_json::Value) -> reqwest::StatusCode {
        self.client
            .post(format!("{}/v1/regions/{query}/commands", self.controller_url))
            .json(&body)
            .send()
            .await
            .unwrap()
            .status()
    }

    async fn wait_until_stopped(&self, name: &str) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while self.controller.registry().is_running(name).await {
            assert!(
                tokio::time::Instant::now() < deadline,
                "{name} still running"
            );
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

fn pair(name: &str, status: &str) -> (String, String) {
    (name.to_string(), status.to_string())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_region_lifecycle() {
    let grid = Grid::start().await;

    // Boot: Alpha online, Beta provided.
    assert_eq!(grid.agent.phase(), AgentPhase::Operational);
    assert_eq!(grid.regions(false).await, vec![pair("Alpha", "online")]);
    assert_eq!(
        grid.regions(true).await,
        vec![pair("Alpha", "online"), pair("Beta", "offline")]
    );

    // Start the declared region by substring.
    let status = grid
        .command("BET", serde_json::json!({ "Method": "Start" }))
        .await;
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);
    assert_eq!(
        grid.regions(false).await,
        vec![pair("Alpha", "online"), pair("Beta", "online")]
    );

    // Startup flag.
    let status = grid
        .command(
            "alpha",
            serde_json::json!({ "Method": "ChangeStartupStatus", "StatusEnabled": false }),
        )
        .await;
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);
    assert!(!grid.store.get_region("Alpha").unwrap().unwrap().startup_enabled);

    // Delayed shutdown warns first, then closes.
    let status = grid
        .command(
            "alpha",
            serde_json::json!({ "Method": "Shutdown", "Type": "Delayed", "Seconds": 1 }),
        )
        .await;
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);
    assert!(grid.host.calls().contains(&HostCall::Warning {
        region: "Alpha".to_string(),
        message: "The region Alpha will shut down in 1 seconds.".to_string(),
    }));

    grid.wait_until_stopped("Alpha").await;
    assert_eq!(
        grid.regions(true).await,
        vec![pair("Beta", "online"), pair("Alpha", "offline")]
    );

    // Close-all.
    let report: serde_json::Value = grid
        .client
        .post(format!("{}/v1/regions/close-all", grid.controller_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["closed"], serde_json::json!(["Beta"]));
    assert!(grid.regions(false).await.is_empty());
    assert!(grid.agent.hosted_regions().await.is_empty());

    // Unknown region.
    let status = grid
        .command("zeta", serde_json::json!({ "Method": "Start" }))
        .await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);

    grid.agent.close().await;
    assert_eq!(grid.agent.phase(), AgentPhase::Terminated);
}
