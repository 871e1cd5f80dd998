//! Controller API integration tests.
//!
//! Runs the full router on an ephemeral port; nodes are played by wiremock
//! servers.

use gridwide_controller::{api, config::Config, dispatch::DispatchConfig, state::AppState};
use gridwide_protocol::RegionDescriptor;
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test harness running the controller router.
struct ControllerHarness {
    base_url: String,
    client: reqwest::Client,
    state: AppState,
}

impl ControllerHarness {
    async fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info,gridwide_controller=debug".into()),
            )
            .with_test_writer()
            .try_init();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let config = Config {
            listen_addr: addr,
            public_url: base_url.clone(),
            log_level: "debug".to_string(),
            dispatch: DispatchConfig::default(),
            announce_urls: Vec::new(),
        };
        let state = AppState::from_config(&config).unwrap();
        let app = api::create_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            state,
        }
    }

    async fn mint(&self, session_id: &str) -> String {
        let resp = self
            .client
            .post(format!("{}/v1/sessions", self.base_url))
            .json(&serde_json::json!({ "session_id": session_id }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = resp.json().await.unwrap();
        body["url"].as_str().expect("missing url").to_string()
    }

    async fn announce(&self, url: &str, body: serde_json::Value) -> reqwest::Response {
        self.client.post(url).json(&body).send().await.unwrap()
    }

    async fn list(&self, all: bool) -> Vec<serde_json::Value> {
        let body: serde_json::Value = self
            .client
            .get(format!("{}/v1/regions?all={all}", self.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["items"].as_array().cloned().unwrap_or_default()
    }
}

fn online(name: &str, url: &str) -> serde_json::Value {
    serde_json::json!({
        "Method": "RegionOnline",
        "Region": RegionDescriptor::new(name, 1000, 1000),
        "URL": url,
    })
}

#[tokio::test]
async fn test_announce_lifecycle() {
    let harness = ControllerHarness::new().await;
    let announce_url = harness.mint("sim-1").await;

    let resp = harness
        .announce(&announce_url, online("Alpha", "http://sim1:9000/rrm_a"))
        .await;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert!(resp.bytes().await.unwrap().is_empty());

    let items = harness.list(false).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Alpha");
    assert_eq!(items[0]["status"], "online");

    let resp = harness
        .announce(
            &announce_url,
            serde_json::json!({
                "Method": "RegionOffline",
                "Region": RegionDescriptor::new("Alpha", 1000, 1000),
            }),
        )
        .await;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    assert!(harness.list(false).await.is_empty());
    let all = harness.list(true).await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["status"], "offline");
}

#[tokio::test]
async fn test_unminted_path_is_not_found() {
    let harness = ControllerHarness::new().await;

    let resp = harness
        .announce(
            &format!("{}/grm_01HV4Z2WQXKJNM8GPQY6VBKC3D", harness.base_url),
            online("Alpha", "http://sim1:9000/rrm_a"),
        )
        .await;
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(harness.state.registry().counts().await, (0, 0));
}

#[tokio::test]
async fn test_removed_session_stops_accepting() {
    let harness = ControllerHarness::new().await;
    let announce_url = harness.mint("sim-1").await;

    let resp = harness
        .client
        .delete(format!("{}/v1/sessions/sim-1", harness.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);

    let resp = harness
        .announce(&announce_url, online("Alpha", "http://sim1:9000/rrm_a"))
        .await;
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    let resp = harness
        .client
        .delete(format!("{}/v1/sessions/sim-1", harness.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_garbage_and_unknown_methods_still_answer_ok() {
    let harness = ControllerHarness::new().await;
    let announce_url = harness.mint("sim-1").await;

    let resp = harness
        .client
        .post(&announce_url)
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let resp = harness
        .announce(&announce_url, serde_json::json!({ "Method": "RegionExploded" }))
        .await;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let resp = harness
        .announce(&announce_url, serde_json::json!({ "Region": "Alpha" }))
        .await;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    assert_eq!(harness.state.registry().counts().await, (0, 0));
}

#[tokio::test]
async fn test_restored_url_accepts_announces() {
    let harness = ControllerHarness::new().await;
    let old_url = "http://old-controller:8080/grm_01HV4Z2WQXKJNM8GPQY6VBKC3D";

    let resp = harness
        .client
        .put(format!("{}/v1/sessions/sim-1", harness.base_url))
        .json(&serde_json::json!({ "url": old_url }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let resp = harness
        .announce(
            &format!("{}/grm_01HV4Z2WQXKJNM8GPQY6VBKC3D", harness.base_url),
            online("Alpha", "http://sim1:9000/rrm_a"),
        )
        .await;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert!(harness.state.registry().is_running("Alpha").await);

    let resp = harness
        .client
        .put(format!("{}/v1/sessions/sim-1", harness.base_url))
        .json(&serde_json::json!({ "url": "http://sim1:9000/rrm_01HV4Z2WQXKJNM8GPQY6VBKC3D" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_operator_command_reaches_node() {
    let harness = ControllerHarness::new().await;
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rrm_alpha"))
        .and(header_exists("x-request-id"))
        .and(body_json(serde_json::json!({ "Method": "Start" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&node)
        .await;

    let announce_url = harness.mint("sim-1").await;
    harness
        .announce(
            &announce_url,
            serde_json::json!({
                "Method": "RegionProvided",
                "Region": RegionDescriptor::new("Alpha", 1000, 1000),
                "URL": format!("{}/rrm_alpha", node.uri()),
            }),
        )
        .await;

    let resp = harness
        .client
        .post(format!("{}/v1/regions/alp/commands", harness.base_url))
        .json(&serde_json::json!({ "Method": "Start" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::ACCEPTED);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["region"], "Alpha");
    assert_eq!(body["method"], "Start");
    assert!(body["request_id"].as_str().unwrap().starts_with("req_"));
}

#[tokio::test]
async fn test_operator_command_errors() {
    let harness = ControllerHarness::new().await;

    let resp = harness
        .client
        .post(format!("{}/v1/regions/zeta/commands", harness.base_url))
        .json(&serde_json::json!({ "Method": "Start" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "region_not_found");

    let resp = harness
        .client
        .post(format!("{}/v1/regions/zeta/commands", harness.base_url))
        .json(&serde_json::json!({ "Method": "Explode" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    // Node is gone: delivery fails.
    let node = MockServer::start().await;
    let node_url = format!("{}/rrm_alpha", node.uri());
    drop(node);
    harness
        .state
        .registry()
        .register_running(RegionDescriptor::new("Alpha", 0, 0), node_url)
        .await;

    let resp = harness
        .client
        .post(format!("{}/v1/regions/alpha/commands", harness.base_url))
        .json(&serde_json::json!({ "Method": "StopScripts" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "delivery_failed");
}

#[tokio::test]
async fn test_healthz_reports_counts() {
    let harness = ControllerHarness::new().await;
    harness
        .state
        .registry()
        .register_declared(RegionDescriptor::new("Beta", 0, 0), "http://sim2/rrm_b".into())
        .await;

    let resp = harness
        .client
        .get(format!("{}/healthz", harness.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["running_regions"], 0);
    assert_eq!(body["declared_regions"], 1);
}
