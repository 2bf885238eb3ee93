/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for corrlab-engine tests

use corrlab_adapter::{ApiClient, ClientConfig};
use corrlab_engine::{AnalysisEngine, EngineConfig, ResultProtocol};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Build an engine against a mock server with intervals tightened for tests
#[allow(dead_code)]
pub fn engine_for(server: &MockServer, protocol: ResultProtocol) -> AnalysisEngine {
    let client = ApiClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init");
    let config = EngineConfig {
        base_url: server.uri(),
        poll_interval_ms: 25,
        health_interval_ms: 50,
        protocol,
        ..EngineConfig::default()
    };
    AnalysisEngine::new(client, config)
}

/// A status body in the server's wire format
#[allow(dead_code)]
pub fn status_json(status: &str, progress: f64) -> serde_json::Value {
    serde_json::json!({
        "status": status,
        "progress": progress,
    })
}

/// Mount a status response served exactly once; later requests fall
/// through to mocks mounted afterwards.
#[allow(dead_code)]
pub async fn mount_status_once(server: &MockServer, task_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/analysis/status/{task_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Mount a healthy /health endpoint
#[allow(dead_code)]
pub async fn mount_health(server: &MockServer, active_tasks: u32) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "active_tasks": active_tasks
        })))
        .mount(server)
        .await;
}
