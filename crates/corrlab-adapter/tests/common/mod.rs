/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for corrlab-adapter tests

use corrlab_adapter::{ApiClient, ClientConfig};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Build a client against a mock server
pub fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init")
}

/// A status body in the server's wire format
#[allow(dead_code)]
pub fn status_body(status: &str, progress: f64, message: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "status": status,
        "progress": progress,
    });
    if let Some(message) = message {
        body["message"] = serde_json::json!(message);
    }
    body
}
