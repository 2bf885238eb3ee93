/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for HTTP client
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When HTTP endpoints change
*/

mod common;

use common::{client_for, setup_mock_server, status_body};
use corrlab_adapter::{ApiClient, ApiError, ClientConfig, JobStatus, ResultFetch};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_client_creation() {
    let _client = assert_ok!(ApiClient::new());
}

#[test]
fn test_client_with_config() {
    let config = ClientConfig::default();
    let _client = assert_ok!(ApiClient::with_config(config));
}

#[test]
fn test_client_rejects_invalid_base_url() {
    let result = ApiClient::with_config_and_base_url(ClientConfig::default(), "not a url");
    assert!(matches!(result, Err(ApiError::UrlParse(_))));
}

#[tokio::test]
async fn test_status_then_result_two_step() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/analysis/status/task-9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body("completed", 1.0, Some("done"))),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/analysis/result/task-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "basic_stats": { "observations": 489 }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let status = assert_ok!(client.analysis_status("task-9").await);
    assert_eq!(status.status, JobStatus::Completed);
    assert!(status.status.is_terminal());

    let fetch = assert_ok!(client.analysis_result("task-9").await);
    match fetch {
        ResultFetch::Ready(report) => assert!(report.basic_stats.is_some()),
        ResultFetch::Pending => panic!("expected ready report"),
    }
}

#[tokio::test]
async fn test_transport_error_classification() {
    // Nothing listens on this port; the request must fail at the transport
    // level, not as a server-classified error.
    let client = ApiClient::with_config_and_base_url(
        ClientConfig {
            timeout: std::time::Duration::from_secs(2),
            connect_timeout: std::time::Duration::from_secs(2),
        },
        "http://127.0.0.1:9",
    )
    .expect("client init");

    let err = client
        .analysis_status("task-1")
        .await
        .expect_err("expected transport failure");
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_status_404_maps_to_session_expired() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/analysis/status/task-gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown task"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .analysis_status("task-gone")
        .await
        .expect_err("expected session expired");
    assert!(err.is_session_expired());
}
