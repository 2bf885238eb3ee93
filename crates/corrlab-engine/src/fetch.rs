/*
[INPUT]:  Task id, cancellation token, result endpoint responses
[OUTPUT]: The final report, fetched at most once per task
[POS]:    Execution layer - single-flight result retrieval
[UPDATE]: When result readiness or retry-on-202 behavior changes
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use corrlab_adapter::{AnalysisResult, ApiClient, ResultFetch, Result as ApiResult};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::request::{Outcome, issue};

/// Single-flight guard for the final result fetch.
///
/// The flag flips *before* the request is dispatched, so a slow first fetch
/// and a duplicate terminal observation cannot both pass the gate and
/// double-apply a result.
#[derive(Debug, Default)]
pub struct ResultGate {
    fired: AtomicBool,
}

impl ResultGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once; every later call is refused.
    pub fn try_arm(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }

    pub fn is_armed(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

/// Fetch the final report, waiting out 202 "not ready" responses.
///
/// 404 from the result endpoint means the server dropped the session and
/// surfaces as `ApiError::SessionExpired`; every other error propagates
/// unchanged. The wait between attempts is cancellable through the session
/// token.
pub(crate) async fn resolve_result(
    client: &ApiClient,
    task_id: &str,
    retry_delay: Duration,
    token: &CancellationToken,
) -> Outcome<ApiResult<AnalysisResult>> {
    loop {
        match issue(token, client.analysis_result(task_id)).await {
            Outcome::Cancelled => return Outcome::Cancelled,
            Outcome::Completed(Ok(ResultFetch::Ready(report))) => {
                return Outcome::Completed(Ok(report));
            }
            Outcome::Completed(Ok(ResultFetch::Pending)) => {
                debug!(task_id, "result not ready yet");
                tokio::select! {
                    _ = token.cancelled() => return Outcome::Cancelled,
                    _ = tokio::time::sleep(retry_delay) => {}
                }
            }
            Outcome::Completed(Err(err)) => return Outcome::Completed(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_gate_arms_exactly_once() {
        let gate = ResultGate::new();
        assert!(!gate.is_armed());
        assert!(gate.try_arm());
        assert!(gate.is_armed());
        assert!(!gate.try_arm());
        assert!(!gate.try_arm());
    }

    #[tokio::test]
    async fn test_gate_single_winner_under_contention() {
        let gate = Arc::new(ResultGate::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move { gate.try_arm() }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.expect("join") {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_resolve_result_waits_out_202() {
        use corrlab_adapter::{ApiClient, ClientConfig};
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/analysis/result/task-1"))
            .respond_with(ResponseTemplate::new(202))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/analysis/result/task-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "basic_stats": { "n": 10 }
            })))
            .mount(&server)
            .await;

        let client =
            ApiClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
                .expect("client init");
        let token = CancellationToken::new();

        let outcome =
            resolve_result(&client, "task-1", Duration::from_millis(10), &token).await;
        match outcome {
            Outcome::Completed(Ok(report)) => assert!(report.basic_stats.is_some()),
            other => panic!("expected ready report, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_result_cancellable_while_pending() {
        use corrlab_adapter::{ApiClient, ClientConfig};
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/analysis/result/task-1"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let client =
            ApiClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
                .expect("client init");
        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            cancel.cancel();
        });

        let outcome =
            resolve_result(&client, "task-1", Duration::from_secs(60), &token).await;
        assert!(outcome.is_cancelled());
    }
}
