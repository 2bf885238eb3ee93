/*
[INPUT]:  Task id, session epoch + token, adapter client via Shared
[OUTPUT]: TaskEvents applied to the shared state until terminal or superseded
[POS]:    Execution layer - per-session polling loop
[UPDATE]: When tick sequencing, terminal handoff, or error mapping changes
*/

use std::sync::Arc;

use corrlab_adapter::{ApiError, JobStatus, ResultFetch, StatusResponse};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ResultProtocol;
use crate::engine::Shared;
use crate::fetch::{ResultGate, resolve_result};
use crate::reducer::{FailureKind, TaskEvent};
use crate::request::{Outcome, issue};

/// What a completed tick means for the loop
enum Tick {
    /// Non-terminal status; arm the timer for the next tick
    Continue,
    /// Terminal state, fatal error, cancellation, or supersession
    Stop,
}

/// Poll one session to resolution.
///
/// Requests are strictly sequential: the next tick's request is never sent
/// before the previous tick's response (or its cancellation) was observed.
/// On exit the session token is cancelled so the liveness probe bound to
/// this session stops with it.
pub(crate) async fn run_poll_loop(
    shared: Arc<Shared>,
    task_id: String,
    epoch: u64,
    token: CancellationToken,
) {
    let gate = ResultGate::new();
    let interval = shared.config.poll_interval();
    info!(
        instance = %shared.instance,
        task_id = %task_id,
        epoch,
        protocol = ?shared.config.protocol,
        "polling started"
    );

    loop {
        if token.is_cancelled() {
            break;
        }

        let tick = match shared.config.protocol {
            ResultProtocol::StatusThenResult => {
                status_tick(&shared, &task_id, epoch, &token, &gate).await
            }
            ResultProtocol::ResultPolling => {
                result_tick(&shared, &task_id, epoch, &token, &gate).await
            }
        };

        match tick {
            Tick::Stop => break,
            Tick::Continue => {}
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    // Terminal resolution stops further ticks and the session's probe.
    token.cancel();
    info!(
        instance = %shared.instance,
        task_id = %task_id,
        epoch,
        "polling stopped"
    );
}

/// One tick of the two-step protocol: poll status, hand terminal
/// "completed" off to the result gate.
async fn status_tick(
    shared: &Arc<Shared>,
    task_id: &str,
    epoch: u64,
    token: &CancellationToken,
    gate: &ResultGate,
) -> Tick {
    let outcome = issue(token, shared.client.analysis_status(task_id)).await;

    // Supersession check at consumption time, not send time.
    if shared.current_epoch() != epoch {
        return Tick::Stop;
    }

    let status = match outcome {
        Outcome::Cancelled => return Tick::Stop,
        Outcome::Completed(Err(err)) => {
            fail(shared, task_id, epoch, &err);
            return Tick::Stop;
        }
        Outcome::Completed(Ok(status)) => status,
    };

    apply_status(shared, epoch, &status);

    match status.status {
        JobStatus::Pending | JobStatus::Running => Tick::Continue,
        JobStatus::Completed => {
            resolve(shared, task_id, epoch, token, gate).await;
            Tick::Stop
        }
        JobStatus::Failed => {
            let message = status
                .message
                .unwrap_or_else(|| "analysis failed without a server message".to_string());
            warn!(
                instance = %shared.instance,
                task_id = %task_id,
                epoch,
                "server reported analysis failure: {message}"
            );
            shared.apply(TaskEvent::Failed {
                epoch,
                kind: FailureKind::Application,
                message,
            });
            Tick::Stop
        }
    }
}

/// One tick of the single-endpoint protocol: poll the result endpoint,
/// where 202 means "still running".
async fn result_tick(
    shared: &Arc<Shared>,
    task_id: &str,
    epoch: u64,
    token: &CancellationToken,
    gate: &ResultGate,
) -> Tick {
    let outcome = issue(token, shared.client.analysis_result(task_id)).await;

    if shared.current_epoch() != epoch {
        return Tick::Stop;
    }

    match outcome {
        Outcome::Cancelled => Tick::Stop,
        Outcome::Completed(Ok(ResultFetch::Pending)) => {
            // No progress detail on this protocol; the tick only confirms
            // the job is still alive.
            shared.apply(TaskEvent::StatusReceived {
                epoch,
                status: JobStatus::Running,
                progress: 0.0,
                message: None,
                current_stock: None,
            });
            Tick::Continue
        }
        Outcome::Completed(Ok(ResultFetch::Ready(report))) => {
            if gate.try_arm() {
                shared.apply(TaskEvent::Completed {
                    epoch,
                    result: report,
                });
                info!(
                    instance = %shared.instance,
                    task_id = %task_id,
                    epoch,
                    "analysis completed"
                );
            }
            Tick::Stop
        }
        Outcome::Completed(Err(err)) => {
            fail(shared, task_id, epoch, &err);
            Tick::Stop
        }
    }
}

/// Terminal handoff: fetch the report at most once per task.
async fn resolve(
    shared: &Arc<Shared>,
    task_id: &str,
    epoch: u64,
    token: &CancellationToken,
    gate: &ResultGate,
) {
    // Armed before dispatch; a duplicate terminal observation is refused
    // even while the first fetch is still in flight.
    if !gate.try_arm() {
        return;
    }

    let interval = shared.config.poll_interval();
    match resolve_result(&shared.client, task_id, interval, token).await {
        Outcome::Cancelled => {}
        Outcome::Completed(Ok(report)) => {
            if shared.current_epoch() != epoch {
                return;
            }
            shared.apply(TaskEvent::Completed {
                epoch,
                result: report,
            });
            info!(
                instance = %shared.instance,
                task_id = %task_id,
                epoch,
                "analysis completed"
            );
        }
        Outcome::Completed(Err(err)) => {
            if shared.current_epoch() != epoch {
                return;
            }
            // The job finished but its report is unreadable; this stays
            // distinct from a server-reported job failure via the kind.
            fail(shared, task_id, epoch, &err);
        }
    }
}

fn apply_status(shared: &Arc<Shared>, epoch: u64, status: &StatusResponse) {
    shared.apply(TaskEvent::StatusReceived {
        epoch,
        status: status.status,
        progress: status.progress,
        message: status.message.clone(),
        current_stock: status.current_stock.clone(),
    });
}

fn fail(shared: &Arc<Shared>, task_id: &str, epoch: u64, err: &ApiError) {
    let (kind, message) = classify_error(err);
    warn!(
        instance = %shared.instance,
        task_id = %task_id,
        epoch,
        kind = ?kind,
        "polling stopped on error: {err}"
    );
    shared.apply(TaskEvent::Failed {
        epoch,
        kind,
        message,
    });
}

/// Map adapter errors onto the consumer-facing failure taxonomy.
fn classify_error(err: &ApiError) -> (FailureKind, String) {
    match err {
        ApiError::Http(_) => (
            FailureKind::Transport,
            format!("connection to the analysis service failed: {err}"),
        ),
        ApiError::SessionExpired { message } => {
            let message = if message.is_empty() {
                "analysis session expired; start a new analysis".to_string()
            } else {
                message.clone()
            };
            (FailureKind::SessionExpired, message)
        }
        ApiError::Server { code, .. } => {
            (FailureKind::Server, format!("server error (HTTP {code})"))
        }
        other => (FailureKind::Server, other.to_string()),
    }
}
