/*
[INPUT]:  Session cancellation token and the /health endpoint
[OUTPUT]: ServiceHealth annotations on a watch channel
[POS]:    Execution layer - background liveness probe
[UPDATE]: When probe cadence or health classification changes
*/

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::engine::Shared;
use crate::request::{Outcome, issue};

/// Last known reachability of the analysis service.
///
/// Annotates the waiting UI only; probe failures never touch the task
/// lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceHealth {
    /// No probe has completed yet
    #[default]
    Unknown,
    /// The service answered, reporting its active task count
    Reachable { active_tasks: u32 },
    /// The last probe failed
    Unreachable,
}

/// Probe the service on a fixed interval while the session lives.
///
/// Bound to the same token as the poll loop, so the probe runs exactly
/// while a task is being polled and stops on terminal resolution, reset,
/// or supersession.
pub(crate) async fn run_health_loop(shared: Arc<Shared>, token: CancellationToken) {
    let interval = shared.config.health_interval();

    loop {
        match issue(&token, shared.client.health()).await {
            Outcome::Cancelled => break,
            Outcome::Completed(Ok(health)) => {
                shared.health_tx.send_replace(ServiceHealth::Reachable {
                    active_tasks: health.active_tasks,
                });
            }
            Outcome::Completed(Err(err)) => {
                debug!(instance = %shared.instance, "health probe failed: {err}");
                shared.health_tx.send_replace(ServiceHealth::Unreachable);
            }
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    // The annotation is only meaningful while polling.
    shared.health_tx.send_replace(ServiceHealth::Unknown);
}
