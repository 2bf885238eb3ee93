/*
[INPUT]:  A cancellation token and one request future
[OUTPUT]: The response, or a distinguishable Cancelled outcome
[POS]:    Execution layer - single cancellable request wrapper
[UPDATE]: When cancellation semantics or tie-break rules change
*/

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Outcome of one cancellable request.
///
/// `Cancelled` is not an error: callers drop it silently and never surface
/// it to consumers.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The request ran to completion before any cancellation
    Completed(T),
    /// The session was cancelled; any response is discarded
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

/// Run one request under a cancellation token.
///
/// Dropping the request future aborts the underlying HTTP exchange, so a
/// cancelled request releases its connection instead of lingering until a
/// response arrives. If completion and cancellation race, cancellation
/// wins: the token is checked again after the future resolves, so a
/// cancelled session never observes the response regardless of arrival
/// order.
pub async fn issue<T, F>(token: &CancellationToken, request: F) -> Outcome<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        _ = token.cancelled() => Outcome::Cancelled,
        value = request => {
            if token.is_cancelled() {
                Outcome::Cancelled
            } else {
                Outcome::Completed(value)
            }
        }
    }
}
