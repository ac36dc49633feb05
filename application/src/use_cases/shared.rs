//! Shared utilities for use cases and agents.
//!
//! Contains cancellation checking and cancellable await helpers used by the
//! coordinator loop and the agent variants.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(CancellationToken::is_cancelled)
}

/// Await `fut` unless the token fires first.
///
/// Returns `None` when cancelled; the future is dropped in that case.
pub(crate) async fn cancellable<F: Future>(
    token: &Option<CancellationToken>,
    fut: F,
) -> Option<F::Output> {
    match token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = fut => Some(output),
            }
        }
        None => Some(fut.await),
    }
}

/// Await `fut` unless the (always present) token fires first.
pub(crate) async fn race_cancellation<F: Future>(
    token: &CancellationToken,
    fut: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        output = fut => Some(output),
    }
}
