//! Bounded-time reachability checks for frame resources.
//!
//! A probe settles exactly once: either the load attempt finishes before the
//! budget elapses, or the budget wins and the attempt is dropped. Errors
//! never reach the caller; every failure path collapses to
//! [`ProbeOutcome::Unreachable`].

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::types::ProbeOutcome;

/// Checks whether a resource can currently be fetched.
///
/// Implementations must be safe to call from the frame refresh and the
/// recovery watcher without coordination; a probe carries no state between
/// invocations.
#[async_trait]
pub trait FrameProbe: Send + Sync {
    /// Try to load `url` within `budget`.
    async fn probe(&self, url: &str, budget: Duration) -> ProbeOutcome;
}

/// Race a load attempt against `budget`.
///
/// `Ok` before the deadline is [`ProbeOutcome::Reachable`]; an error or the
/// deadline expiring is [`ProbeOutcome::Unreachable`]. The losing side is
/// dropped, never reported.
pub async fn probe_within<F, E>(budget: Duration, attempt: F) -> ProbeOutcome
where
    F: Future<Output = Result<(), E>>,
    E: fmt::Display,
{
    match tokio::time::timeout(budget, attempt).await {
        Ok(Ok(())) => ProbeOutcome::Reachable,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Probe failed");
            ProbeOutcome::Unreachable
        }
        Err(_) => {
            tracing::debug!(budget_ms = budget.as_millis() as u64, "Probe timed out");
            ProbeOutcome::Unreachable
        }
    }
}
