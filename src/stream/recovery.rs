//! Outage recovery watcher.
//!
//! While the session is stopped the watcher probes the plain frame URL on a
//! fixed period. The first reachable probe reports recovery and disarms the
//! watcher; later ticks from that arming can no longer be observed.

use std::time::Duration;

use url::Url;

use super::probe::FrameProbe;
use super::timer::RepeatingTimer;
use super::types::ProbeOutcome;

/// Default period between recovery probes.
pub const DEFAULT_RECOVERY_INTERVAL: Duration = Duration::from_millis(3000);

/// What a recovery check concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryVerdict {
    /// Backend is reachable again; the watcher has disarmed itself
    Recovered,
    /// Probe failed; waiting for the next tick
    StillDown,
    /// Watcher was not armed, or the session is already running
    Ignored,
}

/// Probe-retry timer that is only armed while the session is stopped.
#[derive(Debug, Default)]
pub struct RecoveryWatcher {
    timer: RepeatingTimer,
    attempts: u32,
}

impl RecoveryWatcher {
    /// A disarmed watcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin probing every `interval`. Resets the attempt counter.
    pub fn arm(&mut self, interval: Duration) {
        self.attempts = 0;
        self.timer.arm(interval);
        tracing::debug!(interval_ms = interval.as_millis() as u64, "Recovery watcher armed");
    }

    /// Stop probing. Idempotent.
    pub fn disarm(&mut self) {
        if self.timer.is_armed() {
            tracing::debug!(attempts = self.attempts, "Recovery watcher disarmed");
        }
        self.timer.disarm();
    }

    /// Returns true while armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// Probes made since the last arming.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wait for the next probe tick. Pending forever while disarmed.
    pub async fn tick(&mut self) {
        self.timer.tick().await;
    }

    /// Run one recovery probe against `url`.
    ///
    /// If the session is already running (a manual toggle won the race) the
    /// tick is ignored and the watcher disarms without probing.
    pub async fn check(
        &mut self,
        probe: &dyn FrameProbe,
        url: &Url,
        budget: Duration,
        session_running: bool,
    ) -> RecoveryVerdict {
        if !self.is_armed() {
            return RecoveryVerdict::Ignored;
        }
        if session_running {
            self.disarm();
            return RecoveryVerdict::Ignored;
        }

        self.attempts += 1;
        match probe.probe(url.as_str(), budget).await {
            ProbeOutcome::Reachable => {
                tracing::info!(url = %url, attempts = self.attempts, "Backend reachable again");
                self.disarm();
                RecoveryVerdict::Recovered
            }
            ProbeOutcome::Unreachable => {
                tracing::debug!(url = %url, attempt = self.attempts, "Backend still unreachable");
                RecoveryVerdict::StillDown
            }
        }
    }
}
