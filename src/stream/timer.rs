//! Cancellable repeating timer.
//!
//! Each arming spawns a small ticker task that owns a `tokio::time::Interval`
//! and a cancel receiver. Ticks are handed over through a one-slot channel:
//! if the owner is still busy with the previous tick, the new one is dropped
//! instead of queued, so a slow consumer never sees a burst of stale ticks.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Start used when `now + period` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// A timer that is either disarmed or firing at a fixed period.
#[derive(Debug, Default)]
pub struct RepeatingTimer {
    armed: Option<ArmedTimer>,
}

#[derive(Debug)]
struct ArmedTimer {
    period: Duration,
    ticks: mpsc::Receiver<()>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ArmedTimer {
    fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

impl Drop for ArmedTimer {
    fn drop(&mut self) {
        self.cancel();
        self.task.abort();
    }
}

impl RepeatingTimer {
    /// A disarmed timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start firing every `period`, first tick one period from now.
    ///
    /// Re-arming replaces the previous ticker; ticks it produced are lost.
    pub fn arm(&mut self, period: Duration) {
        let (tick_tx, tick_rx) = mpsc::channel(1);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(run_ticker(period, tick_tx, cancel_rx));

        self.armed = Some(ArmedTimer {
            period,
            ticks: tick_rx,
            cancel: Some(cancel_tx),
            task,
        });
    }

    /// Stop firing. Safe to call when already disarmed.
    pub fn disarm(&mut self) {
        // Dropping the receiver also discards any tick still in the slot.
        self.armed = None;
    }

    /// Returns true while armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Period of the current arming, if any.
    #[must_use]
    pub fn period(&self) -> Option<Duration> {
        self.armed.as_ref().map(|a| a.period)
    }

    /// Wait for the next tick.
    ///
    /// Never completes while disarmed, which makes it usable as an always
    /// present `select!` branch. Cancel safe.
    pub async fn tick(&mut self) {
        match self.armed.as_mut() {
            Some(armed) => {
                if armed.ticks.recv().await.is_none() {
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}

async fn run_ticker(
    period: Duration,
    ticks: mpsc::Sender<()>,
    mut cancel: oneshot::Receiver<()>,
) {
    let now = Instant::now();
    let first = now
        .checked_add(period)
        .unwrap_or_else(|| now + FAR_FUTURE);
    let mut interval = tokio::time::interval_at(first, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut cancel => break,
            _ = interval.tick() => {
                match ticks.try_send(()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(())) => {
                        tracing::trace!(?period, "Tick coalesced, consumer busy");
                    }
                    Err(mpsc::error::TrySendError::Closed(())) => break,
                }
            }
        }
    }
}
