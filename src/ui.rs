//! UI capabilities the stream session depends on.
//!
//! The session never talks to a concrete widget toolkit. It sees a
//! [`UiBinding`]: one frame element whose source it may replace, one
//! play/pause indicator, and a list of targets that accept the toggle
//! handler. [`HeadlessUi`] is the terminal binding used by the binary.

use std::io::BufRead;
use std::sync::{Arc, Mutex};
use std::thread;

use tokio::sync::mpsc;

use crate::stream::{EventKind, IndicatorState, SessionCommand, TargetHandle};

/// What the session may do to the page.
pub trait UiBinding: Send {
    /// Current source reference of the frame element.
    fn frame_source(&self) -> String;

    /// Replace the frame element's source.
    fn set_frame_source(&mut self, url: &str);

    /// Flip the play/pause indicator.
    fn set_indicator(&mut self, state: IndicatorState);

    /// Targets the toggle handler should be attached to.
    fn toggle_targets(&self) -> Vec<(EventKind, TargetHandle)>;

    /// Subscribe `handler` to `kind` events on `target`.
    fn attach(&mut self, kind: EventKind, target: &TargetHandle, handler: ToggleHandler);

    /// Remove the handler previously attached for `(kind, target)`.
    fn detach(&mut self, kind: EventKind, target: &TargetHandle);
}

/// The single "flip play/pause" handler.
///
/// Cloning yields the same logical handler; every clone feeds the owning
/// session's command queue.
#[derive(Debug, Clone)]
pub struct ToggleHandler {
    commands: mpsc::Sender<SessionCommand>,
}

impl ToggleHandler {
    pub(crate) fn new(commands: mpsc::Sender<SessionCommand>) -> Self {
        Self { commands }
    }

    /// Request a toggle. Never blocks.
    pub fn fire(&self) {
        match self.commands.try_send(SessionCommand::Toggle) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Session busy, toggle dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Session closed, toggle ignored");
            }
        }
    }
}

/// Terminal binding: frame swaps and indicator flips go to the log, and
/// each line read from stdin acts as a click on the `stdin` target.
#[derive(Debug)]
pub struct HeadlessUi {
    frame: String,
    indicator: Option<IndicatorState>,
    swaps: u64,
    handler: Arc<Mutex<Option<ToggleHandler>>>,
}

/// Target id of the stdin "button".
pub const STDIN_TARGET: &str = "stdin";

impl HeadlessUi {
    /// Binding whose frame element initially shows `frame_url`.
    pub fn new(frame_url: impl Into<String>) -> Self {
        Self {
            frame: frame_url.into(),
            indicator: None,
            swaps: 0,
            handler: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the stdin reader thread that fires the attached handler per line.
    ///
    /// Reading happens on a plain OS thread so a pending read never holds up
    /// runtime shutdown. Lines arriving while no handler is attached are
    /// ignored, like a click on a button with no listener.
    pub fn spawn_stdin_reader(&self) -> std::io::Result<thread::JoinHandle<()>> {
        let slot = Arc::clone(&self.handler);
        thread::Builder::new()
            .name("stdin-toggle".into())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    if let Err(e) = line {
                        tracing::warn!(error = %e, "stdin read failed");
                        break;
                    }
                    fire_attached(&slot);
                }
                tracing::debug!("stdin closed, toggle input disabled");
            })
    }

    /// Number of frames swapped in so far.
    #[must_use]
    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    fn set_handler(&self, handler: Option<ToggleHandler>) {
        match self.handler.lock() {
            Ok(mut slot) => *slot = handler,
            Err(poisoned) => *poisoned.into_inner() = handler,
        }
    }
}

fn fire_attached(slot: &Mutex<Option<ToggleHandler>>) {
    let handler = match slot.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    match handler {
        Some(handler) => handler.fire(),
        None => tracing::info!("Toggle unavailable while the backend is down, waiting for recovery"),
    }
}

impl UiBinding for HeadlessUi {
    fn frame_source(&self) -> String {
        self.frame.clone()
    }

    fn set_frame_source(&mut self, url: &str) {
        self.swaps += 1;
        tracing::trace!(frame = self.swaps, url, "Frame swapped");
        url.clone_into(&mut self.frame);
    }

    fn set_indicator(&mut self, state: IndicatorState) {
        if self.indicator != Some(state) {
            match state {
                IndicatorState::Playing => tracing::info!("▶ playing"),
                IndicatorState::Paused => tracing::info!("⏸ paused"),
            }
        }
        self.indicator = Some(state);
    }

    fn toggle_targets(&self) -> Vec<(EventKind, TargetHandle)> {
        vec![(EventKind::Click, TargetHandle::new(STDIN_TARGET))]
    }

    fn attach(&mut self, kind: EventKind, target: &TargetHandle, handler: ToggleHandler) {
        tracing::debug!(?kind, %target, "Toggle handler attached");
        self.set_handler(Some(handler));
    }

    fn detach(&mut self, kind: EventKind, target: &TargetHandle) {
        tracing::debug!(?kind, %target, "Toggle handler detached");
        self.set_handler(None);
    }
}
