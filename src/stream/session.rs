//! The stream session state machine.
//!
//! A [`StreamSession`] owns everything that changes while the feed is
//! shown: the play/pause state, the local camera status, the frame timer,
//! the recovery watcher, and the toggle handler's subscriptions. It runs
//! as a single task that handles one event at a time (a user toggle, a
//! frame tick, or a recovery tick) so transitions never interleave.
//!
//! # State machine
//!
//! ```text
//!              toggle / probe fails
//!   Running ─────────────────────────▶ Stopped
//!      ▲                                  │
//!      └──────────────────────────────────┘
//!          toggle / recovery probe ok
//! ```
//!
//! Entering `Running` sends `is_on = true`, shows "playing", arms the frame
//! timer and attaches the toggle handler. Entering `Stopped` sends
//! `is_on = false`, shows "paused" and disarms the frame timer. What else
//! happens depends on the [`StopCause`]:
//!
//! - [`StopCause::Paused`]: the user asked for it. The handler stays
//!   attached so the same targets resume the feed, and nothing probes the
//!   backend behind the user's back.
//! - [`StopCause::Outage`]: a frame probe failed. The handler is detached
//!   first and the recovery watcher is armed; the feed resumes on its own
//!   once the backend answers again.
//!
//! Both transitions are no-ops when the session is already in the target
//! state.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use camfeed::backend::HttpBackend;
//! use camfeed::stream::{FrameRate, SessionTimings, StreamSession};
//! use camfeed::ui::HeadlessUi;
//!
//! # async fn example(backend: Arc<HttpBackend>) -> anyhow::Result<()> {
//! let ui = HeadlessUi::new("http://127.0.0.1:5000/static/img/cam.jpg");
//! let (session, handle) = StreamSession::new(
//!     backend.clone(),
//!     backend,
//!     Box::new(ui),
//!     FrameRate::new(10.0)?,
//!     SessionTimings::default(),
//! )?;
//! let task = tokio::spawn(session.run());
//! handle.toggle().await?;
//! handle.shutdown().await?;
//! task.await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::listeners::ListenerRegistry;
use super::probe::FrameProbe;
use super::recovery::{RecoveryVerdict, RecoveryWatcher, DEFAULT_RECOVERY_INTERVAL};
use super::timer::RepeatingTimer;
use super::types::{CameraStatus, FrameRate, FrameSource, IndicatorState, ProbeOutcome, StreamState};
use crate::control::{ControlDispatcher, RemoteControlClient};
use crate::error::{AppResult, SessionError};
use crate::ui::{ToggleHandler, UiBinding};

/// Default budget for one frame probe.
pub const DEFAULT_PROBE_BUDGET: Duration = Duration::from_millis(1000);

const COMMAND_QUEUE_DEPTH: usize = 32;

/// Probe and recovery timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    /// Time allowed for a single frame probe
    pub probe_budget: Duration,
    /// Period of the recovery probe while stopped
    pub recovery_interval: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            probe_budget: DEFAULT_PROBE_BUDGET,
            recovery_interval: DEFAULT_RECOVERY_INTERVAL,
        }
    }
}

/// Why the session entered `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// Paused from a toggle target or the handle
    Paused,
    /// A frame probe came back unreachable
    Outage,
}

/// Messages processed by the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Flip play/pause
    Toggle,
    /// Leave the event loop
    Shutdown,
}

/// Observable session state, published after every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Play/pause state
    pub state: StreamState,
    /// Last camera status sent to the backend
    pub camera: CameraStatus,
    /// Set while stopped
    pub stop_cause: Option<StopCause>,
    /// Number of live toggle subscriptions
    pub registrations: usize,
    /// Whether the frame timer is armed
    pub frame_timer_armed: bool,
    /// Whether the recovery watcher is armed
    pub recovery_armed: bool,
}

/// External handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Flip play/pause, as if a toggle target had been clicked.
    pub async fn toggle(&self) -> AppResult<()> {
        self.send(SessionCommand::Toggle).await
    }

    /// Ask the session loop to exit. Timers are disarmed on the way out.
    pub async fn shutdown(&self) -> AppResult<()> {
        self.send(SessionCommand::Shutdown).await
    }

    /// A toggle handler bound to this session.
    #[must_use]
    pub fn toggle_handler(&self) -> ToggleHandler {
        ToggleHandler::new(self.commands.clone())
    }

    /// Watch session snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    async fn send(&self, command: SessionCommand) -> AppResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::SessionClosed)
    }
}

/// The feed controller for one page.
pub struct StreamSession {
    state: StreamState,
    stop_cause: Option<StopCause>,
    camera: CameraStatus,
    rate: FrameRate,
    timings: SessionTimings,
    source: FrameSource,
    frame_timer: RepeatingTimer,
    watcher: RecoveryWatcher,
    listeners: ListenerRegistry,
    probe: Arc<dyn FrameProbe>,
    control: ControlDispatcher,
    control_worker: JoinHandle<()>,
    ui: Box<dyn UiBinding>,
    handler: ToggleHandler,
    commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("state", &self.state)
            .field("stop_cause", &self.stop_cause)
            .field("camera", &self.camera)
            .field("rate", &self.rate)
            .field("source", &self.source.original().as_str())
            .field("registrations", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl StreamSession {
    /// Build a session around its collaborators.
    ///
    /// The session is created idle (stopped, nothing armed, nothing sent);
    /// [`run`](Self::run) enters `Running` before handling any event. Must be
    /// called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidFrameSource`] if the UI's frame
    /// reference is not an absolute URL.
    pub fn new(
        probe: Arc<dyn FrameProbe>,
        control: Arc<dyn RemoteControlClient>,
        ui: Box<dyn UiBinding>,
        rate: FrameRate,
        timings: SessionTimings,
    ) -> AppResult<(Self, SessionHandle)> {
        let source = FrameSource::parse(&ui.frame_source())?;
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (control, control_worker) = ControlDispatcher::spawn(control);

        let initial = SessionSnapshot {
            state: StreamState::Stopped,
            camera: CameraStatus::OFF,
            stop_cause: None,
            registrations: 0,
            frame_timer_armed: false,
            recovery_armed: false,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);

        let session = Self {
            state: StreamState::Stopped,
            stop_cause: None,
            camera: CameraStatus::OFF,
            rate,
            timings,
            source,
            frame_timer: RepeatingTimer::new(),
            watcher: RecoveryWatcher::new(),
            listeners: ListenerRegistry::new(),
            probe,
            control,
            control_worker,
            ui,
            handler: ToggleHandler::new(command_tx.clone()),
            commands: command_rx,
            snapshots: snapshot_tx,
        };
        let handle = SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        Ok((session, handle))
    }

    /// Current play/pause state.
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Camera status as last set locally (and dispatched).
    #[must_use]
    pub fn camera(&self) -> CameraStatus {
        self.camera
    }

    /// Current state as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            camera: self.camera,
            stop_cause: self.stop_cause,
            registrations: self.listeners.len(),
            frame_timer_armed: self.frame_timer.is_armed(),
            recovery_armed: self.watcher.is_armed(),
        }
    }

    /// Enter `Running`. No-op if already running.
    pub fn start(&mut self) {
        if self.state == StreamState::Running {
            return;
        }
        self.state = StreamState::Running;
        self.stop_cause = None;

        self.camera = CameraStatus::ON;
        self.control.dispatch(self.camera);
        self.ui.set_indicator(IndicatorState::Playing);

        // The two timers are never armed together.
        self.watcher.disarm();
        self.frame_timer.arm(self.rate.period());

        // Already attached after a user pause; the registry skips those.
        self.listeners.attach_all(self.ui.as_mut(), &self.handler);

        tracing::info!(
            state = %self.state,
            period_ms = self.rate.period().as_millis() as u64,
            "Stream started"
        );
        self.publish();
    }

    /// Enter `Stopped`. No-op if already stopped, whatever the cause.
    pub fn stop(&mut self, cause: StopCause) {
        if self.state == StreamState::Stopped {
            return;
        }
        self.state = StreamState::Stopped;
        self.stop_cause = Some(cause);

        if cause == StopCause::Outage {
            self.listeners.detach_all(self.ui.as_mut());
        }

        self.camera = CameraStatus::OFF;
        self.control.dispatch(self.camera);
        self.ui.set_indicator(IndicatorState::Paused);

        self.frame_timer.disarm();
        if cause == StopCause::Outage {
            self.watcher.arm(self.timings.recovery_interval);
        }

        tracing::info!(state = %self.state, ?cause, "Stream stopped");
        self.publish();
    }

    /// Flip the camera status and run the matching transition.
    ///
    /// Turning the camera off here is a user pause.
    pub fn toggle(&mut self) {
        if self.camera.flipped().is_on {
            self.start();
        } else {
            self.stop(StopCause::Paused);
        }
    }

    /// Handle one frame tick: probe a fresh frame URL, then swap it in.
    ///
    /// An unreachable frame leaves the element untouched and stops the
    /// session. Does nothing unless running.
    pub async fn refresh_frame(&mut self) -> Option<ProbeOutcome> {
        if self.state != StreamState::Running {
            return None;
        }

        let next = self.source.next_cache_busted();
        let outcome = self.probe.probe(next.as_str(), self.timings.probe_budget).await;
        match outcome {
            ProbeOutcome::Reachable => self.ui.set_frame_source(next.as_str()),
            ProbeOutcome::Unreachable => {
                tracing::warn!(url = %self.source.original(), "Frame unreachable, pausing feed");
                self.stop(StopCause::Outage);
            }
        }
        Some(outcome)
    }

    /// Handle one recovery tick. Restarts the feed if the backend is back.
    pub async fn check_recovery(&mut self) -> RecoveryVerdict {
        let running = self.state == StreamState::Running;
        let verdict = self
            .watcher
            .check(
                self.probe.as_ref(),
                self.source.original(),
                self.timings.probe_budget,
                running,
            )
            .await;

        if verdict == RecoveryVerdict::Recovered {
            self.start();
        } else if verdict == RecoveryVerdict::Ignored {
            // The watcher may have disarmed itself.
            self.publish();
        }
        verdict
    }

    /// Run the session until [`SessionHandle::shutdown`].
    ///
    /// Enters `Running` first, then handles toggles, frame ticks and
    /// recovery ticks strictly one at a time.
    pub async fn run(mut self) {
        self.start();

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Toggle) => self.toggle(),
                    Some(SessionCommand::Shutdown) | None => break,
                },
                () = self.frame_timer.tick() => {
                    self.refresh_frame().await;
                }
                () = self.watcher.tick() => {
                    self.check_recovery().await;
                }
            }
        }

        self.shutdown().await;
    }

    async fn shutdown(self) {
        let Self {
            mut frame_timer,
            mut watcher,
            mut listeners,
            mut ui,
            control,
            control_worker,
            ..
        } = self;

        frame_timer.disarm();
        watcher.disarm();
        listeners.detach_all(ui.as_mut());

        // Let queued control sends finish before returning.
        drop(control);
        if let Err(e) = control_worker.await {
            tracing::warn!(error = %e, "Control worker ended abnormally");
        }
        tracing::info!("Stream session shut down");
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}
