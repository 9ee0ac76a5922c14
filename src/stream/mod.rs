//! Stream lifecycle core.
//!
//! - [`types`]: state, frame rate, probe outcome and frame source values
//! - [`probe`]: the [`FrameProbe`] trait and its timeout helper
//! - [`timer`]: cancellable repeating timer
//! - [`listeners`]: toggle handler registration table
//! - [`recovery`]: outage recovery watcher
//! - [`session`]: the [`StreamSession`] state machine and its handle

pub mod listeners;
pub mod probe;
pub mod recovery;
pub mod session;
pub mod timer;
pub mod types;

pub use listeners::ListenerRegistry;
pub use probe::{probe_within, FrameProbe};
pub use recovery::{RecoveryVerdict, RecoveryWatcher, DEFAULT_RECOVERY_INTERVAL};
pub use session::{
    SessionCommand, SessionHandle, SessionSnapshot, SessionTimings, StopCause, StreamSession,
    DEFAULT_PROBE_BUDGET,
};
pub use timer::RepeatingTimer;
pub use types::{
    CameraStatus, EventKind, FrameRate, FrameSource, IndicatorState, ProbeOutcome, StreamState,
    TargetHandle, MAX_FRAME_PERIOD,
};
