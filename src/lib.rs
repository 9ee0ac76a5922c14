//! # camfeed
//!
//! Controller for a refresh-loop camera feed: a remotely hosted still image
//! re-fetched at a fixed frame rate, with play/pause, a remote camera on/off
//! flag kept in step with the local state, and automatic recovery after the
//! backend goes away.
//!
//! ## Crate Structure
//!
//! - **`stream`**: The session state machine, frame probe trait, timers,
//!   recovery watcher and listener bookkeeping.
//! - **`control`**: The `RemoteControlClient` trait and the fire-and-forget
//!   dispatcher in front of it.
//! - **`ui`**: The `UiBinding` capabilities the session drives, the toggle
//!   handler, and the terminal binding used by the binary.
//! - **`backend`**: HTTP implementation of the probe and control traits on
//!   top of `camfeed-client`.
//! - **`config`**: Figment-based configuration (TOML file + `CAMFEED_`
//!   environment variables).
//! - **`logging`**: `tracing-subscriber` setup.
//! - **`error`**: The `SessionError` enum for startup failures.

pub mod backend;
pub mod config;
pub mod control;
pub mod error;
pub mod logging;
pub mod stream;
pub mod ui;

pub use backend::HttpBackend;
pub use control::{ControlDispatcher, RemoteControlClient};
pub use error::{AppResult, SessionError};
pub use stream::{
    FrameProbe, FrameRate, ProbeOutcome, SessionHandle, SessionSnapshot, SessionTimings,
    StreamSession, StreamState,
};
pub use ui::{HeadlessUi, ToggleHandler, UiBinding};
