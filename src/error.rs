//! Custom error types for the application.
//!
//! `SessionError` covers everything that can stop the controller from coming
//! up: a bad configuration file, an unusable frame URL, or a backend that
//! cannot tell us its frame rate. Once the session is running nothing is
//! surfaced through this type; probe and control-send failures are folded
//! into the stream state or logged at the boundary where they happen.
//!
//! ## Error Hierarchy
//!
//! - **`Config`**: Wraps `figment` extraction errors (file parse, type mismatch).
//! - **`Configuration`**: Semantic validation failures on an otherwise parseable config.
//! - **`Client`**: Transport errors from `camfeed-client` (settings fetch).
//! - **`InvalidFrameRate`**: The backend's `fps` is missing, non-numeric, or not positive.
//! - **`InvalidFrameSource`**: The UI's frame reference is not a usable URL.
//! - **`SessionClosed`**: A handle was used after the session loop exited.
//! - **`Io`**: Standard I/O failures (runtime construction, stdin).

use camfeed_client::ClientError;
use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, SessionError>;

/// Errors that prevent the feed controller from starting.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("Backend request failed: {0}")]
    Client(#[from] ClientError),

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(String),

    #[error("Invalid frame source '{url}': {reason}")]
    InvalidFrameSource {
        /// The rejected reference
        url: String,
        /// Parser message
        reason: String,
    },

    #[error("Stream session has shut down")]
    SessionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for SessionError {
    fn from(value: figment::Error) -> Self {
        Self::Config(Box::new(value))
    }
}

impl SessionError {
    /// Returns true if retrying the same operation later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Client(e) => e.is_transient(),
            Self::Io(_) => true,
            Self::Config(_)
            | Self::Configuration(_)
            | Self::InvalidFrameRate(_)
            | Self::InvalidFrameSource { .. }
            | Self::SessionClosed => false,
        }
    }
}
