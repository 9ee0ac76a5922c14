//! Client error types.

use thiserror::Error;

use crate::connection::AddressError;

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the camera page backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Invalid URL format.
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The configured page address was rejected.
    #[error("Invalid page address: {0}")]
    Address(#[from] AddressError),

    /// HTTP transport error (connection refused, timeout, TLS error, etc.).
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status code.
    #[error("'{url}' answered {status}")]
    Status {
        /// URL that was requested
        url: String,
        /// Status code returned by the backend
        status: reqwest::StatusCode,
    },

    /// Frame body grew past the configured cap.
    #[error("Frame at '{url}' exceeds {limit} bytes")]
    FrameTooLarge {
        /// URL that was requested
        url: String,
        /// Cap that was exceeded
        limit: usize,
    },

    /// Response body was not the JSON document we expected.
    #[error("Malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Returns true if the failure came from the network rather than from bad input.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status { status, .. } => status.is_server_error(),
            Self::UrlParse(_) | Self::Address(_) | Self::Json(_) | Self::FrameTooLarge { .. } => {
                false
            }
        }
    }
}
