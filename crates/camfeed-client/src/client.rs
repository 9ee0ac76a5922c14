//! HTTP client for the camera page backend.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::connection::PageAddress;
use crate::error::{ClientError, Result};
use crate::packet::{ControlPacket, StreamSettings};

/// Default cap on a frame body.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// HTTP timeout configuration.
///
/// Frame probes carry their own, tighter budget; these bound every other
/// request so a wedged backend cannot hang the caller.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout (how long to wait for the TCP/TLS handshake)
    pub connect_timeout: Duration,
    /// Request timeout (whole request including body)
    pub request_timeout: Duration,
    /// Largest frame body read before the download is abandoned
    pub max_frame_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl HttpConfig {
    /// Fast configuration for a robot on the local network.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(3),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

/// A fully downloaded frame.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    /// `Content-Type` header, if the server sent one
    pub content_type: Option<String>,
    /// Body length in bytes
    pub len: usize,
}

impl FrameInfo {
    /// Returns true if the response could be rendered as an image.
    ///
    /// A missing content type is accepted; many embedded servers omit it.
    #[must_use]
    pub fn looks_like_image(&self) -> bool {
        self.len > 0
            && self
                .content_type
                .as_deref()
                .map_or(true, |ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
    }
}

/// HTTP client bound to one page address.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    address: PageAddress,
    max_frame_bytes: usize,
}

impl FeedClient {
    /// Build a client for the given page with default timeouts.
    pub fn new(address: PageAddress) -> Result<Self> {
        Self::with_config(address, HttpConfig::default())
    }

    /// Build a client with custom timeouts.
    pub fn with_config(address: PageAddress, config: HttpConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            address,
            max_frame_bytes: config.max_frame_bytes,
        })
    }

    /// The page this client talks to.
    #[must_use]
    pub fn address(&self) -> &PageAddress {
        &self.address
    }

    /// Resolve a path relative to the page.
    pub fn join(&self, reference: &str) -> Result<Url> {
        Ok(self.address.join(reference)?)
    }

    /// GET the stream settings document.
    pub async fn fetch_settings(&self, settings_path: &str) -> Result<StreamSettings> {
        let url = self.join(settings_path)?;
        tracing::debug!(url = %url, "Fetching stream settings");

        let response = self.http.get(url.clone()).send().await?;
        let response = check_status(&url, response)?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// POST a control packet to the page's own path.
    ///
    /// Returns the backend's JSON reply, or `Null` if the body was empty or
    /// not JSON.
    pub async fn post_control(&self, packet: &ControlPacket) -> Result<serde_json::Value> {
        let url = self.address.url().clone();
        let response = self.http.post(url.clone()).json(packet).send().await?;
        let response = check_status(&url, response)?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
    }

    /// GET a frame and read its body to the end.
    ///
    /// The body is read chunk by chunk and abandoned with
    /// [`ClientError::FrameTooLarge`] once it passes the configured cap,
    /// whether or not the server declared a length.
    pub async fn fetch_frame(&self, url: &str) -> Result<FrameInfo> {
        let url = Url::parse(url)?;
        let response = self.http.get(url.clone()).send().await?;
        let mut response = check_status(&url, response)?;

        let too_large = || ClientError::FrameTooLarge {
            url: url.to_string(),
            limit: self.max_frame_bytes,
        };
        if response
            .content_length()
            .is_some_and(|declared| declared > self.max_frame_bytes as u64)
        {
            return Err(too_large());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut len = 0usize;
        while let Some(chunk) = response.chunk().await? {
            len += chunk.len();
            if len > self.max_frame_bytes {
                return Err(too_large());
            }
        }
        Ok(FrameInfo { content_type, len })
    }
}

fn check_status(url: &Url, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            url: url.to_string(),
            status,
        })
    }
}
