//! HTTP adapter connecting the stream core to a real page backend.
//!
//! [`HttpBackend`] implements both collaborator traits on top of
//! [`camfeed_client::FeedClient`]: frame probes are full GETs of the frame
//! image raced against the probe budget, and camera status changes are
//! posted as control packets to the page path.

use std::time::Duration;

use async_trait::async_trait;
use camfeed_client::{ControlPacket, FeedClient};

use crate::control::RemoteControlClient;
use crate::error::{AppResult, SessionError};
use crate::stream::{probe_within, CameraStatus, FrameProbe, FrameRate, ProbeOutcome};

/// Page backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: FeedClient,
}

impl HttpBackend {
    /// Wrap a configured client.
    #[must_use]
    pub fn new(client: FeedClient) -> Self {
        Self { client }
    }

    /// Fetch the settings document and validate its frame rate.
    ///
    /// # Errors
    ///
    /// Any failure here is fatal to startup: the request fails, the body is
    /// not JSON, `fps` is absent or null, or it is not a positive number.
    pub async fn frame_rate(&self, settings_path: &str) -> AppResult<FrameRate> {
        let settings = self.client.fetch_settings(settings_path).await?;
        let fps = settings.fps.ok_or_else(|| {
            SessionError::InvalidFrameRate(format!(
                "settings document at '{settings_path}' has no numeric `fps` field"
            ))
        })?;
        let rate = FrameRate::new(fps)?;
        tracing::info!(fps = rate.fps(), "Frame rate loaded from backend");
        Ok(rate)
    }
}

#[async_trait]
impl FrameProbe for HttpBackend {
    async fn probe(&self, url: &str, budget: Duration) -> ProbeOutcome {
        probe_within(budget, async {
            let frame = self.client.fetch_frame(url).await?;
            anyhow::ensure!(
                frame.looks_like_image(),
                "not an image (content type {:?}, {} bytes)",
                frame.content_type,
                frame.len
            );
            Ok::<(), anyhow::Error>(())
        })
        .await
    }
}

#[async_trait]
impl RemoteControlClient for HttpBackend {
    async fn send_camera(&self, status: CameraStatus) -> anyhow::Result<()> {
        let reply = self.client.post_control(&ControlPacket::camera(status)).await?;
        tracing::debug!(is_on = status.is_on, reply = %reply, "Backend acknowledged camera status");
        Ok(())
    }
}
