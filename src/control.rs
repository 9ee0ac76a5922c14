//! Remote camera on/off control.
//!
//! The session never waits on the backend to acknowledge a control packet.
//! Sends are handed to a [`ControlDispatcher`], whose worker task delivers
//! them one after another in the order the session changed state. A failed
//! send is logged and dropped; outage recovery is the watcher's job.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::stream::CameraStatus;

/// Sends the camera on/off intent to the backend.
#[async_trait]
pub trait RemoteControlClient: Send + Sync {
    /// Deliver `status` to the backend.
    async fn send_camera(&self, status: CameraStatus) -> anyhow::Result<()>;
}

/// Fire-and-forget front end for a [`RemoteControlClient`].
///
/// Each dispatched status is a copy taken at the moment of the transition,
/// so later state changes cannot alter a send already in flight.
#[derive(Debug, Clone)]
pub struct ControlDispatcher {
    tx: mpsc::UnboundedSender<CameraStatus>,
}

impl ControlDispatcher {
    /// Spawn the delivery worker on the current runtime.
    ///
    /// The worker exits once every dispatcher clone has been dropped and the
    /// queue is drained.
    pub fn spawn(client: Arc<dyn RemoteControlClient>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(deliver(client, rx));
        (Self { tx }, worker)
    }

    /// Queue `status` for delivery. Never blocks.
    pub fn dispatch(&self, status: CameraStatus) {
        if self.tx.send(status).is_err() {
            tracing::warn!(is_on = status.is_on, "Control worker gone, camera status not sent");
        }
    }
}

async fn deliver(client: Arc<dyn RemoteControlClient>, mut rx: mpsc::UnboundedReceiver<CameraStatus>) {
    while let Some(status) = rx.recv().await {
        match client.send_camera(status).await {
            Ok(()) => tracing::debug!(is_on = status.is_on, "Camera status sent"),
            Err(e) => tracing::warn!(is_on = status.is_on, error = %e, "Camera status send failed"),
        }
    }
    tracing::debug!("Control worker stopped");
}
