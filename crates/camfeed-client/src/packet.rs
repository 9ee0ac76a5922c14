//! JSON documents exchanged with the page backend.
//!
//! The control packet mirrors the shape the backend routes to the device:
//!
//! ```json
//! { "control": { "camera": { "is_on": true } } }
//! ```

use serde::{Deserialize, Serialize};

/// Remote camera on/off flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CameraStatus {
    /// Whether the camera should be streaming
    pub is_on: bool,
}

impl CameraStatus {
    /// Camera switched on.
    pub const ON: Self = Self { is_on: true };
    /// Camera switched off.
    pub const OFF: Self = Self { is_on: false };

    /// Returns the status with the flag flipped.
    #[must_use]
    pub fn flipped(self) -> Self {
        Self { is_on: !self.is_on }
    }
}

/// Control sections understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSection {
    /// Camera subsystem intent
    pub camera: CameraStatus,
}

/// Top-level control packet posted to the page path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPacket {
    /// Control intents
    pub control: ControlSection,
}

impl ControlPacket {
    /// Build a packet carrying only a camera intent.
    #[must_use]
    pub fn camera(status: CameraStatus) -> Self {
        Self {
            control: ControlSection { camera: status },
        }
    }
}

/// Stream settings document served by the backend.
///
/// Only `fps` is read; any other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Frames per second the page should refresh at
    #[serde(default)]
    pub fps: Option<f64>,
}
