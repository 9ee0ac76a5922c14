//! HTTP transport for the camfeed controller.
//!
//! This crate talks to the web page backend that fronts the robot's camera:
//! it normalizes the page address, fetches the stream settings document and
//! frames, and posts control packets. It knows nothing about play/pause state
//! or recovery; that lives in the `camfeed` crate.

pub mod client;
pub mod connection;
pub mod error;
pub mod packet;

pub use client::{FeedClient, FrameInfo, HttpConfig, DEFAULT_MAX_FRAME_BYTES};
pub use connection::{
    normalize_url, resolve_address, AddressError, AddressSource, PageAddress, DEFAULT_PAGE_URL,
    PAGE_URL_ENV,
};
pub use error::{ClientError, Result};
pub use packet::{CameraStatus, ControlPacket, ControlSection, StreamSettings};
