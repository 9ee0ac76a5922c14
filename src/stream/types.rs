//! Value types shared by the stream session and its collaborators.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use url::Url;

use crate::error::{AppResult, SessionError};

pub use camfeed_client::CameraStatus;

/// Play/pause state of the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Frames are being refreshed at the configured rate
    Running,
    /// Refresh loop halted; the recovery watcher may be probing
    Stopped,
}

impl StreamState {
    /// Short label for logs and status lines.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a bounded-time reachability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The resource loaded before the budget elapsed
    Reachable,
    /// Error, timeout, or an unusable response
    Unreachable,
}

/// Icon state of the play/pause indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    /// Feed is live
    Playing,
    /// Feed is paused or the backend is down
    Paused,
}

/// Input event a toggle handler can be subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Mouse click or keyboard activation
    Click,
    /// Touch start on touch-screen devices
    Touch,
}

/// Opaque identifier of a UI element that accepts toggle handlers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetHandle(String);

impl TargetHandle {
    /// Wrap an element identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The wrapped identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Longest refresh period a frame rate may ask for.
pub const MAX_FRAME_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Frames per second, validated positive and finite.
///
/// Fetched once at startup; the refresh period is derived from it and never
/// revisited while the session runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRate(f64);

impl FrameRate {
    /// Validate a frame rate.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidFrameRate`] for zero, negative, NaN or
    /// infinite values, and for rates slower than one frame per
    /// [`MAX_FRAME_PERIOD`].
    pub fn new(fps: f64) -> AppResult<Self> {
        if !fps.is_finite() {
            return Err(SessionError::InvalidFrameRate(format!(
                "fps must be a finite number, got {fps}"
            )));
        }
        if fps <= 0.0 {
            return Err(SessionError::InvalidFrameRate(format!(
                "fps must be positive, got {fps}"
            )));
        }
        if 1.0 / fps > MAX_FRAME_PERIOD.as_secs_f64() {
            return Err(SessionError::InvalidFrameRate(format!(
                "fps {fps} gives a refresh period over {}s",
                MAX_FRAME_PERIOD.as_secs()
            )));
        }
        Ok(Self(fps))
    }

    /// Frames per second.
    #[must_use]
    pub fn fps(self) -> f64 {
        self.0
    }

    /// Refresh period, `1 / fps`, rounded to whole nanoseconds.
    #[must_use]
    pub fn period(self) -> Duration {
        // Bounded by MAX_FRAME_PERIOD, so the cast cannot truncate.
        let nanos = (1e9 / self.0).round() as u64;
        // At least 1ns so a huge fps can't produce a zero-period interval.
        Duration::from_nanos(nanos.max(1))
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps", self.0)
    }
}

/// The frame URL and its cache-busting token generator.
#[derive(Debug, Clone)]
pub struct FrameSource {
    original: Url,
    last_token: u64,
}

impl FrameSource {
    /// Parse the frame reference exposed by the UI.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidFrameSource`] if the reference is not
    /// an absolute URL.
    pub fn parse(reference: &str) -> AppResult<Self> {
        let original = Url::parse(reference).map_err(|e| SessionError::InvalidFrameSource {
            url: reference.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            original,
            last_token: 0,
        })
    }

    /// The frame URL as configured, without any token.
    #[must_use]
    pub fn original(&self) -> &Url {
        &self.original
    }

    /// Next frame URL with a `v=<token>` query pair appended.
    ///
    /// Tokens are Unix milliseconds, bumped by one whenever the clock has not
    /// advanced (or went backwards) since the previous call.
    pub fn next_cache_busted(&mut self) -> Url {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        let token = now.max(self.last_token.saturating_add(1));
        self.last_token = token;

        let mut url = self.original.clone();
        url.query_pairs_mut().append_pair("v", &token.to_string());
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_fps_is_a_hundred_millis() {
        let rate = FrameRate::new(10.0).unwrap();
        assert_eq!(rate.period(), Duration::from_millis(100));
    }

    #[test]
    fn fractional_rates_round_to_nanos() {
        let rate = FrameRate::new(3.0).unwrap();
        assert_eq!(rate.period(), Duration::from_nanos(333_333_333));

        let slow = FrameRate::new(0.5).unwrap();
        assert_eq!(slow.period(), Duration::from_secs(2));
    }

    #[test]
    fn rejects_unusable_rates() {
        for fps in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = FrameRate::new(fps).unwrap_err();
            assert!(matches!(err, SessionError::InvalidFrameRate(_)), "{fps}");
        }
    }

    #[test]
    fn rejects_rates_slower_than_a_day_per_frame() {
        for fps in [1e-11, 1e-6] {
            let err = FrameRate::new(fps).unwrap_err();
            assert!(matches!(err, SessionError::InvalidFrameRate(_)), "{fps}");
        }

        let slow = FrameRate::new(0.001).unwrap();
        assert_eq!(slow.period(), Duration::from_secs(1000));
        assert!(slow.period() <= MAX_FRAME_PERIOD);
    }

    #[test]
    fn cache_busted_urls_are_unique_and_keep_query() {
        let mut source = FrameSource::parse("http://rover.local:5000/cam.jpg?size=small").unwrap();

        let first = source.next_cache_busted();
        let second = source.next_cache_busted();
        assert_ne!(first, second);
        assert_eq!(first.path(), "/cam.jpg");

        let pairs: Vec<_> = second.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("size".to_string(), "small".to_string()));
        assert_eq!(pairs[1].0, "v");

        // The original reference is never mutated
        assert_eq!(
            source.original().as_str(),
            "http://rover.local:5000/cam.jpg?size=small"
        );
    }

    #[test]
    fn cache_tokens_strictly_increase() {
        let mut source = FrameSource::parse("http://127.0.0.1:5000/cam.jpg").unwrap();
        let token = |url: &Url| -> u64 {
            url.query_pairs()
                .find(|(k, _)| k == "v")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap()
        };

        let mut previous = token(&source.next_cache_busted());
        for _ in 0..100 {
            let next = token(&source.next_cache_busted());
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn relative_frame_source_is_rejected() {
        let err = FrameSource::parse("static/img/cam.jpg").unwrap_err();
        assert!(matches!(err, SessionError::InvalidFrameSource { .. }));
    }

    #[test]
    fn state_labels() {
        assert_eq!(StreamState::Running.to_string(), "running");
        assert_eq!(StreamState::Stopped.label(), "stopped");
    }
}
