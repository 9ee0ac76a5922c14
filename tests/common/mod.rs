//! Shared fakes for the session integration tests.
//!
//! - [`ScriptedProbe`]: plays back a queue of outcomes, then a default
//! - [`RecordingControl`]: remembers every camera status it was sent,
//!   optionally failing each send
//! - [`FakePage`]: a page with a frame element, an indicator and two
//!   toggle targets, observable from the test

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use camfeed::stream::{
    CameraStatus, EventKind, FrameProbe, FrameRate, IndicatorState, ProbeOutcome, SessionHandle,
    SessionTimings, StreamSession, TargetHandle,
};
use camfeed::{RemoteControlClient, ToggleHandler, UiBinding};

pub const FRAME_URL: &str = "http://127.0.0.1:5000/static/img/cam.jpg";

// =============================================================================
// Probe
// =============================================================================

#[derive(Default)]
struct ProbeScript {
    queue: VecDeque<ProbeOutcome>,
    fallback: Option<ProbeOutcome>,
    calls: Vec<String>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Probe that answers from a script.
///
/// Each call pops the next queued outcome, or returns the fallback once the
/// queue is empty. An optional latency is applied inside the probe budget.
pub struct ScriptedProbe {
    script: Mutex<ProbeScript>,
    latency: Duration,
}

impl ScriptedProbe {
    pub fn new(fallback: ProbeOutcome) -> Arc<Self> {
        Self::with_latency(fallback, Duration::ZERO)
    }

    pub fn with_latency(fallback: ProbeOutcome, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(ProbeScript {
                fallback: Some(fallback),
                ..Default::default()
            }),
            latency,
        })
    }

    pub fn push(&self, outcomes: &[ProbeOutcome]) {
        self.script.lock().unwrap().queue.extend(outcomes.iter().copied());
    }

    pub fn set_fallback(&self, outcome: ProbeOutcome) {
        self.script.lock().unwrap().fallback = Some(outcome);
    }

    /// URLs probed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.script.lock().unwrap().max_in_flight
    }
}

#[async_trait]
impl FrameProbe for ScriptedProbe {
    async fn probe(&self, url: &str, budget: Duration) -> ProbeOutcome {
        let outcome = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(url.to_string());
            script.in_flight += 1;
            script.max_in_flight = script.max_in_flight.max(script.in_flight);
            script
                .queue
                .pop_front()
                .or(script.fallback)
                .unwrap_or(ProbeOutcome::Unreachable)
        };

        let outcome = if self.latency > budget {
            tokio::time::sleep(budget).await;
            ProbeOutcome::Unreachable
        } else {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            outcome
        };

        self.script.lock().unwrap().in_flight -= 1;
        outcome
    }
}

// =============================================================================
// Control
// =============================================================================

#[derive(Default)]
pub struct RecordingControl {
    sent: Mutex<Vec<bool>>,
    fail: bool,
}

impl RecordingControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A control client whose every send errors after being recorded.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    /// `is_on` values in delivery order, failed attempts included.
    pub fn sent(&self) -> Vec<bool> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteControlClient for RecordingControl {
    async fn send_camera(&self, status: CameraStatus) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(status.is_on);
        if self.fail {
            anyhow::bail!("backend rejected camera status");
        }
        Ok(())
    }
}

// =============================================================================
// UI
// =============================================================================

#[derive(Default)]
pub struct PageState {
    pub frame: String,
    pub swaps: usize,
    pub indicator: Option<IndicatorState>,
    pub attached: Vec<(EventKind, TargetHandle, ToggleHandler)>,
    pub attach_calls: usize,
    pub detach_calls: usize,
}

/// A page whose state the test can inspect while the session owns the
/// binding.
#[derive(Clone)]
pub struct FakePage(Arc<Mutex<PageState>>);

impl FakePage {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(PageState {
            frame: FRAME_URL.to_string(),
            ..Default::default()
        })))
    }

    pub fn targets() -> Vec<(EventKind, TargetHandle)> {
        vec![
            (EventKind::Click, TargetHandle::new("play-button")),
            (EventKind::Touch, TargetHandle::new("play-button")),
        ]
    }

    pub fn binding(&self) -> Box<dyn UiBinding> {
        Box::new(self.clone())
    }

    pub fn frame(&self) -> String {
        self.0.lock().unwrap().frame.clone()
    }

    pub fn swaps(&self) -> usize {
        self.0.lock().unwrap().swaps
    }

    pub fn indicator(&self) -> Option<IndicatorState> {
        self.0.lock().unwrap().indicator
    }

    pub fn attached(&self) -> Vec<(EventKind, TargetHandle)> {
        self.0
            .lock()
            .unwrap()
            .attached
            .iter()
            .map(|(k, t, _)| (*k, t.clone()))
            .collect()
    }

    pub fn attach_calls(&self) -> usize {
        self.0.lock().unwrap().attach_calls
    }

    pub fn detach_calls(&self) -> usize {
        self.0.lock().unwrap().detach_calls
    }

    /// Click the first attached target. Returns false if nothing is attached.
    pub fn click(&self) -> bool {
        let handler = self
            .0
            .lock()
            .unwrap()
            .attached
            .first()
            .map(|(_, _, h)| h.clone());
        match handler {
            Some(handler) => {
                handler.fire();
                true
            }
            None => false,
        }
    }
}

impl UiBinding for FakePage {
    fn frame_source(&self) -> String {
        self.frame()
    }

    fn set_frame_source(&mut self, url: &str) {
        let mut page = self.0.lock().unwrap();
        page.frame = url.to_string();
        page.swaps += 1;
    }

    fn set_indicator(&mut self, state: IndicatorState) {
        self.0.lock().unwrap().indicator = Some(state);
    }

    fn toggle_targets(&self) -> Vec<(EventKind, TargetHandle)> {
        Self::targets()
    }

    fn attach(&mut self, kind: EventKind, target: &TargetHandle, handler: ToggleHandler) {
        let mut page = self.0.lock().unwrap();
        page.attach_calls += 1;
        page.attached.push((kind, target.clone(), handler));
    }

    fn detach(&mut self, kind: EventKind, target: &TargetHandle) {
        let mut page = self.0.lock().unwrap();
        page.detach_calls += 1;
        page.attached.retain(|(k, t, _)| !(*k == kind && t == target));
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub session: StreamSession,
    pub handle: SessionHandle,
    pub probe: Arc<ScriptedProbe>,
    pub control: Arc<RecordingControl>,
    pub page: FakePage,
}

/// A 10 fps session with default timings.
pub fn harness(probe: Arc<ScriptedProbe>) -> Harness {
    harness_with_control(probe, RecordingControl::new())
}

/// Same as [`harness`] with a chosen control client.
pub fn harness_with_control(probe: Arc<ScriptedProbe>, control: Arc<RecordingControl>) -> Harness {
    let page = FakePage::new();
    let (session, handle) = StreamSession::new(
        probe.clone(),
        control.clone(),
        page.binding(),
        FrameRate::new(10.0).unwrap(),
        SessionTimings::default(),
    )
    .unwrap();
    Harness {
        session,
        handle,
        probe,
        control,
        page,
    }
}

/// Let spawned tasks (control worker, session loop) catch up without
/// advancing the clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
