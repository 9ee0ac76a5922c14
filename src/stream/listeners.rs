//! Bookkeeping for the toggle handler's UI subscriptions.

use super::types::{EventKind, TargetHandle};
use crate::ui::{ToggleHandler, UiBinding};

/// Ordered set of `(event kind, target)` pairs the toggle handler is
/// currently attached to. A pair is never stored twice.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    entries: Vec<(EventKind, TargetHandle)>,
}

impl ListenerRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler` to every toggle target the binding exposes.
    ///
    /// Pairs that are already registered are skipped, so repeated calls
    /// never stack duplicate subscriptions. Returns how many were added.
    pub fn attach_all(&mut self, ui: &mut dyn UiBinding, handler: &ToggleHandler) -> usize {
        let mut added = 0;
        for (kind, target) in ui.toggle_targets() {
            if self.contains(kind, &target) {
                continue;
            }
            ui.attach(kind, &target, handler.clone());
            self.entries.push((kind, target));
            added += 1;
        }
        added
    }

    /// Detach exactly the stored pairs, in registration order, and clear.
    /// Returns how many were removed.
    pub fn detach_all(&mut self, ui: &mut dyn UiBinding) -> usize {
        let removed = self.entries.len();
        for (kind, target) in self.entries.drain(..) {
            ui.detach(kind, &target);
        }
        removed
    }

    /// Returns true if `(kind, target)` is registered.
    #[must_use]
    pub fn contains(&self, kind: EventKind, target: &TargetHandle) -> bool {
        self.entries.iter().any(|(k, t)| *k == kind && t == target)
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::types::IndicatorState;

    /// Binding that records attach/detach calls.
    struct Recorder {
        targets: Vec<(EventKind, TargetHandle)>,
        attached: Vec<(EventKind, TargetHandle)>,
        detach_calls: Vec<(EventKind, TargetHandle)>,
    }

    impl Recorder {
        fn with_targets(targets: &[(EventKind, &str)]) -> Self {
            Self {
                targets: targets
                    .iter()
                    .map(|(k, t)| (*k, TargetHandle::new(*t)))
                    .collect(),
                attached: Vec::new(),
                detach_calls: Vec::new(),
            }
        }
    }

    impl UiBinding for Recorder {
        fn frame_source(&self) -> String {
            "http://127.0.0.1:5000/cam.jpg".into()
        }
        fn set_frame_source(&mut self, _url: &str) {}
        fn set_indicator(&mut self, _state: IndicatorState) {}
        fn toggle_targets(&self) -> Vec<(EventKind, TargetHandle)> {
            self.targets.clone()
        }
        fn attach(&mut self, kind: EventKind, target: &TargetHandle, _handler: ToggleHandler) {
            self.attached.push((kind, target.clone()));
        }
        fn detach(&mut self, kind: EventKind, target: &TargetHandle) {
            self.attached.retain(|(k, t)| !(*k == kind && t == target));
            self.detach_calls.push((kind, target.clone()));
        }
    }

    fn handler() -> ToggleHandler {
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        ToggleHandler::new(tx)
    }

    #[test]
    fn attach_twice_does_not_duplicate() {
        let mut ui = Recorder::with_targets(&[
            (EventKind::Click, "play-button"),
            (EventKind::Touch, "play-button"),
            (EventKind::Click, "video"),
        ]);
        let mut registry = ListenerRegistry::new();
        let handler = handler();

        assert_eq!(registry.attach_all(&mut ui, &handler), 3);
        assert_eq!(registry.attach_all(&mut ui, &handler), 0);
        assert_eq!(registry.len(), 3);
        assert_eq!(ui.attached.len(), 3);
    }

    #[test]
    fn detach_removes_exactly_registered_pairs() {
        let mut ui = Recorder::with_targets(&[
            (EventKind::Click, "play-button"),
            (EventKind::Click, "video"),
        ]);
        let mut registry = ListenerRegistry::new();
        registry.attach_all(&mut ui, &handler());

        assert_eq!(registry.detach_all(&mut ui), 2);
        assert!(registry.is_empty());
        assert!(ui.attached.is_empty());
        assert_eq!(
            ui.detach_calls,
            vec![
                (EventKind::Click, TargetHandle::new("play-button")),
                (EventKind::Click, TargetHandle::new("video")),
            ]
        );

        // Second detach is a no-op
        assert_eq!(registry.detach_all(&mut ui), 0);
        assert_eq!(ui.detach_calls.len(), 2);
    }

    #[test]
    fn repeated_targets_from_binding_register_once() {
        let mut ui = Recorder::with_targets(&[
            (EventKind::Click, "video"),
            (EventKind::Click, "video"),
        ]);
        let mut registry = ListenerRegistry::new();
        registry.attach_all(&mut ui, &handler());

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(EventKind::Click, &TargetHandle::new("video")));
        assert!(!registry.contains(EventKind::Touch, &TargetHandle::new("video")));
    }
}
