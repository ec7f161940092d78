//! Progress sinks
//!
//! The dispatcher only produces events. What happens to them (logging,
//! rendering, collecting) is up to the [`ProgressSink`] the host injects.

use crate::event::{OwnedProgressEvent, ProgressEvent, ProgressPhase};
use parking_lot::Mutex;

/// Receives typed progress events.
///
/// Called synchronously on whatever thread the runtime reports from, so
/// implementations must be `Sync`. The event borrows runtime memory; copy
/// anything that has to outlive the call.
pub trait ProgressSink: Sync {
    fn on_event(&self, event: ProgressEvent<'_>);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent<'_>) + Sync,
{
    fn on_event(&self, event: ProgressEvent<'_>) {
        self(event);
    }
}

/// Collects owned copies of every event.
#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<OwnedProgressEvent>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OwnedProgressEvent> {
        self.events.lock().clone()
    }

    pub fn phases(&self) -> Vec<ProgressPhase> {
        self.events.lock().iter().map(OwnedProgressEvent::phase).collect()
    }

    pub fn into_events(self) -> Vec<OwnedProgressEvent> {
        self.events.into_inner()
    }
}

impl ProgressSink for Recorder {
    fn on_event(&self, event: ProgressEvent<'_>) {
        self.events.lock().push(event.into_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::PluginLoad;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_is_a_sink() {
        let seen = AtomicUsize::new(0);
        let sink = |_event: ProgressEvent<'_>| {
            seen.fetch_add(1, Ordering::SeqCst);
        };
        sink.on_event(ProgressEvent::LoadSettings);
        sink.on_event(ProgressEvent::Loaded);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_recorder_keeps_owned_copies() {
        let recorder = Recorder::new();
        {
            let name = String::from("htmlpage");
            recorder.on_event(ProgressEvent::LoadPlugin(PluginLoad::new(
                name.as_bytes(),
                0,
                1,
            )));
        }
        recorder.on_event(ProgressEvent::Loaded);
        let events = recorder.into_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].plugin().map(|p| p.name.as_str()), Some("htmlpage"));
        assert_eq!(events[1], OwnedProgressEvent::Loaded);
    }
}
