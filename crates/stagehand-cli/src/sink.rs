//! Console rendering of session progress

use stagehand_bridge::{ProgressEvent, ProgressSink};
use stagehand_logger as logger;

/// Human-readable line for one event.
pub fn describe(event: &ProgressEvent<'_>) -> String {
    match event {
        ProgressEvent::LoadSettings => "Loading settings".to_string(),
        ProgressEvent::LoadProfile => "Loading profile".to_string(),
        ProgressEvent::CreateRuntime => "Creating runtime".to_string(),
        ProgressEvent::LoadPlugin(load) => format!("Loading plugin {}", load),
        ProgressEvent::LoadRecords => "Loading records".to_string(),
        ProgressEvent::Loaded => "Session loaded".to_string(),
    }
}

/// Logs each phase and renders the plugin burst as a progress bar.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn on_event(&self, event: ProgressEvent<'_>) {
        let line = describe(&event);
        logger::info(&line);

        match event {
            ProgressEvent::LoadPlugin(load) => {
                if load.index() == 0 {
                    logger::progress_start(load.count() as u64, "plugins");
                }
                logger::progress_update(load.position() as u64, &load.name());
                if load.is_last() {
                    logger::progress_finish();
                }
            }
            ProgressEvent::Loaded => {}
            _ => logger::spinner_message(&line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_bridge::PluginLoad;

    #[test]
    fn test_describe_events() {
        assert_eq!(describe(&ProgressEvent::LoadSettings), "Loading settings");
        assert_eq!(
            describe(&ProgressEvent::LoadPlugin(PluginLoad::new(b"alpha", 0, 2))),
            "Loading plugin alpha (1/2)"
        );
        assert_eq!(describe(&ProgressEvent::Loaded), "Session loaded");
    }
}
