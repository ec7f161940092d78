//! Typed progress events
//!
//! A [`ProgressEvent`] borrows its payload from the runtime and cannot outlive
//! the dispatch call that produced it. Use [`ProgressEvent::into_owned`] to keep
//! the data around.

use crate::plugins::{OwnedPluginLoad, PluginLoad};
use stagehand_abi::StatusCode;
use std::fmt;

/// One named stage of the open-session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressPhase {
    LoadSettings,
    LoadProfile,
    CreateRuntime,
    LoadPlugin,
    LoadRecords,
    Loaded,
}

impl ProgressPhase {
    /// Maps a raw discriminant, `None` for values this bridge does not know.
    pub fn from_status(code: StatusCode) -> Option<Self> {
        match code {
            StatusCode::LOAD_SETTINGS => Some(Self::LoadSettings),
            StatusCode::LOAD_PROFILE => Some(Self::LoadProfile),
            StatusCode::CREATE_RUNTIME => Some(Self::CreateRuntime),
            StatusCode::LOAD_PLUGIN => Some(Self::LoadPlugin),
            StatusCode::LOAD_RECORDS => Some(Self::LoadRecords),
            StatusCode::LOADED => Some(Self::Loaded),
            _ => None,
        }
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            Self::LoadSettings => StatusCode::LOAD_SETTINGS,
            Self::LoadProfile => StatusCode::LOAD_PROFILE,
            Self::CreateRuntime => StatusCode::CREATE_RUNTIME,
            Self::LoadPlugin => StatusCode::LOAD_PLUGIN,
            Self::LoadRecords => StatusCode::LOAD_RECORDS,
            Self::Loaded => StatusCode::LOADED,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadSettings => "LoadSettings",
            Self::LoadProfile => "LoadProfile",
            Self::CreateRuntime => "CreateRuntime",
            Self::LoadPlugin => "LoadPlugin",
            Self::LoadRecords => "LoadRecords",
            Self::Loaded => "Loaded",
        }
    }
}

impl fmt::Display for ProgressPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent<'a> {
    LoadSettings,
    LoadProfile,
    CreateRuntime,
    LoadPlugin(PluginLoad<'a>),
    LoadRecords,
    Loaded,
}

impl<'a> ProgressEvent<'a> {
    pub fn phase(&self) -> ProgressPhase {
        match self {
            Self::LoadSettings => ProgressPhase::LoadSettings,
            Self::LoadProfile => ProgressPhase::LoadProfile,
            Self::CreateRuntime => ProgressPhase::CreateRuntime,
            Self::LoadPlugin(_) => ProgressPhase::LoadPlugin,
            Self::LoadRecords => ProgressPhase::LoadRecords,
            Self::Loaded => ProgressPhase::Loaded,
        }
    }

    pub fn plugin(&self) -> Option<&PluginLoad<'a>> {
        match self {
            Self::LoadPlugin(load) => Some(load),
            _ => None,
        }
    }

    /// Copies the borrowed payload out of runtime memory.
    pub fn into_owned(self) -> OwnedProgressEvent {
        match self {
            Self::LoadSettings => OwnedProgressEvent::LoadSettings,
            Self::LoadProfile => OwnedProgressEvent::LoadProfile,
            Self::CreateRuntime => OwnedProgressEvent::CreateRuntime,
            Self::LoadPlugin(load) => OwnedProgressEvent::LoadPlugin(load.into_owned()),
            Self::LoadRecords => OwnedProgressEvent::LoadRecords,
            Self::Loaded => OwnedProgressEvent::Loaded,
        }
    }
}

impl fmt::Display for ProgressEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadPlugin(load) => write!(f, "{} {}", self.phase(), load),
            _ => write!(f, "{}", self.phase()),
        }
    }
}

/// [`ProgressEvent`] with its payload copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedProgressEvent {
    LoadSettings,
    LoadProfile,
    CreateRuntime,
    LoadPlugin(OwnedPluginLoad),
    LoadRecords,
    Loaded,
}

impl OwnedProgressEvent {
    pub fn phase(&self) -> ProgressPhase {
        match self {
            Self::LoadSettings => ProgressPhase::LoadSettings,
            Self::LoadProfile => ProgressPhase::LoadProfile,
            Self::CreateRuntime => ProgressPhase::CreateRuntime,
            Self::LoadPlugin(_) => ProgressPhase::LoadPlugin,
            Self::LoadRecords => ProgressPhase::LoadRecords,
            Self::Loaded => ProgressPhase::Loaded,
        }
    }

    pub fn plugin(&self) -> Option<&OwnedPluginLoad> {
        match self {
            Self::LoadPlugin(load) => Some(load),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_status_codes_match_abi() {
        for code in StatusCode::ALL {
            let phase = ProgressPhase::from_status(code).expect("known status");
            assert_eq!(phase.status_code(), code);
        }
        assert_eq!(ProgressPhase::from_status(StatusCode(99)), None);
    }

    #[test]
    fn test_plugin_event_display() {
        let event = ProgressEvent::LoadPlugin(PluginLoad::new(b"timer", 1, 3));
        assert_eq!(event.to_string(), "LoadPlugin timer (2/3)");
        assert_eq!(ProgressEvent::Loaded.to_string(), "Loaded");
    }

    #[test]
    fn test_into_owned_copies_plugin_name() {
        let name = b"random".to_vec();
        let owned = ProgressEvent::LoadPlugin(PluginLoad::new(&name, 0, 1)).into_owned();
        drop(name);
        let plugin = owned.plugin().expect("plugin payload");
        assert_eq!(plugin.name, "random");
        assert_eq!(owned.phase(), ProgressPhase::LoadPlugin);
    }
}
