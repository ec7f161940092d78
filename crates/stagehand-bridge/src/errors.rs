use crate::dispatcher::SessionState;
use crate::event::ProgressPhase;
use thiserror::Error;

/// Errors that can occur during session bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Runtime initialization failed with status {code}")]
    Initialization { code: i32 },

    #[error("Session bridge was already started")]
    AlreadyStarted,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Runtime protocol violation: {0}")]
    ProtocolViolation(#[from] ProtocolViolation),

    #[error("Runtime returned before the session was loaded (last phase: {})", describe_last(.last))]
    Incomplete { last: Option<ProgressPhase> },
}

impl BridgeError {
    /// Process exit code to report for this error.
    ///
    /// Initialization failures carry the runtime's own status through; a
    /// runtime that returned 0 without ever calling back still maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BridgeError::Initialization { code } if *code != 0 => *code,
            BridgeError::InvalidArgument(_) => 2,
            _ => 1,
        }
    }
}

fn describe_last(last: &Option<ProgressPhase>) -> String {
    match last {
        Some(phase) => phase.to_string(),
        None => "none".to_string(),
    }
}

/// A notification that does not fit the open-session protocol.
///
/// These indicate version skew between host and runtime and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("unknown status discriminant {0}")]
    UnknownStatus(u32),

    #[error("LoadPlugin notification without payload")]
    MissingPayload,

    #[error("LoadPlugin payload has a null name with length {len}")]
    NullPluginName { len: usize },

    #[error("LoadPlugin payload name length {len} exceeds the addressable range")]
    PluginNameTooLong { len: usize },

    #[error("init callback received a null session handle")]
    NullHandle,

    #[error("unexpected {found} while {state}")]
    UnexpectedPhase {
        state: SessionState,
        found: ProgressPhase,
    },

    #[error("plugin index {found} out of order (expected {expected})")]
    PluginIndex { expected: usize, found: usize },

    #[error("plugin count changed from {expected} to {found} within one burst")]
    PluginCountChanged { expected: usize, found: usize },

    #[error("plugin index {index} is not below plugin count {count}")]
    PluginIndexOutOfRange { index: usize, count: usize },

    #[error("plugin burst ended after {loaded} of {count} plugins")]
    PluginBurstIncomplete { loaded: usize, count: usize },

    #[error("{0} received after Loaded")]
    AfterLoaded(ProgressPhase),

    #[error("init callback invoked more than once")]
    DuplicateInit,
}
