//! Progress dispatch for one open-session operation
//!
//! The runtime calls [`status_trampoline`] with a raw discriminant and an
//! untyped payload. The dispatcher decodes that pair once into a
//! [`ProgressEvent`], checks it against the session state machine and hands it
//! to the host's sink before returning control to the runtime.
//!
//! The first notification that does not fit the protocol halts the operation:
//! it is not forwarded, later notifications are dropped, and the violation is
//! reported when the runtime returns.

use crate::errors::{BridgeError, ProtocolViolation};
use crate::event::{ProgressEvent, ProgressPhase};
use crate::plugins::{self, PluginBurst};
use crate::sink::ProgressSink;
use parking_lot::Mutex;
use stagehand_abi::StatusCode;
use std::any::Any;
use std::ffi::c_void;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Position in the open-session protocol.
///
/// `Idle → LoadingSettings → LoadingProfile → CreatingRuntime →
/// LoadingPlugins → LoadingRecords → Loaded`, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    LoadingSettings,
    LoadingProfile,
    CreatingRuntime,
    LoadingPlugins(PluginBurst),
    LoadingRecords,
    Loaded,
}

impl SessionState {
    /// Applies one event, returning the next state.
    pub fn advance(self, event: &ProgressEvent<'_>) -> Result<Self, ProtocolViolation> {
        use ProgressEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::Idle, E::LoadSettings) => Ok(S::LoadingSettings),
            (S::LoadingSettings, E::LoadProfile) => Ok(S::LoadingProfile),
            (S::LoadingProfile, E::CreateRuntime) => Ok(S::CreatingRuntime),
            (S::CreatingRuntime, E::LoadPlugin(load)) => {
                Ok(S::LoadingPlugins(PluginBurst::begin(load)?))
            }
            (S::CreatingRuntime, E::LoadRecords) => Ok(S::LoadingRecords),
            (S::LoadingPlugins(mut burst), E::LoadPlugin(load)) => {
                burst.accept(load)?;
                Ok(S::LoadingPlugins(burst))
            }
            (S::LoadingPlugins(burst), E::LoadRecords) => {
                if burst.is_complete() {
                    Ok(S::LoadingRecords)
                } else {
                    Err(ProtocolViolation::PluginBurstIncomplete {
                        loaded: burst.loaded(),
                        count: burst.count(),
                    })
                }
            }
            (S::LoadingRecords, E::Loaded) => Ok(S::Loaded),
            (S::Loaded, event) => Err(ProtocolViolation::AfterLoaded(event.phase())),
            (state, event) => Err(ProtocolViolation::UnexpectedPhase {
                state,
                found: event.phase(),
            }),
        }
    }

    /// The phase of the most recent accepted event.
    pub fn last_phase(&self) -> Option<ProgressPhase> {
        match self {
            Self::Idle => None,
            Self::LoadingSettings => Some(ProgressPhase::LoadSettings),
            Self::LoadingProfile => Some(ProgressPhase::LoadProfile),
            Self::CreatingRuntime => Some(ProgressPhase::CreateRuntime),
            Self::LoadingPlugins(_) => Some(ProgressPhase::LoadPlugin),
            Self::LoadingRecords => Some(ProgressPhase::LoadRecords),
            Self::Loaded => Some(ProgressPhase::Loaded),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::LoadingSettings => f.write_str("loading settings"),
            Self::LoadingProfile => f.write_str("loading profile"),
            Self::CreatingRuntime => f.write_str("creating runtime"),
            Self::LoadingPlugins(burst) => {
                write!(f, "loading plugins ({}/{})", burst.loaded(), burst.count())
            }
            Self::LoadingRecords => f.write_str("loading records"),
            Self::Loaded => f.write_str("loaded"),
        }
    }
}

/// Decodes one raw notification.
///
/// # Safety
///
/// For [`StatusCode::LOAD_PLUGIN`], `payload` must satisfy the contract of
/// [`plugins::decode`] for `'a`. Other discriminants never read `payload`.
pub(crate) unsafe fn decode<'a>(
    code: StatusCode,
    payload: *const c_void,
) -> Result<ProgressEvent<'a>, ProtocolViolation> {
    let Some(phase) = ProgressPhase::from_status(code) else {
        return Err(ProtocolViolation::UnknownStatus(code.0));
    };
    Ok(match phase {
        ProgressPhase::LoadSettings => ProgressEvent::LoadSettings,
        ProgressPhase::LoadProfile => ProgressEvent::LoadProfile,
        ProgressPhase::CreateRuntime => ProgressEvent::CreateRuntime,
        ProgressPhase::LoadPlugin => {
            // SAFETY: forwarded from the caller.
            ProgressEvent::LoadPlugin(unsafe { plugins::decode(payload)? })
        }
        ProgressPhase::LoadRecords => ProgressEvent::LoadRecords,
        ProgressPhase::Loaded => ProgressEvent::Loaded,
    })
}

/// What an open-session operation reported once it reached `Loaded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenSummary {
    /// Plugin names in load order.
    pub plugins: Vec<String>,
}

#[derive(Default)]
struct DispatchState {
    state: SessionState,
    plugins: Vec<String>,
    violation: Option<ProtocolViolation>,
    panic: Option<Box<dyn Any + Send>>,
}

impl DispatchState {
    fn halted(&self) -> bool {
        self.violation.is_some() || self.panic.is_some()
    }
}

/// Per-operation dispatch context; its address is the runtime's `userdata`.
pub(crate) struct Dispatcher<'s> {
    sink: &'s dyn ProgressSink,
    inner: Mutex<DispatchState>,
}

impl<'s> Dispatcher<'s> {
    pub(crate) fn new(sink: &'s dyn ProgressSink) -> Self {
        Self {
            sink,
            inner: Mutex::new(DispatchState::default()),
        }
    }

    /// Handles one notification.
    ///
    /// The state lock is held while the sink runs, so notifications the runtime
    /// sends from several threads still reach the sink one at a time and in the
    /// order they were accepted.
    ///
    /// # Safety
    ///
    /// Same contract as [`decode`].
    pub(crate) unsafe fn dispatch(&self, code: StatusCode, payload: *const c_void) {
        let mut inner = self.inner.lock();
        if inner.halted() {
            return;
        }
        // SAFETY: forwarded from the caller; the event does not outlive this call.
        let decoded = unsafe { decode(code, payload) };
        let event = match decoded.and_then(|event| Ok((inner.state.advance(&event)?, event))) {
            Ok((next, event)) => {
                inner.state = next;
                event
            }
            Err(violation) => {
                inner.violation = Some(violation);
                return;
            }
        };
        if let ProgressEvent::LoadPlugin(load) = &event {
            inner.plugins.push(load.name().into_owned());
        }

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.sink.on_event(event))) {
            inner.panic = Some(payload);
        }
    }

    /// Outcome once the runtime has returned from `open_session`.
    ///
    /// A sink panic is resumed here, on the host's side of the boundary.
    pub(crate) fn finish(self) -> Result<OpenSummary, BridgeError> {
        let inner = self.inner.into_inner();
        if let Some(payload) = inner.panic {
            panic::resume_unwind(payload);
        }
        if let Some(violation) = inner.violation {
            return Err(violation.into());
        }
        if !inner.state.is_terminal() {
            return Err(BridgeError::Incomplete {
                last: inner.state.last_phase(),
            });
        }
        Ok(OpenSummary {
            plugins: inner.plugins,
        })
    }
}

/// [`stagehand_abi::StatusCallback`] handed to the runtime.
///
/// # Safety
///
/// `userdata` must be null or the address of a live [`Dispatcher`], and
/// `payload` must satisfy the contract of [`decode`] for this call.
pub(crate) unsafe extern "C" fn status_trampoline(
    code: StatusCode,
    payload: *const c_void,
    userdata: *mut c_void,
) {
    // SAFETY: the bridge passes the address of a `Dispatcher` that outlives the
    // runtime's `open_session` call, and only shared access is taken.
    let Some(dispatcher) = (unsafe { userdata.cast::<Dispatcher<'_>>().as_ref() }) else {
        return;
    };
    // SAFETY: payload validity is the runtime's half of the contract.
    unsafe { dispatcher.dispatch(code, payload) };
}
