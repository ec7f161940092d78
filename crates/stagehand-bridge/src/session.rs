//! Runtime initialization and session access
//!
//! This module performs the one-shot `start` call into the runtime and wraps
//! the handle it returns. The host entry point is an ordinary closure; the
//! runtime sees a monomorphized `extern "C"` trampoline with the closure's
//! slot as `userdata`.

use crate::dispatcher::{self, Dispatcher, OpenSummary};
use crate::errors::{BridgeError, ProtocolViolation};
use crate::event::ProgressEvent;
use crate::sink::ProgressSink;
use parking_lot::Mutex;
use stagehand_abi::{Handle, RuntimeApi};
use std::any::Any;
use std::ffi::{c_int, c_void, CString};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

/// Returned to the runtime when the bridge refuses an init callback.
const INIT_REFUSED: c_int = -1;

/// The session bridge for one runtime
///
/// Each bridge starts the runtime at most once, so it produces at most one
/// [`Session`].
pub struct SessionBridge {
    api: RuntimeApi,
    app_id: String,
    started: AtomicBool,
}

impl SessionBridge {
    pub fn new(api: RuntimeApi, app_id: impl Into<String>) -> Self {
        Self {
            api,
            app_id: app_id.into(),
            started: AtomicBool::new(false),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Initialize the runtime and run `entry` with the session
    ///
    /// Blocks until `entry` returns. `Ok` carries the entry point's return
    /// value; `Err(Initialization)` means the runtime never called back and
    /// carries its status.
    ///
    /// A panic inside `entry` is carried across the runtime and resumed here.
    pub fn start<F>(&self, entry: F) -> Result<i32, BridgeError>
    where
        F: FnOnce(&Session) -> i32,
    {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::AlreadyStarted);
        }
        let app_id = CString::new(self.app_id.as_str()).map_err(|_| {
            BridgeError::InvalidArgument(format!(
                "application id '{}' contains a NUL byte",
                self.app_id.escape_debug()
            ))
        })?;

        tracing::debug!("Starting runtime for '{}'", self.app_id);
        let slot = InitSlot::new(entry, self.api);
        // SAFETY: `app_id` is a valid C string and `slot` outlives the call; the
        // runtime only uses both during `start`.
        let status = unsafe {
            (self.api.start)(
                app_id.as_ptr(),
                Some(init_trampoline::<F>),
                ptr::from_ref(&slot).cast_mut().cast(),
            )
        };

        let outcome = slot.into_outcome();
        if let Some(payload) = outcome.panic {
            panic::resume_unwind(payload);
        }
        if let Some(violation) = outcome.violation {
            return Err(violation.into());
        }
        match outcome.calls {
            0 => {
                tracing::debug!("Runtime returned status {} without a session", status);
                Err(BridgeError::Initialization { code: status })
            }
            1 => Ok(status),
            _ => Err(ProtocolViolation::DuplicateInit.into()),
        }
    }
}

/// A live runtime session
///
/// Only reachable by reference from inside [`SessionBridge::start`], so it
/// cannot outlive the init callback. Neither `Send` nor `Sync`: operations on
/// one handle are serialized by construction.
pub struct Session {
    handle: Handle,
    api: RuntimeApi,
}

impl Session {
    /// The raw runtime handle, for passing to other runtime entry points.
    pub fn raw_handle(&self) -> Handle {
        self.handle
    }

    /// Open the session described by `config_path`
    ///
    /// Every progress notification is decoded and handed to `sink` before the
    /// runtime continues. Succeeds only once the runtime reported `Loaded`.
    pub fn open_session<S>(
        &self,
        config_path: impl AsRef<Path>,
        sink: &S,
    ) -> Result<OpenSummary, BridgeError>
    where
        S: ProgressSink + ?Sized,
    {
        let config = config_path_to_cstring(config_path.as_ref())?;
        tracing::debug!("Opening session with {:?}", config);

        let sink = SinkRef(sink);
        let dispatcher = Dispatcher::new(&sink);
        // SAFETY: the handle came from the runtime's init callback that is still
        // running, `config` is a valid C string, and `dispatcher` outlives the call.
        unsafe {
            (self.api.open_session)(
                self.handle,
                config.as_ptr(),
                Some(dispatcher::status_trampoline),
                ptr::from_ref(&dispatcher).cast_mut().cast(),
            );
        }
        let result = dispatcher.finish();
        if let Err(e) = &result {
            tracing::debug!("Session open failed: {}", e);
        }
        result
    }
}

/// Sized wrapper so an unsized sink can still be stored as `&dyn ProgressSink`.
struct SinkRef<'a, S: ?Sized>(&'a S);

impl<S: ProgressSink + ?Sized> ProgressSink for SinkRef<'_, S> {
    fn on_event(&self, event: ProgressEvent<'_>) {
        self.0.on_event(event);
    }
}

fn config_path_to_cstring(path: &Path) -> Result<CString, BridgeError> {
    let Some(text) = path.to_str() else {
        return Err(BridgeError::InvalidArgument(format!(
            "configuration path {} is not valid UTF-8",
            path.display()
        )));
    };
    if text.is_empty() {
        return Err(BridgeError::InvalidArgument(
            "configuration path is empty".to_string(),
        ));
    }
    CString::new(text).map_err(|_| {
        BridgeError::InvalidArgument(format!(
            "configuration path '{}' contains a NUL byte",
            text.escape_debug()
        ))
    })
}

struct InitOutcome {
    calls: usize,
    violation: Option<ProtocolViolation>,
    panic: Option<Box<dyn Any + Send>>,
}

struct InitState<F> {
    entry: Option<F>,
    outcome: InitOutcome,
}

/// The runtime's `userdata` during `start`.
struct InitSlot<F> {
    api: RuntimeApi,
    state: Mutex<InitState<F>>,
}

impl<F> InitSlot<F> {
    fn new(entry: F, api: RuntimeApi) -> Self {
        Self {
            api,
            state: Mutex::new(InitState {
                entry: Some(entry),
                outcome: InitOutcome {
                    calls: 0,
                    violation: None,
                    panic: None,
                },
            }),
        }
    }

    fn into_outcome(self) -> InitOutcome {
        self.state.into_inner().outcome
    }
}

/// [`stagehand_abi::InitCallback`] for an entry point of type `F`.
///
/// # Safety
///
/// `userdata` must be null or the address of a live `InitSlot<F>`.
unsafe extern "C" fn init_trampoline<F>(handle: Handle, userdata: *mut c_void) -> c_int
where
    F: FnOnce(&Session) -> i32,
{
    // SAFETY: `SessionBridge::start` passes the address of an `InitSlot<F>` that
    // outlives the runtime's `start` call; only shared access is taken.
    let Some(slot) = (unsafe { userdata.cast::<InitSlot<F>>().as_ref() }) else {
        return INIT_REFUSED;
    };

    let entry = {
        let mut state = slot.state.lock();
        state.outcome.calls += 1;
        if state.outcome.calls > 1 {
            state.outcome.violation = Some(ProtocolViolation::DuplicateInit);
            return INIT_REFUSED;
        }
        if handle.is_null() {
            state.outcome.violation = Some(ProtocolViolation::NullHandle);
            return INIT_REFUSED;
        }
        match state.entry.take() {
            Some(entry) => entry,
            None => return INIT_REFUSED,
        }
    };

    let session = Session {
        handle,
        api: slot.api,
    };
    match panic::catch_unwind(AssertUnwindSafe(|| entry(&session))) {
        Ok(code) => code,
        Err(payload) => {
            slot.state.lock().outcome.panic = Some(payload);
            INIT_REFUSED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_validation() {
        assert!(config_path_to_cstring(Path::new("game/config.toml")).is_ok());
        assert!(matches!(
            config_path_to_cstring(Path::new("")),
            Err(BridgeError::InvalidArgument(_))
        ));
        assert!(matches!(
            config_path_to_cstring(Path::new("bad\0path")),
            Err(BridgeError::InvalidArgument(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_config_path_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(&[0x66, 0x6f, 0xff]));
        let err = config_path_to_cstring(path).unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }
}
