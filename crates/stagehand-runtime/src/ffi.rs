//! Exported C entry points

use crate::context::{NativeContext, Progress};
use crate::STATUS_INVALID_APP_ID;
use parking_lot::RwLock;
use stagehand_abi::{Handle, InitCallback, LoadPluginPayload, StatusCallback, StatusCode};
use stagehand_config::Config;
use std::ffi::{c_char, c_int, c_void, CStr};
use std::path::Path;
use std::ptr;

/// Reads a NUL-terminated UTF-8 string, `None` for null or invalid input.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null, and the caller guarantees NUL termination.
    let text = unsafe { CStr::from_ptr(ptr) }.to_str().ok()?;
    Some(text.to_owned())
}

/// Initializes a context for `app_id` and runs `init` with its handle.
///
/// The context is dropped as soon as `init` returns.
///
/// # Safety
///
/// `app_id` must be null or a NUL-terminated string. `init` must be safe to
/// call with `userdata`.
#[no_mangle]
pub unsafe extern "C" fn stagehand_start(
    app_id: *const c_char,
    init: Option<InitCallback>,
    userdata: *mut c_void,
) -> c_int {
    // SAFETY: forwarded from the caller.
    let app_id = match unsafe { read_str(app_id) } {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            tracing::warn!("Rejected missing or invalid application id");
            return STATUS_INVALID_APP_ID;
        }
    };
    let Some(init) = init else {
        tracing::debug!("No init callback for '{}'", app_id);
        return 0;
    };

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Load config failed: {}", e);
        Config::default()
    });
    tracing::debug!("Starting runtime context for '{}'", app_id);
    let context = RwLock::new(NativeContext::new(app_id, config));
    let handle = Handle::from_ptr(ptr::from_ref(&context).cast());
    // SAFETY: `init` is paired with `userdata` by the caller, and `handle`
    // points to `context` for the whole call.
    unsafe { init(handle, userdata) }
}

/// Opens the session described by the profile at `config_path`.
///
/// Every notification is delivered on the calling thread before this returns.
///
/// # Safety
///
/// `handle` must be null or a handle passed to an init callback that is still
/// running. `config_path` must be null or a NUL-terminated string. `status`
/// must be safe to call with `userdata`.
#[no_mangle]
pub unsafe extern "C" fn stagehand_open_session(
    handle: Handle,
    config_path: *const c_char,
    status: Option<StatusCallback>,
    userdata: *mut c_void,
) {
    // SAFETY: non-null handles always point to the `RwLock<NativeContext>`
    // created by `stagehand_start`, which outlives its init callback.
    let Some(context) = (unsafe { handle.as_ptr().cast::<RwLock<NativeContext>>().as_ref() })
    else {
        tracing::error!("open_session called with a null handle");
        return;
    };
    // SAFETY: forwarded from the caller.
    let Some(path) = (unsafe { read_str(config_path) }) else {
        tracing::error!("open_session called without a valid config path");
        return;
    };

    let mut emit = |progress: Progress<'_>| {
        // SAFETY: `status` and `userdata` are paired by the caller.
        unsafe { notify(status, userdata, progress) };
    };
    let mut context = context.write();
    if let Err(e) = context.open(Path::new(&path), &mut emit) {
        tracing::error!("Failed to open '{}': {}", path, e);
    }
}

/// Sends one notification, building the plugin payload on the stack.
///
/// # Safety
///
/// `status` must be safe to call with `userdata`.
unsafe fn notify(status: Option<StatusCallback>, userdata: *mut c_void, progress: Progress<'_>) {
    let Some(status) = status else { return };
    match progress {
        Progress::LoadPlugin { name, index, count } => {
            let payload = LoadPluginPayload {
                name: name.as_ptr().cast(),
                name_len: name.len(),
                index,
                count,
            };
            // SAFETY: `payload` and `name` outlive the call.
            unsafe { status(StatusCode::LOAD_PLUGIN, ptr::from_ref(&payload).cast(), userdata) };
        }
        other => {
            // SAFETY: payload-free discriminant.
            unsafe { status(other.status_code(), ptr::null(), userdata) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_read_str() {
        let text = CString::new("io.example").unwrap();
        // SAFETY: valid C string.
        let read = unsafe { read_str(text.as_ptr()) };
        assert_eq!(read.as_deref(), Some("io.example"));
        // SAFETY: null is accepted.
        assert_eq!(unsafe { read_str(ptr::null()) }, None);
    }

    #[test]
    fn test_read_str_rejects_invalid_utf8() {
        let bytes = [0x66_u8, 0xff, 0x00];
        // SAFETY: NUL-terminated buffer.
        assert_eq!(unsafe { read_str(bytes.as_ptr().cast()) }, None);
    }
}
