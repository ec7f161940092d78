//! C ABI shared between stagehand hosts and runtimes
//!
//! A runtime exposes two entry points:
//! - `start(app_id, init, userdata) -> c_int`
//! - `open_session(handle, config_path, status, userdata)`
//!
//! Everything that crosses the boundary is declared here with a fixed layout.
//! Status discriminants travel as a transparent `u32` rather than a Rust enum
//! so that a value from a newer runtime is still representable on the host side.
#![forbid(unsafe_code)]

use std::ffi::{c_char, c_int, c_void};
use std::fmt;

/// Opaque runtime context handed to the init callback.
///
/// The host never dereferences it; it is only passed back to the runtime.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(*const c_void);

impl Handle {
    pub const fn from_ptr(ptr: *const c_void) -> Self {
        Self(ptr)
    }

    pub const fn null() -> Self {
        Self(std::ptr::null())
    }

    pub const fn as_ptr(self) -> *const c_void {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

/// Raw status discriminant of a progress notification.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u32);

impl StatusCode {
    pub const LOAD_SETTINGS: Self = Self(0);
    pub const LOAD_PROFILE: Self = Self(1);
    pub const CREATE_RUNTIME: Self = Self(2);
    /// Payload is a [`LoadPluginPayload`].
    pub const LOAD_PLUGIN: Self = Self(3);
    pub const LOAD_RECORDS: Self = Self(4);
    pub const LOADED: Self = Self(5);

    /// Every discriminant this version of the ABI defines, in protocol order.
    pub const ALL: [Self; 6] = [
        Self::LOAD_SETTINGS,
        Self::LOAD_PROFILE,
        Self::CREATE_RUNTIME,
        Self::LOAD_PLUGIN,
        Self::LOAD_RECORDS,
        Self::LOADED,
    ];

    pub fn is_known(self) -> bool {
        Self::ALL.contains(&self)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload of [`StatusCode::LOAD_PLUGIN`].
///
/// `name` is not NUL-terminated and must be read with `name_len`. The memory
/// belongs to the runtime and is only valid during the status callback.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LoadPluginPayload {
    pub name: *const c_char,
    pub name_len: usize,
    pub index: usize,
    pub count: usize,
}

/// Called by the runtime once initialization succeeded.
///
/// The return value becomes the return value of [`StartFn`].
pub type InitCallback = unsafe extern "C" fn(handle: Handle, userdata: *mut c_void) -> c_int;

/// Called by the runtime for every progress notification of an open-session operation.
///
/// `payload` is null except for [`StatusCode::LOAD_PLUGIN`].
pub type StatusCallback =
    unsafe extern "C" fn(status: StatusCode, payload: *const c_void, userdata: *mut c_void);

/// Runtime initialization entry point.
///
/// Returns the init callback's result, or a non-zero runtime status if
/// initialization failed before the callback could run.
pub type StartFn = unsafe extern "C" fn(
    app_id: *const c_char,
    init: Option<InitCallback>,
    userdata: *mut c_void,
) -> c_int;

/// Runtime open-session entry point.
///
/// Every status notification is delivered before this function returns.
pub type OpenSessionFn = unsafe extern "C" fn(
    handle: Handle,
    config_path: *const c_char,
    status: Option<StatusCallback>,
    userdata: *mut c_void,
);

/// The entry points of one runtime implementation.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeApi {
    pub start: StartFn,
    pub open_session: OpenSessionFn,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    #[test]
    fn test_status_code_is_u32_sized() {
        assert_eq!(size_of::<StatusCode>(), size_of::<u32>());
        assert_eq!(size_of::<Handle>(), size_of::<*const c_void>());
    }

    #[test]
    fn test_load_plugin_payload_layout() {
        let word = size_of::<usize>();
        assert_eq!(size_of::<LoadPluginPayload>(), 4 * word);
        assert_eq!(align_of::<LoadPluginPayload>(), align_of::<usize>());
    }

    #[test]
    fn test_known_status_codes() {
        for (i, code) in StatusCode::ALL.iter().enumerate() {
            assert_eq!(code.0 as usize, i);
            assert!(code.is_known());
        }
        assert!(!StatusCode(6).is_known());
        assert!(!StatusCode(u32::MAX).is_known());
    }

    #[test]
    fn test_null_handle() {
        assert!(Handle::null().is_null());
        let value = 7_u8;
        let handle = Handle::from_ptr(std::ptr::from_ref(&value).cast());
        assert!(!handle.is_null());
    }
}
