//! Reference stagehand runtime
//!
//! Implements the runtime side of the stagehand C ABI: `stagehand_start`
//! creates a [`NativeContext`] for one application and hands its address to
//! the host, and `stagehand_open_session` loads settings, the profile, plugin
//! manifests and saved records while reporting each step.
//!
//! Built as both an `rlib` (use [`api`]) and a `cdylib` exporting the two
//! entry points.

mod context;
pub mod errors;
mod ffi;
pub mod plugins;
pub mod profile;
pub mod records;
pub mod settings;

use stagehand_abi::RuntimeApi;
use std::ffi::c_int;

pub use context::{NativeContext, Progress};
pub use errors::RuntimeError;
pub use ffi::{stagehand_open_session, stagehand_start};

/// Returned by `stagehand_start` for a null, empty or non-UTF-8 application id.
pub const STATUS_INVALID_APP_ID: c_int = 2;

/// Entry point table for hosts linking this runtime directly.
pub fn api() -> RuntimeApi {
    RuntimeApi {
        start: stagehand_start,
        open_session: stagehand_open_session,
    }
}
