//! Session bridge between a host application and a stagehand runtime
//!
//! This bridge provides a safe interface over the runtime's C ABI for:
//! 1. One-shot initialization that hands a runtime-owned [`Session`] to host code
//! 2. Opening a session while the runtime reports staged progress
//!
//! Raw status notifications are decoded once, at the boundary, into typed
//! [`ProgressEvent`]s and handed to a host-supplied [`ProgressSink`]. The
//! bridge itself never renders or logs event content.

mod dispatcher;
pub mod errors;
mod event;
mod plugins;
mod session;
mod sink;

pub use dispatcher::{OpenSummary, SessionState};
pub use errors::{BridgeError, ProtocolViolation};
pub use event::{OwnedProgressEvent, ProgressEvent, ProgressPhase};
pub use plugins::{OwnedPluginLoad, PluginBurst, PluginLoad};
pub use session::{Session, SessionBridge};
pub use sink::{ProgressSink, Recorder};
pub use stagehand_abi::{Handle, RuntimeApi, StatusCode};
