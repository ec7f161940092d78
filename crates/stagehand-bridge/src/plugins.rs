//! Plugin enumeration sub-protocol
//!
//! The runtime reports plugin loading as a burst of `LoadPlugin` notifications,
//! each carrying `{name, name_len, index, count}`. This module decodes one
//! payload into a [`PluginLoad`] and checks that a burst counts `0..count`
//! with a fixed `count`.

use crate::errors::ProtocolViolation;
use stagehand_abi::LoadPluginPayload;
use std::borrow::Cow;
use std::ffi::c_void;
use std::fmt;

/// One "loading plugin N of M" notification.
///
/// `name` borrows runtime memory that is only valid during the dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginLoad<'a> {
    name: &'a [u8],
    index: usize,
    count: usize,
}

impl<'a> PluginLoad<'a> {
    pub fn new(name: &'a [u8], index: usize, count: usize) -> Self {
        Self { name, index, count }
    }

    /// The exact `name_len` bytes the runtime reported.
    pub fn name_bytes(&self) -> &'a [u8] {
        self.name
    }

    /// Plugin name, with invalid UTF-8 replaced.
    pub fn name(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.name)
    }

    /// Zero-based index within the burst.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of plugins in the burst.
    pub fn count(&self) -> usize {
        self.count
    }

    /// One-based position, for display.
    pub fn position(&self) -> usize {
        self.index.saturating_add(1)
    }

    pub fn is_last(&self) -> bool {
        self.position() == self.count
    }

    pub fn into_owned(self) -> OwnedPluginLoad {
        OwnedPluginLoad {
            name: self.name().into_owned(),
            index: self.index,
            count: self.count,
        }
    }
}

impl fmt::Display for PluginLoad<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name(), self.position(), self.count)
    }
}

/// [`PluginLoad`] with its name copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedPluginLoad {
    pub name: String,
    pub index: usize,
    pub count: usize,
}

/// Decodes a `LoadPlugin` payload.
///
/// Only the `name_len` bytes behind `name` are read; there is no terminator scan.
///
/// # Safety
///
/// `payload` must be null or point to a valid [`LoadPluginPayload`] whose
/// `name` points to at least `name_len` readable bytes, and both must stay
/// valid and unmodified for `'a`.
pub(crate) unsafe fn decode<'a>(
    payload: *const c_void,
) -> Result<PluginLoad<'a>, ProtocolViolation> {
    // SAFETY: the caller guarantees `payload` is null or a valid payload for `'a`.
    let Some(raw) = (unsafe { payload.cast::<LoadPluginPayload>().as_ref() }) else {
        return Err(ProtocolViolation::MissingPayload);
    };
    let len = raw.name_len;
    let name: &'a [u8] = if len == 0 {
        &[]
    } else if raw.name.is_null() {
        return Err(ProtocolViolation::NullPluginName { len });
    } else if len > isize::MAX as usize {
        return Err(ProtocolViolation::PluginNameTooLong { len });
    } else {
        // SAFETY: non-null, `len` fits `isize`, and the caller guarantees
        // `len` readable bytes behind `name` for `'a`.
        unsafe { std::slice::from_raw_parts(raw.name.cast::<u8>(), len) }
    };
    Ok(PluginLoad {
        name,
        index: raw.index,
        count: raw.count,
    })
}

/// Progress through one plugin burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginBurst {
    next: usize,
    count: usize,
}

impl PluginBurst {
    /// Starts a burst from its first notification, which must be index 0.
    pub fn begin(first: &PluginLoad<'_>) -> Result<Self, ProtocolViolation> {
        let mut burst = Self {
            next: 0,
            count: first.count,
        };
        burst.accept(first)?;
        Ok(burst)
    }

    /// Accepts the next notification of the burst.
    pub fn accept(&mut self, load: &PluginLoad<'_>) -> Result<(), ProtocolViolation> {
        if load.count != self.count {
            return Err(ProtocolViolation::PluginCountChanged {
                expected: self.count,
                found: load.count,
            });
        }
        if load.index >= load.count {
            return Err(ProtocolViolation::PluginIndexOutOfRange {
                index: load.index,
                count: load.count,
            });
        }
        if load.index != self.next {
            return Err(ProtocolViolation::PluginIndex {
                expected: self.next,
                found: load.index,
            });
        }
        self.next += 1;
        Ok(())
    }

    /// Plugins reported so far.
    pub fn loaded(&self) -> usize {
        self.next
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_complete(&self) -> bool {
        self.next == self.count
    }
}
