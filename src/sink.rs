//! Destinations for flushed debug text.
//!
//! [`DebugChannel`] writes to the debugger output window through
//! `OutputDebugStringW`. On other platforms it falls back to stderr so debug
//! builds stay usable during development.

use std::sync::Arc;

/// Developer-visible channel receiving flushed text.
///
/// Each call receives the full contents of one flush and must deliver it as
/// a single write. Failures are not reported; debug output is best effort.
#[cfg_attr(test, mockall::automock)]
pub trait Sink {
    fn write_wide(&self, text: &[u16]);
}

impl<T: Sink + ?Sized> Sink for &T {
    fn write_wide(&self, text: &[u16]) {
        (**self).write_wide(text)
    }
}

impl<T: Sink + ?Sized> Sink for Box<T> {
    fn write_wide(&self, text: &[u16]) {
        (**self).write_wide(text)
    }
}

impl<T: Sink + ?Sized> Sink for Arc<T> {
    fn write_wide(&self, text: &[u16]) {
        (**self).write_wide(text)
    }
}

/// The operating system debug output channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugChannel;

#[cfg(windows)]
impl Sink for DebugChannel {
    fn write_wide(&self, text: &[u16]) {
        use windows::core::PCWSTR;
        use windows::Win32::System::Diagnostics::Debug::OutputDebugStringW;

        let mut terminated = Vec::with_capacity(text.len() + 1);
        terminated.extend_from_slice(text);
        terminated.push(0);

        // Safety: `terminated` is NUL-terminated and outlives the call
        unsafe { OutputDebugStringW(PCWSTR::from_raw(terminated.as_ptr())) };
    }
}

#[cfg(not(windows))]
impl Sink for DebugChannel {
    fn write_wide(&self, text: &[u16]) {
        use std::io::Write;

        let text = String::from_utf16_lossy(text);
        let _ = std::io::stderr().lock().write_all(text.as_bytes());
    }
}
