//! Disabled debug stream.
//!
//! Same surface as the live stream, but zero-sized and every operation is
//! empty: no allocation, no formatting, no conversion and no system call.
//! Selected in place of the live stream when debug output is disabled, and
//! always available under this path.

use std::ffi::CStr;
use std::io;
use std::marker::PhantomData;

use crate::error::DebugError;
use crate::format::Insert;
use crate::sink::{DebugChannel, Sink};

/// Debug stream that discards everything.
pub struct DebugStream<S: Sink = DebugChannel> {
    _sink: PhantomData<fn() -> S>,
}

impl DebugStream {
    #[inline(always)]
    pub fn new() -> Self {
        Self::with_auto_flush(true)
    }

    #[inline(always)]
    pub fn with_auto_flush(_auto_flush: bool) -> Self {
        Self { _sink: PhantomData }
    }
}

impl Default for DebugStream {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sink> DebugStream<S> {
    /// The sink is dropped immediately.
    #[inline(always)]
    pub fn with_sink(_sink: S, _auto_flush: bool) -> Self {
        Self { _sink: PhantomData }
    }

    /// Always reports the default, the setting is not stored.
    #[inline(always)]
    pub fn auto_flush(&self) -> bool {
        true
    }

    #[inline(always)]
    pub fn pending(&self) -> &[u16] {
        &[]
    }

    #[inline(always)]
    pub fn append<T: Insert>(&mut self, _value: T) -> &mut Self {
        self
    }

    /// Accepts any input, including `None`.
    #[inline(always)]
    pub fn append_narrow(&mut self, _text: Option<&CStr>) -> Result<&mut Self, DebugError> {
        Ok(self)
    }

    #[inline(always)]
    pub fn append_bytes(&mut self, _bytes: &[u8]) -> Result<&mut Self, DebugError> {
        Ok(self)
    }

    #[inline(always)]
    pub fn flush(&mut self) {}
}

impl<S: Sink> io::Write for DebugStream<S> {
    #[inline(always)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Directive;
    use crate::sink::MockSink;

    #[test]
    fn test_zero_sized() {
        assert_eq!(std::mem::size_of::<DebugStream>(), 0);
        assert_eq!(std::mem::size_of::<DebugStream<MockSink>>(), 0);
    }

    #[test]
    fn test_nothing_reaches_the_sink() {
        let mut sink = MockSink::new();
        sink.expect_write_wide().never();

        let mut stream = DebugStream::with_sink(sink, false);
        stream
            .append("text")
            .append(Directive::Hex)
            .append(255)
            .append(Directive::Endl);
        stream.flush();
        assert!(stream.pending().is_empty());
    }

    #[test]
    fn test_never_fails() {
        let bad = CStr::from_bytes_with_nul(b"\xff\xfe\0").unwrap();

        let mut stream = DebugStream::new();
        assert!(stream.append_narrow(None).is_ok());
        assert!(stream.append_narrow(Some(bad)).is_ok());
        assert!(stream.append_bytes(b"\xc3\x28").is_ok());
        stream.flush();
        stream.flush();
    }

    #[test]
    fn test_io_write_discards() {
        use std::io::Write;

        let mut stream = DebugStream::with_auto_flush(false);
        stream.write_all(b"discarded").unwrap();
        write!(stream, "{}", 42).unwrap();
        Write::flush(&mut stream).unwrap();
    }
}
