//! Live debug stream, compiled when debug output is enabled.
//!
//! Appended values accumulate in a UTF-16 buffer. With auto-flush on (the
//! default) every append is delivered to the sink straight away; otherwise
//! the buffer is delivered by [`DebugStream::flush`] or when the stream is
//! dropped.

use std::ffi::{CStr, CString};
use std::io;

use crate::code_page::CODE_PAGE;
use crate::convert::to_wide;
use crate::error::DebugError;
use crate::format::{Insert, WideBuffer};
use crate::sink::{DebugChannel, Sink};

/// Stream-style writer for the debug output channel.
///
/// Not `Clone`: pending text has exactly one owner. Dropping the stream
/// flushes whatever is still buffered.
///
/// # Example
/// ```
/// use debug_stream::{DebugStream, Directive};
///
/// let mut stream = DebugStream::with_auto_flush(false);
/// stream
///     .append("The answer is ")
///     .append(Directive::Hex)
///     .append(42)
///     .append(Directive::Endl);
/// stream.flush();
/// ```
pub struct DebugStream<S: Sink = DebugChannel> {
    buffer: WideBuffer,
    auto_flush: bool,
    sink: S,
}

impl DebugStream {
    /// Stream writing to the debug channel, flushing after every append.
    pub fn new() -> Self {
        Self::with_auto_flush(true)
    }

    /// Stream writing to the debug channel.
    ///
    /// With `auto_flush` off, a chain of appends reaches the channel as one
    /// write, which keeps it from interleaving with other threads' output.
    pub fn with_auto_flush(auto_flush: bool) -> Self {
        Self::with_sink(DebugChannel, auto_flush)
    }
}

impl Default for DebugStream {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sink> DebugStream<S> {
    /// Stream writing to a custom sink.
    pub fn with_sink(sink: S, auto_flush: bool) -> Self {
        Self {
            buffer: WideBuffer::new(),
            auto_flush,
            sink,
        }
    }

    /// Whether every append is followed by a flush.
    pub fn auto_flush(&self) -> bool {
        self.auto_flush
    }

    /// Text appended since the last flush, as UTF-16 units.
    pub fn pending(&self) -> &[u16] {
        self.buffer.as_slice()
    }

    /// Append a value or apply a directive.
    pub fn append<T: Insert>(&mut self, value: T) -> &mut Self {
        value.insert(&mut self.buffer);
        self.after_append();
        self
    }

    /// Append NUL-terminated narrow text decoded with [`CODE_PAGE`].
    ///
    /// On error nothing is appended and no flush happens.
    pub fn append_narrow(&mut self, text: Option<&CStr>) -> Result<&mut Self, DebugError> {
        let wide = to_wide(text, CODE_PAGE)?;
        self.buffer.put_wide(&wide);
        self.after_append();
        Ok(self)
    }

    /// Append narrow text held in a byte slice.
    ///
    /// The text ends at the first NUL byte, or at the end of the slice.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, DebugError> {
        let owned;
        let text = match CStr::from_bytes_until_nul(bytes) {
            Ok(text) => text,
            Err(_) => {
                owned = CString::new(bytes).map_err(|_| DebugError::InvalidInput)?;
                owned.as_c_str()
            }
        };
        self.append_narrow(Some(text))
    }

    /// Send the pending text to the sink as one write and empty the buffer.
    ///
    /// Formatting state is kept. An empty buffer is not written.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        self.sink.write_wide(self.buffer.as_slice());
        self.buffer.clear();
    }

    fn after_append(&mut self) {
        if self.auto_flush {
            self.flush();
        }
    }
}

impl<S: Sink> Drop for DebugStream<S> {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Byte output is taken as UTF-8; invalid sequences become U+FFFD.
impl<S: Sink> io::Write for DebugStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(&*String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        DebugStream::<S>::flush(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{display, Directive};
    use crate::sink::testing::Recorder;
    use crate::sink::MockSink;

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_wide_text_is_emitted_unchanged() {
        let recorder = Recorder::default();
        let text: Vec<u16> = vec![0x0048, 0x0069, 0xDC00, 0x263A];

        let mut stream = DebugStream::with_sink(&recorder, false);
        stream.append(&text);
        stream.flush();

        assert_eq!(recorder.raw_writes(), vec![text]);
    }

    #[test]
    fn test_narrow_text_is_decoded() -> Result<(), DebugError> {
        let recorder = Recorder::default();

        let mut stream = DebugStream::with_sink(&recorder, false);
        stream
            .append_narrow(Some(c"Ascii string "))?
            .append_narrow(Some(c"caf\u{e9}"))?;
        stream.flush();

        assert_eq!(recorder.writes(), vec!["Ascii string caf\u{e9}"]);
        Ok(())
    }

    #[test]
    fn test_append_bytes_stops_at_nul() -> Result<(), DebugError> {
        let recorder = Recorder::default();

        let mut stream = DebugStream::with_sink(&recorder, false);
        stream.append_bytes(b"std string")?.append_bytes(b" head\0tail")?;
        stream.flush();

        assert_eq!(recorder.writes(), vec!["std string head"]);
        Ok(())
    }

    #[test]
    fn test_null_narrow_text_leaves_buffer_unchanged() {
        let recorder = Recorder::default();

        let mut stream = DebugStream::with_sink(&recorder, false);
        stream.append("prior");
        let result = stream.append_narrow(None).map(|_| ());
        assert_eq!(result, Err(DebugError::InvalidInput));
        assert_eq!(stream.pending(), wide("prior").as_slice());
        stream.flush();

        assert_eq!(recorder.writes(), vec!["prior"]);
    }

    #[test]
    fn test_malformed_narrow_text_is_not_flushed() {
        let recorder = Recorder::default();
        let bad = CStr::from_bytes_with_nul(b"\xc3\x28\0").unwrap();

        let mut stream = DebugStream::with_sink(&recorder, true);
        stream.append("before");
        assert!(matches!(
            stream.append_narrow(Some(bad)),
            Err(DebugError::ConversionFailure { .. })
        ));
        assert!(stream.pending().is_empty());
        drop(stream);

        assert_eq!(recorder.writes(), vec!["before"]);
    }

    #[test]
    fn test_auto_flush_emits_each_append() {
        let recorder = Recorder::default();

        DebugStream::with_sink(&recorder, true)
            .append("Count: ")
            .append(1)
            .append(" State: ")
            .append(true);

        assert_eq!(recorder.writes(), vec!["Count: ", "1", " State: ", "true"]);
    }

    #[test]
    fn test_batched_output_waits_for_drop() {
        let recorder = Recorder::default();

        {
            let mut stream = DebugStream::with_sink(&recorder, false);
            stream.append("The answer is ").append(42);
            assert!(recorder.writes().is_empty());
        }

        assert_eq!(recorder.writes(), vec!["The answer is 42"]);
    }

    #[test]
    fn test_drop_flushes_exactly_once() {
        let mut sink = MockSink::new();
        sink.expect_write_wide()
            .withf(|text| text.iter().copied().eq("pending".encode_utf16()))
            .times(1)
            .return_const(());

        let mut stream = DebugStream::with_sink(sink, false);
        stream.append("pending");
    }

    #[test]
    fn test_second_flush_emits_nothing() {
        let mut sink = MockSink::new();
        sink.expect_write_wide().times(1).return_const(());

        let mut stream = DebugStream::with_sink(sink, false);
        stream.append("once");
        stream.flush();
        stream.flush();
        assert!(stream.pending().is_empty());
    }

    #[test]
    fn test_directives() {
        let recorder = Recorder::default();

        let mut stream = DebugStream::with_sink(&recorder, false);
        stream.append(Directive::Hex).append(255);
        stream.flush();
        stream
            .append(Directive::Dec)
            .append(Directive::Width(4))
            .append(Directive::Fill('0'))
            .append(42);
        stream.flush();

        assert_eq!(recorder.writes(), vec!["ff", "0042"]);
    }

    #[test]
    fn test_directives_alone_emit_nothing_under_auto_flush() {
        let recorder = Recorder::default();

        DebugStream::with_sink(&recorder, true)
            .append(Directive::Hex)
            .append(Directive::Endl)
            .append(255);

        assert_eq!(recorder.writes(), vec!["\n", "ff"]);
    }

    #[test]
    fn test_chained_and_sequential_appends_match() {
        let chained_sink = Recorder::default();
        let sequential_sink = Recorder::default();

        let mut chained = DebugStream::with_sink(&chained_sink, false);
        chained.append("a").append(display(1.5)).append('c');

        let mut sequential = DebugStream::with_sink(&sequential_sink, false);
        sequential.append("a");
        sequential.append(display(1.5));
        sequential.append('c');

        assert_eq!(chained.pending(), sequential.pending());
        drop(chained);
        drop(sequential);
        assert_eq!(chained_sink.writes(), sequential_sink.writes());
    }

    #[test]
    fn test_io_write() {
        use std::io::Write;

        let recorder = Recorder::default();

        let mut stream = DebugStream::with_sink(&recorder, false);
        write!(stream, "{} + {}", 1, 2).unwrap();
        stream.write_all(b" = 3 \xff").unwrap();
        Write::flush(&mut stream).unwrap();

        assert_eq!(recorder.writes(), vec!["1 + 2 = 3 \u{fffd}"]);
    }

    #[test]
    fn test_default_stream_flags() {
        let stream = DebugStream::default();
        assert!(stream.auto_flush());
        assert!(stream.pending().is_empty());
        assert!(!DebugStream::with_auto_flush(false).auto_flush());
    }
}
