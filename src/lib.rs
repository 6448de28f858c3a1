//! Stream-style debug output for the Windows debugger channel.
//!
//! Build a line with chained appends and it is written to the debugger's
//! output window through `OutputDebugStringW` (stderr on other platforms).
//! Release builds get a zero-sized stream whose every method is empty, so
//! debug output can stay in the code at no cost.
//!
//! # Usage
//! ```
//! use debug_stream::{debug_stream, display, DebugStream, Directive};
//!
//! // Each append is written as soon as it is made
//! debug_stream().append("The answer is ").append(42);
//!
//! // Directives change how later values are rendered
//! debug_stream().append(Directive::Hex).append(255); // ff
//! debug_stream()
//!     .append(Directive::Width(4))
//!     .append(Directive::Fill('0'))
//!     .append(42); // 0042
//!
//! // Narrow text is decoded with the compile-time code page
//! debug_stream().append_narrow(Some(c"Ascii string")).unwrap();
//!
//! // One write for the whole line, kept together under concurrent output
//! DebugStream::with_auto_flush(false)
//!     .append("Count: ")
//!     .append(1)
//!     .append(" State: ")
//!     .append(display(true))
//!     .append(Directive::Endl);
//! ```
//!
//! # Enabling
//! The live stream is compiled when `debug_assertions` is on. The
//! `force-enabled` feature keeps it in release builds and `force-disabled`
//! removes it from every build. Check [`ENABLED`] to see which one is active.
//!
//! # Code page
//! Narrow text is decoded as UTF-8 unless `DEBUG_STREAM_CODE_PAGE` names
//! another code page at compile time, see [`CODE_PAGE`]. Prefer Rust strings
//! or wide text where possible; they need no decoding.

mod code_page;
mod convert;
mod error;
pub mod format;
pub mod noop;
pub mod sink;

#[cfg(all(
    not(feature = "force-disabled"),
    any(debug_assertions, feature = "force-enabled")
))]
mod live;

#[cfg(feature = "subscriber")]
pub mod writer;

pub use code_page::{CodePage, CODE_PAGE};
pub use convert::to_wide;
pub use error::DebugError;
pub use format::{debug, display, Directive, Insert, WideBuffer};
pub use sink::{DebugChannel, Sink};

#[cfg(all(
    not(feature = "force-disabled"),
    any(debug_assertions, feature = "force-enabled")
))]
pub use live::DebugStream;

#[cfg(not(all(
    not(feature = "force-disabled"),
    any(debug_assertions, feature = "force-enabled")
)))]
pub use noop::DebugStream;

/// Whether this build carries the live stream.
pub const ENABLED: bool = cfg!(all(
    not(feature = "force-disabled"),
    any(debug_assertions, feature = "force-enabled")
));

/// Create a stream for one line of debug output, flushing after every append.
///
/// ```
/// debug_stream::debug_stream().append("Hello World");
/// ```
#[inline(always)]
pub fn debug_stream() -> DebugStream {
    DebugStream::new()
}

/// Write formatted text to the debug channel.
///
/// The whole message is written at once. When debug output is disabled the
/// arguments are not evaluated.
///
/// ```
/// debug_stream::debug_print!("[module] value: {}", 42);
/// ```
#[macro_export]
macro_rules! debug_print {
    ($($arg:tt)*) => {
        if $crate::ENABLED {
            $crate::DebugStream::with_auto_flush(false)
                .append(::core::format_args!($($arg)*));
        }
    };
}

/// Write formatted text and a line feed to the debug channel.
///
/// ```
/// debug_stream::debug_println!("[module] Error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! debug_println {
    () => {
        $crate::debug_print!("\n")
    };
    ($($arg:tt)*) => {
        if $crate::ENABLED {
            $crate::DebugStream::with_auto_flush(false)
                .append(::core::format_args!($($arg)*))
                .append($crate::Directive::Endl);
        }
    };
}
