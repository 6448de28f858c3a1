//! Narrow to wide text conversion.
//!
//! Conversion is done in two passes, the way `MultiByteToWideChar` expects:
//! the platform is first asked how many UTF-16 units the text needs, a buffer
//! of exactly that size is allocated, and the platform then fills it. The
//! portable backend used off Windows follows the same protocol.

use std::ffi::CStr;
use std::mem::size_of;

use tracing::debug;

use crate::code_page::CodePage;
use crate::error::DebugError;

/// Largest number of UTF-16 units a single conversion may produce.
pub(crate) const MAX_WIDE_LEN: usize = isize::MAX as usize / size_of::<u16>();

/// Platform conversion facility.
///
/// Both passes receive the text including its NUL terminator and report
/// lengths the way the Win32 routine does: the measure pass returns a
/// non-positive value on failure, the convert pass returns zero.
pub(crate) trait Transcoder {
    /// UTF-16 units required for `text`, terminator included.
    fn required_len(&self, code_page: CodePage, text: &[u8]) -> i32;

    /// Convert `text` into `out`, returning the units written.
    fn transcode(&self, code_page: CodePage, text: &[u8], out: &mut [u16]) -> i32;

    /// Human-readable reason for the last failed pass.
    fn failure_reason(&self, code_page: CodePage, text: &[u8]) -> String;
}

/// Convert a NUL-terminated narrow string to UTF-16 under `code_page`.
///
/// The returned text does not carry a terminator.
///
/// # Errors
/// * [`DebugError::InvalidInput`] if `text` is `None`
/// * [`DebugError::ConversionFailure`] if the bytes are not valid under the code page
/// * [`DebugError::LengthOverflow`] if the result cannot be addressed
///
/// # Example
/// ```
/// use debug_stream::{to_wide, CodePage};
///
/// let wide = to_wide(Some(c"h\u{e9}"), CodePage::UTF8).unwrap();
/// assert_eq!(wide, "h\u{e9}".encode_utf16().collect::<Vec<u16>>());
/// ```
pub fn to_wide(text: Option<&CStr>, code_page: CodePage) -> Result<Vec<u16>, DebugError> {
    convert_with(&PlatformTranscoder, text, code_page, MAX_WIDE_LEN).map_err(|e| {
        debug!(code_page = %code_page, error = %e, "Narrow text conversion failed");
        e
    })
}

pub(crate) fn convert_with<T: Transcoder>(
    transcoder: &T,
    text: Option<&CStr>,
    code_page: CodePage,
    max_len: usize,
) -> Result<Vec<u16>, DebugError> {
    let text = text.ok_or(DebugError::InvalidInput)?;
    let bytes = text.to_bytes_with_nul();

    let required = transcoder.required_len(code_page, bytes);
    if required <= 0 {
        return Err(DebugError::conversion(
            code_page,
            transcoder.failure_reason(code_page, bytes),
        ));
    }

    let required = required as u64;
    if required > max_len as u64 {
        return Err(DebugError::LengthOverflow { required });
    }

    let mut wide = vec![0u16; required as usize];
    let written = transcoder.transcode(code_page, bytes, &mut wide);
    if written <= 0 {
        return Err(DebugError::conversion(
            code_page,
            transcoder.failure_reason(code_page, bytes),
        ));
    }

    wide.truncate(written as usize);
    if wide.last() == Some(&0) {
        wide.pop();
    }
    Ok(wide)
}

#[cfg(windows)]
use win32::Win32Transcoder as PlatformTranscoder;

#[cfg(not(windows))]
use portable::PortableTranscoder as PlatformTranscoder;

#[cfg(windows)]
mod win32 {
    use super::*;
    use windows::Win32::Globalization::{
        MultiByteToWideChar, MB_ERR_INVALID_CHARS, MULTI_BYTE_TO_WIDE_CHAR_FLAGS,
    };

    /// Converter backed by `MultiByteToWideChar`.
    pub(crate) struct Win32Transcoder;

    /// Strict decoding, except for the code pages that reject every flag.
    fn conversion_flags(code_page: CodePage) -> MULTI_BYTE_TO_WIDE_CHAR_FLAGS {
        match code_page.id() {
            42 | 50220 | 50221 | 50222 | 50225 | 50227 | 50229 | 57002..=57011 | 65000 => {
                MULTI_BYTE_TO_WIDE_CHAR_FLAGS(0)
            }
            _ => MB_ERR_INVALID_CHARS,
        }
    }

    impl Transcoder for Win32Transcoder {
        fn required_len(&self, code_page: CodePage, text: &[u8]) -> i32 {
            // Safety: `text` is a valid slice and no output buffer is passed
            unsafe { MultiByteToWideChar(code_page.id(), conversion_flags(code_page), text, None) }
        }

        fn transcode(&self, code_page: CodePage, text: &[u8], out: &mut [u16]) -> i32 {
            // Safety: both slices are valid for their full length
            unsafe {
                MultiByteToWideChar(code_page.id(), conversion_flags(code_page), text, Some(out))
            }
        }

        fn failure_reason(&self, _code_page: CodePage, _text: &[u8]) -> String {
            windows::core::Error::from_win32().message().to_string()
        }
    }
}

#[cfg(any(not(windows), test))]
mod portable {
    use super::*;

    /// Converter for hosts without `MultiByteToWideChar`.
    ///
    /// Supports UTF-8, US-ASCII and Latin 1. The system ANSI and OEM code
    /// pages are treated as UTF-8, which is what Unix locales use in practice.
    pub(crate) struct PortableTranscoder;

    enum Decoded<'a> {
        Unicode(&'a str),
        Latin1(&'a [u8]),
    }

    impl Decoded<'_> {
        fn len(&self) -> usize {
            match self {
                Decoded::Unicode(s) => s.encode_utf16().count(),
                Decoded::Latin1(b) => b.len(),
            }
        }

        fn write_into(&self, out: &mut [u16]) -> usize {
            let mut written = 0;
            match self {
                Decoded::Unicode(s) => {
                    for (slot, unit) in out.iter_mut().zip(s.encode_utf16()) {
                        *slot = unit;
                        written += 1;
                    }
                }
                Decoded::Latin1(b) => {
                    for (slot, byte) in out.iter_mut().zip(b.iter()) {
                        *slot = u16::from(*byte);
                        written += 1;
                    }
                }
            }
            written
        }
    }

    fn decode(code_page: CodePage, text: &[u8]) -> Result<Decoded<'_>, String> {
        match code_page {
            CodePage::UTF8 | CodePage::ACP | CodePage::OEMCP => std::str::from_utf8(text)
                .map(Decoded::Unicode)
                .map_err(|e| format!("No mapping for the Unicode character exists: {}", e)),
            CodePage::US_ASCII => match text.iter().position(|b| !b.is_ascii()) {
                Some(at) => Err(format!("Byte 0x{:02x} at offset {} is not ASCII", text[at], at)),
                None => Ok(Decoded::Latin1(text)),
            },
            CodePage::LATIN1 => Ok(Decoded::Latin1(text)),
            other => Err(format!("Unsupported code page {}", other)),
        }
    }

    impl Transcoder for PortableTranscoder {
        fn required_len(&self, code_page: CodePage, text: &[u8]) -> i32 {
            decode(code_page, text)
                .ok()
                .and_then(|decoded| i32::try_from(decoded.len()).ok())
                .unwrap_or(0)
        }

        fn transcode(&self, code_page: CodePage, text: &[u8], out: &mut [u16]) -> i32 {
            match decode(code_page, text) {
                Ok(decoded) if decoded.len() <= out.len() => {
                    i32::try_from(decoded.write_into(out)).unwrap_or(0)
                }
                _ => 0,
            }
        }

        fn failure_reason(&self, code_page: CodePage, text: &[u8]) -> String {
            match decode(code_page, text) {
                Err(reason) => reason,
                Ok(_) => "The data area passed to a system call is too small".to_string(),
            }
        }
    }
}
