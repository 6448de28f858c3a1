//! Error types for narrow text conversion.

use thiserror::Error;

use crate::code_page::CodePage;

/// Errors raised while appending narrow text to a debug stream.
///
/// Every variant is surfaced to the caller of the append that triggered it.
/// Nothing is appended and nothing is flushed for the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebugError {
    /// A required text reference was absent.
    #[error("Null string pointer")]
    InvalidInput,

    /// The platform could not interpret the bytes under the code page.
    #[error("Failed to convert string to wide string (code page {code_page}): {reason}")]
    ConversionFailure { code_page: CodePage, reason: String },

    /// The converted text would not fit in addressable wide-character storage.
    #[error("String too long: {required} wide characters required")]
    LengthOverflow { required: u64 },
}

impl DebugError {
    pub(crate) fn conversion(code_page: CodePage, reason: impl Into<String>) -> Self {
        DebugError::ConversionFailure {
            code_page,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(DebugError::InvalidInput.to_string(), "Null string pointer");

        let err = DebugError::conversion(CodePage::UTF8, "invalid sequence");
        assert_eq!(
            err.to_string(),
            "Failed to convert string to wide string (code page 65001): invalid sequence"
        );

        let err = DebugError::LengthOverflow { required: 42 };
        assert!(err.to_string().starts_with("String too long"));
    }
}
