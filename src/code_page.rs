//! Code page identifiers and the compile-time code page used for narrow text.
//!
//! The code page is read from `DEBUG_STREAM_CODE_PAGE` when the crate is
//! compiled. It accepts a numeric identifier (see the Windows code page
//! identifier table) or one of the names `utf-8`, `utf8`, `acp` and `oem`.
//! When the variable is unset, narrow text is decoded as UTF-8.
//!
//! ```text
//! DEBUG_STREAM_CODE_PAGE=acp cargo build
//! ```

use std::fmt;

/// A byte-to-character mapping used to interpret narrow text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodePage(pub u32);

impl CodePage {
    /// System default ANSI code page (`CP_ACP`)
    pub const ACP: CodePage = CodePage(0);
    /// System default OEM code page (`CP_OEMCP`)
    pub const OEMCP: CodePage = CodePage(1);
    /// 7-bit US-ASCII
    pub const US_ASCII: CodePage = CodePage(20127);
    /// ISO 8859-1 (Latin 1)
    pub const LATIN1: CodePage = CodePage(28591);
    /// UTF-8 (`CP_UTF8`)
    pub const UTF8: CodePage = CodePage(65001);

    /// Raw identifier passed to the platform conversion routine.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Parse a code page from a decimal identifier or a well-known name.
    ///
    /// Usable in const context, which is how [`CODE_PAGE`] is resolved.
    pub const fn parse(value: &str) -> Option<CodePage> {
        let bytes = value.as_bytes();
        if eq_ignore_case(bytes, b"utf-8") || eq_ignore_case(bytes, b"utf8") {
            return Some(CodePage::UTF8);
        }
        if eq_ignore_case(bytes, b"acp") {
            return Some(CodePage::ACP);
        }
        if eq_ignore_case(bytes, b"oem") {
            return Some(CodePage::OEMCP);
        }
        if bytes.is_empty() {
            return None;
        }

        let mut id: u32 = 0;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if !b.is_ascii_digit() {
                return None;
            }
            id = match id.checked_mul(10) {
                Some(v) => match v.checked_add((b - b'0') as u32) {
                    Some(v) => v,
                    None => return None,
                },
                None => return None,
            };
            i += 1;
        }
        Some(CodePage(id))
    }
}

impl Default for CodePage {
    fn default() -> Self {
        CodePage::UTF8
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const fn eq_ignore_case(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i].to_ascii_lowercase() != b[i].to_ascii_lowercase() {
            return false;
        }
        i += 1;
    }
    true
}

/// Code page used for every narrow append, fixed when the crate is compiled.
pub const CODE_PAGE: CodePage = match option_env!("DEBUG_STREAM_CODE_PAGE") {
    None => CodePage::UTF8,
    Some(value) => match CodePage::parse(value) {
        Some(code_page) => code_page,
        None => panic!("DEBUG_STREAM_CODE_PAGE must be a code page number or one of: utf-8, acp, oem"),
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(CodePage::parse("utf-8"), Some(CodePage::UTF8));
        assert_eq!(CodePage::parse("UTF8"), Some(CodePage::UTF8));
        assert_eq!(CodePage::parse("acp"), Some(CodePage::ACP));
        assert_eq!(CodePage::parse("OEM"), Some(CodePage::OEMCP));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(CodePage::parse("65001"), Some(CodePage::UTF8));
        assert_eq!(CodePage::parse("1252"), Some(CodePage(1252)));
        assert_eq!(CodePage::parse("0"), Some(CodePage::ACP));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(CodePage::parse(""), None);
        assert_eq!(CodePage::parse("cp1252"), None);
        assert_eq!(CodePage::parse("-1"), None);
        assert_eq!(CodePage::parse("99999999999"), None);
    }

    #[test]
    fn test_default_is_utf8() {
        assert_eq!(CodePage::default(), CodePage::UTF8);
        if option_env!("DEBUG_STREAM_CODE_PAGE").is_none() {
            assert_eq!(CODE_PAGE, CodePage::UTF8);
        }
    }
}
