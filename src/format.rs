//! Formatting state, stream directives and the wide-character buffer.
//!
//! A [`WideBuffer`] holds pending UTF-16 text together with the formatting
//! state that directives such as [`Directive::Hex`] or [`Directive::Width`]
//! change. Values reach the buffer through the [`Insert`] trait.

use std::ffi::OsStr;
use std::fmt;

/// Integer base used for formatted integer output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Dec,
    Hex,
    Oct,
}

/// Floating point notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatMode {
    /// Shortest round-trip form, or `%g` style once a precision is set
    Default,
    /// Fixed number of decimals (`%f`)
    Fixed,
    /// Mantissa and exponent (`%e`)
    Scientific,
}

/// Side of the field on which fill characters are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Pad before the value (default)
    Right,
    /// Pad after the value
    Left,
}

/// Stream formatting directive.
///
/// Directives change how later values are rendered. Only [`Directive::Endl`]
/// produces text of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Dec,
    Hex,
    Oct,
    /// Prefix hexadecimal output with `0x` and octal output with `0`
    ShowBase,
    NoShowBase,
    /// Upper-case hex digits, base prefix and exponent marker
    Uppercase,
    NoUppercase,
    /// Prefix non-negative numbers with `+`
    ShowPos,
    NoShowPos,
    /// Minimum field width for the next formatted value only
    Width(usize),
    /// Fill character used to reach the field width
    Fill(char),
    Left,
    Right,
    /// Digits after the decimal point (fixed, scientific) or significant digits (default).
    /// Capped at [`MAX_PRECISION`].
    Precision(usize),
    Fixed,
    Scientific,
    DefaultFloat,
    /// Append a line feed
    Endl,
}

/// Formatting state carried by a buffer across appends and flushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatState {
    pub radix: Radix,
    pub float_mode: FloatMode,
    pub align: Align,
    pub width: usize,
    pub fill: char,
    pub precision: Option<usize>,
    pub show_base: bool,
    pub uppercase: bool,
    pub show_pos: bool,
}

/// Precision used by fixed and scientific notation when none was set
const DEFAULT_PRECISION: usize = 6;

/// Largest precision a directive can set
pub const MAX_PRECISION: usize = u16::MAX as usize;

impl Default for FormatState {
    fn default() -> Self {
        Self {
            radix: Radix::Dec,
            float_mode: FloatMode::Default,
            align: Align::Right,
            width: 0,
            fill: ' ',
            precision: None,
            show_base: false,
            uppercase: false,
            show_pos: false,
        }
    }
}

impl FormatState {
    /// Render an integer according to radix, base prefix and sign flags.
    pub fn render_integer<T>(&self, value: T, negative: bool) -> String
    where
        T: fmt::Display + fmt::LowerHex + fmt::UpperHex + fmt::Octal,
    {
        match self.radix {
            Radix::Dec => {
                let digits = value.to_string();
                if self.show_pos && !negative {
                    format!("+{}", digits)
                } else {
                    digits
                }
            }
            Radix::Hex => {
                let digits = if self.uppercase {
                    format!("{:X}", value)
                } else {
                    format!("{:x}", value)
                };
                match (self.show_base && digits != "0", self.uppercase) {
                    (true, true) => format!("0X{}", digits),
                    (true, false) => format!("0x{}", digits),
                    (false, _) => digits,
                }
            }
            Radix::Oct => {
                let digits = format!("{:o}", value);
                if self.show_base && digits != "0" {
                    format!("0{}", digits)
                } else {
                    digits
                }
            }
        }
    }

    /// Render a floating point value according to notation and precision.
    pub fn render_float<T>(&self, value: T) -> String
    where
        T: fmt::Display + fmt::LowerExp + Copy,
    {
        let text = match (self.float_mode, self.precision) {
            (FloatMode::Default, None) => value.to_string(),
            (FloatMode::Default, Some(precision)) => self.general(value, precision.max(1)),
            (FloatMode::Fixed, precision) => {
                format!("{:.*}", precision.unwrap_or(DEFAULT_PRECISION), value)
            }
            (FloatMode::Scientific, precision) => {
                let sci = format!("{:.*e}", precision.unwrap_or(DEFAULT_PRECISION), value);
                match sci.split_once('e') {
                    Some((mantissa, exp)) => {
                        self.exponent_form(mantissa, exp.parse().unwrap_or(0))
                    }
                    None => sci,
                }
            }
        };

        if self.show_pos && !text.starts_with('-') {
            format!("+{}", text)
        } else {
            text
        }
    }

    /// `%g`: shortest of fixed and scientific for `precision` significant digits.
    fn general<T>(&self, value: T, precision: usize) -> String
    where
        T: fmt::Display + fmt::LowerExp + Copy,
    {
        let sci = format!("{:.*e}", precision - 1, value);
        let Some((mantissa, exp)) = sci.split_once('e') else {
            // inf and NaN
            return sci;
        };
        let exp: i32 = exp.parse().unwrap_or(0);

        if exp < -4 || exp >= precision as i32 {
            self.exponent_form(strip_trailing_zeros(mantissa), exp)
        } else {
            let decimals = (precision as i32 - 1 - exp).max(0) as usize;
            strip_trailing_zeros(&format!("{:.*}", decimals, value)).to_string()
        }
    }

    fn exponent_form(&self, mantissa: &str, exp: i32) -> String {
        format!(
            "{}{}{}{:02}",
            mantissa,
            if self.uppercase { 'E' } else { 'e' },
            if exp < 0 { '-' } else { '+' },
            exp.unsigned_abs()
        )
    }
}

fn strip_trailing_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Pending UTF-16 text plus the formatting state applied to it.
#[derive(Debug, Default)]
pub struct WideBuffer {
    units: Vec<u16>,
    state: FormatState,
}

impl WideBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormatState {
        &self.state
    }

    /// Pending UTF-16 units
    pub fn as_slice(&self) -> &[u16] {
        &self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Drop pending text. The formatting state is kept.
    pub fn clear(&mut self) {
        self.units.clear();
    }

    /// Apply a directive to the formatting state.
    pub fn apply(&mut self, directive: Directive) {
        let state = &mut self.state;
        match directive {
            Directive::Dec => state.radix = Radix::Dec,
            Directive::Hex => state.radix = Radix::Hex,
            Directive::Oct => state.radix = Radix::Oct,
            Directive::ShowBase => state.show_base = true,
            Directive::NoShowBase => state.show_base = false,
            Directive::Uppercase => state.uppercase = true,
            Directive::NoUppercase => state.uppercase = false,
            Directive::ShowPos => state.show_pos = true,
            Directive::NoShowPos => state.show_pos = false,
            Directive::Width(width) => state.width = width,
            Directive::Fill(fill) => state.fill = fill,
            Directive::Left => state.align = Align::Left,
            Directive::Right => state.align = Align::Right,
            Directive::Precision(precision) => {
                state.precision = Some(precision.min(MAX_PRECISION))
            }
            Directive::Fixed => state.float_mode = FloatMode::Fixed,
            Directive::Scientific => state.float_mode = FloatMode::Scientific,
            Directive::DefaultFloat => state.float_mode = FloatMode::Default,
            Directive::Endl => self.units.push(u16::from(b'\n')),
        }
    }

    /// Append a formatted value, padded to the pending field width.
    pub fn put_str(&mut self, text: &str) {
        let len = text.encode_utf16().count();
        self.put_padded(len, |units| units.extend(text.encode_utf16()));
    }

    /// Append wide text unchanged, padded to the pending field width.
    pub fn put_wide(&mut self, text: &[u16]) {
        self.put_padded(text.len(), |units| units.extend_from_slice(text));
    }

    fn put_padded(&mut self, len: usize, write: impl FnOnce(&mut Vec<u16>)) {
        // Width applies to one value only
        let pad = std::mem::take(&mut self.state.width).saturating_sub(len);
        let mut fill = [0u16; 2];
        let fill = self.state.fill.encode_utf16(&mut fill);

        match self.state.align {
            Align::Right => {
                for _ in 0..pad {
                    self.units.extend_from_slice(fill);
                }
                write(&mut self.units);
            }
            Align::Left => {
                write(&mut self.units);
                for _ in 0..pad {
                    self.units.extend_from_slice(fill);
                }
            }
        }
    }
}

/// Values that can be appended to a debug stream.
///
/// Implemented for the primitive types, Rust and wide strings, directives and
/// `fmt::Arguments`. Any other type that implements `fmt::Display` or
/// `fmt::Debug` can be appended through [`display`] or [`debug`].
pub trait Insert {
    fn insert(self, out: &mut WideBuffer);
}

macro_rules! insert_signed {
    ($($t:ty),*) => {$(
        impl Insert for $t {
            fn insert(self, out: &mut WideBuffer) {
                let text = out.state().render_integer(self, self < 0);
                out.put_str(&text);
            }
        }
    )*};
}

macro_rules! insert_unsigned {
    ($($t:ty),*) => {$(
        impl Insert for $t {
            fn insert(self, out: &mut WideBuffer) {
                let text = out.state().render_integer(self, false);
                out.put_str(&text);
            }
        }
    )*};
}

macro_rules! insert_float {
    ($($t:ty),*) => {$(
        impl Insert for $t {
            fn insert(self, out: &mut WideBuffer) {
                let text = out.state().render_float(self);
                out.put_str(&text);
            }
        }
    )*};
}

insert_signed!(i8, i16, i32, i64, i128, isize);
insert_unsigned!(u8, u16, u32, u64, u128, usize);
insert_float!(f32, f64);

impl Insert for bool {
    fn insert(self, out: &mut WideBuffer) {
        out.put_str(if self { "true" } else { "false" });
    }
}

impl Insert for char {
    fn insert(self, out: &mut WideBuffer) {
        let mut utf8 = [0u8; 4];
        out.put_str(self.encode_utf8(&mut utf8));
    }
}

impl Insert for &str {
    fn insert(self, out: &mut WideBuffer) {
        out.put_str(self);
    }
}

impl Insert for String {
    fn insert(self, out: &mut WideBuffer) {
        out.put_str(&self);
    }
}

impl Insert for &String {
    fn insert(self, out: &mut WideBuffer) {
        out.put_str(self);
    }
}

impl Insert for &[u16] {
    fn insert(self, out: &mut WideBuffer) {
        out.put_wide(self);
    }
}

impl Insert for Vec<u16> {
    fn insert(self, out: &mut WideBuffer) {
        out.put_wide(&self);
    }
}

impl Insert for &Vec<u16> {
    fn insert(self, out: &mut WideBuffer) {
        out.put_wide(self);
    }
}

impl Insert for &OsStr {
    #[cfg(windows)]
    fn insert(self, out: &mut WideBuffer) {
        use std::os::windows::ffi::OsStrExt;

        let wide: Vec<u16> = self.encode_wide().collect();
        out.put_wide(&wide);
    }

    #[cfg(not(windows))]
    fn insert(self, out: &mut WideBuffer) {
        out.put_str(&self.to_string_lossy());
    }
}

impl Insert for fmt::Arguments<'_> {
    fn insert(self, out: &mut WideBuffer) {
        match self.as_str() {
            Some(text) => out.put_str(text),
            None => out.put_str(&self.to_string()),
        }
    }
}

impl Insert for Directive {
    fn insert(self, out: &mut WideBuffer) {
        out.apply(self);
    }
}

/// Adapter appending a value through its `fmt::Display` implementation.
#[derive(Debug, Clone, Copy)]
pub struct DisplayValue<T>(pub T);

/// Adapter appending a value through its `fmt::Debug` implementation.
#[derive(Debug, Clone, Copy)]
pub struct DebugValue<T>(pub T);

/// Append `value` using its `fmt::Display` implementation.
pub fn display<T: fmt::Display>(value: T) -> DisplayValue<T> {
    DisplayValue(value)
}

/// Append `value` using its `fmt::Debug` implementation.
pub fn debug<T: fmt::Debug>(value: T) -> DebugValue<T> {
    DebugValue(value)
}

impl<T: fmt::Display> Insert for DisplayValue<T> {
    fn insert(self, out: &mut WideBuffer) {
        out.put_str(&self.0.to_string());
    }
}

impl<T: fmt::Debug> Insert for DebugValue<T> {
    fn insert(self, out: &mut WideBuffer) {
        out.put_str(&format!("{:?}", self.0));
    }
}
