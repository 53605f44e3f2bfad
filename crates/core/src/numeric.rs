//! Number parsing for text-format literals.
//!
//! Integers accept a `0x`/`0X` hex prefix or a leading-zero octal prefix in
//! addition to decimal, and are checked against the range of the target
//! field type. Floating-point values additionally accept `inf`, `infinity`
//! and `nan` in any case.

use std::fmt;

/// Integer width and signedness a literal must fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerKind {
    /// `int32`, `sint32`, `sfixed32`, enum numbers.
    Int32,
    /// `uint32`, `fixed32`.
    UInt32,
    /// `int64`, `sint64`, `sfixed64`.
    Int64,
    /// `uint64`, `fixed64`.
    UInt64,
}

impl IntegerKind {
    /// Select the kind for a signedness and width.
    pub fn new(signed: bool, is_64: bool) -> Self {
        match (signed, is_64) {
            (true, false) => IntegerKind::Int32,
            (false, false) => IntegerKind::UInt32,
            (true, true) => IntegerKind::Int64,
            (false, true) => IntegerKind::UInt64,
        }
    }

    fn is_signed(self) -> bool {
        matches!(self, IntegerKind::Int32 | IntegerKind::Int64)
    }

    fn min(self) -> i128 {
        match self {
            IntegerKind::Int32 => i128::from(i32::MIN),
            IntegerKind::Int64 => i128::from(i64::MIN),
            IntegerKind::UInt32 | IntegerKind::UInt64 => 0,
        }
    }

    fn max(self) -> i128 {
        match self {
            IntegerKind::Int32 => i128::from(i32::MAX),
            IntegerKind::UInt32 => i128::from(u32::MAX),
            IntegerKind::Int64 => i128::from(i64::MAX),
            IntegerKind::UInt64 => i128::from(u64::MAX),
        }
    }
}

impl fmt::Display for IntegerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegerKind::Int32 => write!(f, "32-bit signed"),
            IntegerKind::UInt32 => write!(f, "32-bit unsigned"),
            IntegerKind::Int64 => write!(f, "64-bit signed"),
            IntegerKind::UInt64 => write!(f, "64-bit unsigned"),
        }
    }
}

/// A malformed or out-of-range numeric literal.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberFormatError {
    /// No digits after the sign or radix prefix.
    #[error("Number has no digits: \"{0}\"")]
    Empty(String),

    /// A `-` sign on a literal for an unsigned type.
    #[error("Number must be positive: {0}")]
    NotPositive(String),

    /// A character that is not a digit of the detected radix.
    #[error("Invalid digit in number: \"{0}\"")]
    InvalidDigit(String),

    /// The value does not fit the requested type.
    #[error("Number out of range for {kind} integer: {text}")]
    OutOfRange {
        /// The literal as written.
        text: String,
        /// The type it had to fit.
        kind: IntegerKind,
    },

    /// Not a floating-point literal.
    #[error("Invalid floating-point number: \"{0}\"")]
    InvalidFloat(String),
}

// ── Integers ────────────────────────────────────────────────────────────

/// Digit counts below this cannot overflow a `u64` in any radix we accept.
const FAST_PATH_DIGITS: usize = 16;

/// Parse an integer literal and check it against the signed/unsigned
/// 32/64-bit range selected by `signed` and `is_64`.
pub fn parse_integer(text: &str, signed: bool, is_64: bool) -> Result<i128, NumberFormatError> {
    let kind = IntegerKind::new(signed, is_64);

    let (negative, unsigned_text) = match text.strip_prefix('-') {
        Some(_) if !kind.is_signed() => {
            return Err(NumberFormatError::NotPositive(text.to_owned()));
        }
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (radix, digits) = if let Some(hex) = unsigned_text
        .strip_prefix("0x")
        .or_else(|| unsigned_text.strip_prefix("0X"))
    {
        (16, hex)
    } else if unsigned_text.len() > 1 && unsigned_text.starts_with('0') {
        (8, unsigned_text)
    } else {
        (10, unsigned_text)
    };

    if digits.is_empty() {
        return Err(NumberFormatError::Empty(text.to_owned()));
    }

    let out_of_range = || NumberFormatError::OutOfRange {
        text: text.to_owned(),
        kind,
    };

    let magnitude = if digits.len() < FAST_PATH_DIGITS {
        let mut acc: u64 = 0;
        for ch in digits.chars() {
            let d = ch
                .to_digit(radix)
                .ok_or_else(|| NumberFormatError::InvalidDigit(text.to_owned()))?;
            acc = acc * u64::from(radix) + u64::from(d);
        }
        u128::from(acc)
    } else {
        let mut acc: u128 = 0;
        for ch in digits.chars() {
            let d = ch
                .to_digit(radix)
                .ok_or_else(|| NumberFormatError::InvalidDigit(text.to_owned()))?;
            acc = acc
                .checked_mul(u128::from(radix))
                .and_then(|v| v.checked_add(u128::from(d)))
                .ok_or_else(out_of_range)?;
        }
        acc
    };

    let magnitude = i128::try_from(magnitude).map_err(|_| out_of_range())?;
    let value = if negative { -magnitude } else { magnitude };
    if value < kind.min() || value > kind.max() {
        return Err(out_of_range());
    }
    Ok(value)
}

fn narrow<T: TryFrom<i128>>(text: &str, value: i128, kind: IntegerKind) -> Result<T, NumberFormatError> {
    T::try_from(value).map_err(|_| NumberFormatError::OutOfRange {
        text: text.to_owned(),
        kind,
    })
}

/// Parse a signed 32-bit integer literal.
pub fn parse_i32(text: &str) -> Result<i32, NumberFormatError> {
    narrow(text, parse_integer(text, true, false)?, IntegerKind::Int32)
}

/// Parse an unsigned 32-bit integer literal.
pub fn parse_u32(text: &str) -> Result<u32, NumberFormatError> {
    narrow(text, parse_integer(text, false, false)?, IntegerKind::UInt32)
}

/// Parse a signed 64-bit integer literal.
pub fn parse_i64(text: &str) -> Result<i64, NumberFormatError> {
    narrow(text, parse_integer(text, true, true)?, IntegerKind::Int64)
}

/// Parse an unsigned 64-bit integer literal.
pub fn parse_u64(text: &str) -> Result<u64, NumberFormatError> {
    narrow(text, parse_integer(text, false, true)?, IntegerKind::UInt64)
}

// ── Floating point ──────────────────────────────────────────────────────

/// Parse a double literal, including `inf`, `-inf`, `infinity` and `nan`.
pub fn parse_double(text: &str) -> Result<f64, NumberFormatError> {
    if let Some(special) = parse_special(text) {
        return Ok(special);
    }
    text.parse::<f64>()
        .map_err(|_| NumberFormatError::InvalidFloat(text.to_owned()))
}

/// Parse a float literal. Like [`parse_double`], but a single trailing `f`
/// or `F` is also accepted.
pub fn parse_float(text: &str) -> Result<f32, NumberFormatError> {
    let body = match text.strip_suffix(['f', 'F']) {
        Some(body) if !body.is_empty() => body,
        _ => text,
    };
    if let Some(special) = parse_special(text).or_else(|| parse_special(body)) {
        return Ok(special as f32);
    }
    body.parse::<f32>()
        .map_err(|_| NumberFormatError::InvalidFloat(text.to_owned()))
}

fn parse_special(text: &str) -> Option<f64> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if body.eq_ignore_ascii_case("inf") || body.eq_ignore_ascii_case("infinity") {
        Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY })
    } else if !negative && body.eq_ignore_ascii_case("nan") {
        Some(f64::NAN)
    } else {
        None
    }
}
