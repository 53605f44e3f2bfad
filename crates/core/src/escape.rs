//! Byte and text escaping for quoted text-format literals.
//!
//! [`escape_bytes`] is canonical: printable ASCII passes through, the usual
//! C escapes are named (`\n`, `\t`, `\"`, ...), and every other byte becomes
//! a three-digit octal escape. [`unescape_bytes`] is permissive and also
//! accepts hex (`\x`), and Unicode (`\u`, `\U`) escapes.

/// A malformed backslash escape inside a quoted literal.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EscapeError {
    /// The literal ends in a lone backslash.
    #[error("Invalid escape sequence: '\\' at end of string.")]
    TrailingBackslash,

    /// A backslash is followed by a character that names no escape.
    #[error("Invalid escape sequence: '\\{0}'")]
    Unsupported(char),

    /// `\x` is not followed by any hex digit.
    #[error("Invalid escape sequence: '\\x' with no digits")]
    HexWithoutDigits,

    /// `\u` or `\U` is followed by too few (or non-hex) digits.
    #[error("Invalid escape sequence: '\\{escape}' with too few hex chars")]
    IncompleteUnicode {
        /// Either `u` or `U`.
        escape: char,
    },

    /// `\U` names a value beyond U+10FFFF.
    #[error("Invalid escape sequence: '\\U{0}' is not a valid code point value")]
    InvalidCodePoint(String),

    /// `\u` or `\U` names a UTF-16 surrogate.
    #[error("Invalid escape sequence: '\\{0}' refers to a surrogate")]
    Surrogate(String),

    /// The unescaped bytes of a text literal are not valid UTF-8.
    #[error("Unescaped text is not valid UTF-8")]
    InvalidUtf8,
}

// ── Escaping ────────────────────────────────────────────────────────────

/// Escape arbitrary bytes for use inside a quoted literal.
///
/// Total over all inputs; `unescape_bytes(&escape_bytes(b)) == b` for every
/// byte sequence `b`.
pub fn escape_bytes(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input {
        push_escaped_byte(&mut out, b);
    }
    out
}

/// Escape the UTF-8 encoding of `input`, including every non-ASCII byte.
pub fn escape_text(input: &str) -> String {
    escape_bytes(input.as_bytes())
}

/// Escape ASCII control characters, quotes and backslashes, but keep
/// non-ASCII characters verbatim.
pub fn escape_text_preserving_utf8(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii() {
            push_escaped_byte(&mut out, ch as u8);
        } else {
            out.push(ch);
        }
    }
    out
}

fn push_escaped_byte(out: &mut String, b: u8) {
    match b {
        0x07 => out.push_str("\\a"),
        0x08 => out.push_str("\\b"),
        0x0c => out.push_str("\\f"),
        b'\n' => out.push_str("\\n"),
        b'\r' => out.push_str("\\r"),
        b'\t' => out.push_str("\\t"),
        0x0b => out.push_str("\\v"),
        b'\\' => out.push_str("\\\\"),
        b'\'' => out.push_str("\\'"),
        b'"' => out.push_str("\\\""),
        0x20..=0x7e => out.push(char::from(b)),
        _ => {
            out.push('\\');
            out.push(char::from(b'0' + (b >> 6)));
            out.push(char::from(b'0' + ((b >> 3) & 7)));
            out.push(char::from(b'0' + (b & 7)));
        }
    }
}

// ── Unescaping ──────────────────────────────────────────────────────────

/// Decode the body of a quoted literal (without its quotes) into bytes.
///
/// Octal escapes take up to three digits and are truncated to a byte;
/// `\x` takes one or two hex digits; `\u` takes exactly four and `\U`
/// exactly eight, both emitted as UTF-8.
pub fn unescape_bytes(input: &str) -> Result<Vec<u8>, EscapeError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        i += 1;
        if c != b'\\' {
            out.push(c);
            continue;
        }

        let Some(&e) = bytes.get(i) else {
            return Err(EscapeError::TrailingBackslash);
        };
        i += 1;

        match e {
            b'0'..=b'7' => {
                let mut code = u32::from(e - b'0');
                for _ in 0..2 {
                    match bytes.get(i) {
                        Some(&d @ b'0'..=b'7') => {
                            code = code * 8 + u32::from(d - b'0');
                            i += 1;
                        }
                        _ => break,
                    }
                }
                out.push((code & 0xff) as u8);
            }
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'\\' | b'\'' | b'"' | b'?' => out.push(e),
            b'x' => {
                let Some(mut code) = bytes.get(i).copied().and_then(hex_digit_value) else {
                    return Err(EscapeError::HexWithoutDigits);
                };
                i += 1;
                if let Some(low) = bytes.get(i).copied().and_then(hex_digit_value) {
                    code = (code << 4) | low;
                    i += 1;
                }
                out.push(code);
            }
            b'u' => {
                let code = read_hex(bytes, i, 4).ok_or(EscapeError::IncompleteUnicode { escape: 'u' })?;
                let digits = &input[i..i + 4];
                i += 4;
                if is_surrogate(code) {
                    return Err(EscapeError::Surrogate(format!("u{digits}")));
                }
                push_code_point(&mut out, code, digits)?;
            }
            b'U' => {
                let code = read_hex(bytes, i, 8).ok_or(EscapeError::IncompleteUnicode { escape: 'U' })?;
                let digits = &input[i..i + 8];
                i += 8;
                if code > 0x10_ffff {
                    return Err(EscapeError::InvalidCodePoint(digits.to_owned()));
                }
                if is_surrogate(code) {
                    return Err(EscapeError::Surrogate(format!("U{digits}")));
                }
                push_code_point(&mut out, code, digits)?;
            }
            _ => {
                // `i - 1` is the escape character, which may be multi-byte.
                let ch = input[i - 1..].chars().next().unwrap_or(char::from(e));
                return Err(EscapeError::Unsupported(ch));
            }
        }
    }

    Ok(out)
}

/// Decode the body of a quoted literal into a UTF-8 string.
pub fn unescape_text(input: &str) -> Result<String, EscapeError> {
    String::from_utf8(unescape_bytes(input)?).map_err(|_| EscapeError::InvalidUtf8)
}

fn push_code_point(out: &mut Vec<u8>, code: u32, digits: &str) -> Result<(), EscapeError> {
    let ch = char::from_u32(code).ok_or_else(|| EscapeError::InvalidCodePoint(digits.to_owned()))?;
    let mut buf = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    Ok(())
}

fn is_surrogate(code: u32) -> bool {
    (0xd800..=0xdfff).contains(&code)
}

/// Read exactly `count` hex digits starting at `start`.
fn read_hex(bytes: &[u8], start: usize, count: usize) -> Option<u32> {
    let digits = bytes.get(start..start.checked_add(count)?)?;
    digits
        .iter()
        .try_fold(0u32, |acc, &d| Some((acc << 4) | u32::from(hex_digit_value(d)?)))
}

/// Convert a single ASCII hex digit to its numeric value (0-15).
fn hex_digit_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}
