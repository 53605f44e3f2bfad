//! Position-tracked token cursor over text-format input.
//!
//! The whole input is held as one `&str`; tokens borrow from it. Token
//! classes, tried in order:
//!
//! - identifier: `[A-Za-z_][0-9A-Za-z_+-]*`
//! - number: `[.]?[0-9+-][0-9A-Za-z_.+-]*`
//! - quoted string: `'...'` or `"..."` with backslash escapes, ending at the
//!   matching quote, the end of the line, or the end of input
//! - anything else: one character
//!
//! Whitespace and `#` comments between tokens are skipped. Lines and
//! columns are 0-based internally and reported 1-based.

use crate::error::{Location, ParseError, ParseErrorKind};
use crate::escape::{EscapeError, unescape_bytes};
use crate::numeric::{self, NumberFormatError};

/// Cursor over the tokens of one input.
///
/// `consume_*` methods return a [`ParseError`] on mismatch. `try_consume_*`
/// methods return `None` and leave the cursor where it was.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    text: &'a str,
    /// Byte offset of the current token.
    pos: usize,
    /// Byte offset one past the current token.
    end: usize,
    current: &'a str,
    line: usize,
    column: usize,
    previous_line: usize,
    previous_column: usize,
    whitespace_after_previous: bool,
}

/// Why a quoted literal could not be read.
enum LiteralError {
    NotString,
    MissingEndQuote,
    Escape(EscapeError),
}

impl<'a> Tokenizer<'a> {
    /// Start tokenizing `text`; the first token is current.
    pub fn new(text: &'a str) -> Self {
        let mut tokenizer = Self {
            text,
            pos: 0,
            end: 0,
            current: "",
            line: 0,
            column: 0,
            previous_line: 0,
            previous_column: 0,
            whitespace_after_previous: false,
        };
        tokenizer.whitespace_after_previous = tokenizer.skip_whitespace();
        tokenizer.read_token();
        tokenizer
    }

    /// Text of the current token; empty at end of input.
    pub fn current(&self) -> &'a str {
        self.current
    }

    /// True once every token has been consumed.
    pub fn at_end(&self) -> bool {
        self.current.is_empty()
    }

    /// Location of the current token.
    pub fn location(&self) -> Location {
        Location::from_zero_based(self.line, self.column)
    }

    /// Location of the token consumed last.
    pub fn previous_location(&self) -> Location {
        Location::from_zero_based(self.previous_line, self.previous_column)
    }

    /// Whether whitespace or a comment separated the previous token from
    /// the current one.
    pub fn whitespace_after_previous(&self) -> bool {
        self.whitespace_after_previous
    }

    /// Advance to the next token.
    pub fn next_token(&mut self) {
        self.previous_line = self.line;
        self.previous_column = self.column;
        self.advance_to(self.end);
        self.whitespace_after_previous = self.skip_whitespace();
        self.read_token();
    }

    /// Build an error at the current token.
    pub fn parse_error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(Some(self.location()), message)
    }

    /// Build an error at the previously consumed token.
    pub fn parse_error_previous_token(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(Some(self.previous_location()), message)
    }

    /// True if the current token is exactly `text`.
    pub fn looking_at(&self, text: &str) -> bool {
        self.current == text
    }

    /// True if the current token could start an integer.
    pub fn looking_at_integer(&self) -> bool {
        matches!(
            self.current.as_bytes().first(),
            Some(b'0'..=b'9' | b'-' | b'+')
        )
    }

    /// Consume the current token if it is exactly `text`.
    pub fn try_consume(&mut self, text: &str) -> bool {
        if self.current == text {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `text` or fail with `Expected "text".`.
    pub fn consume(&mut self, text: &str) -> Result<(), ParseError> {
        if self.try_consume(text) {
            Ok(())
        } else {
            Err(self.parse_error(format!("Expected \"{text}\".")))
        }
    }

    /// Consume an identifier made of letters, digits, `_` and `.`.
    pub fn consume_identifier(&mut self) -> Result<&'a str, ParseError> {
        self.try_consume_identifier().ok_or_else(|| {
            self.parse_error(format!("Expected identifier. Found '{}'", self.current))
        })
    }

    /// Identifier probe; see [`Tokenizer::consume_identifier`].
    pub fn try_consume_identifier(&mut self) -> Option<&'a str> {
        let token = self.current;
        let valid = !token.is_empty()
            && token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.');
        if valid {
            self.next_token();
            Some(token)
        } else {
            None
        }
    }

    /// Consume a signed 32-bit integer.
    pub fn consume_i32(&mut self) -> Result<i32, ParseError> {
        self.consume_number(numeric::parse_i32, "integer")
    }

    /// Signed 32-bit probe.
    pub fn try_consume_i32(&mut self) -> Option<i32> {
        self.try_number(numeric::parse_i32)
    }

    /// Consume an unsigned 32-bit integer.
    pub fn consume_u32(&mut self) -> Result<u32, ParseError> {
        self.consume_number(numeric::parse_u32, "integer")
    }

    /// Unsigned 32-bit probe.
    pub fn try_consume_u32(&mut self) -> Option<u32> {
        self.try_number(numeric::parse_u32)
    }

    /// Consume a signed 64-bit integer.
    pub fn consume_i64(&mut self) -> Result<i64, ParseError> {
        self.consume_number(numeric::parse_i64, "integer")
    }

    /// Signed 64-bit probe.
    pub fn try_consume_i64(&mut self) -> Option<i64> {
        self.try_number(numeric::parse_i64)
    }

    /// Consume an unsigned 64-bit integer.
    pub fn consume_u64(&mut self) -> Result<u64, ParseError> {
        self.consume_number(numeric::parse_u64, "integer")
    }

    /// Unsigned 64-bit probe.
    pub fn try_consume_u64(&mut self) -> Option<u64> {
        self.try_number(numeric::parse_u64)
    }

    /// Consume a double, including `inf`, `-infinity` and `nan`.
    pub fn consume_f64(&mut self) -> Result<f64, ParseError> {
        self.consume_number(numeric::parse_double, "number")
    }

    /// Double probe.
    pub fn try_consume_f64(&mut self) -> Option<f64> {
        self.try_number(numeric::parse_double)
    }

    /// Consume a float; a trailing `f` is accepted.
    pub fn consume_f32(&mut self) -> Result<f32, ParseError> {
        self.consume_number(numeric::parse_float, "number")
    }

    /// Float probe.
    pub fn try_consume_f32(&mut self) -> Option<f32> {
        self.try_number(numeric::parse_float)
    }

    /// Consume `true`, `True`, `t`, `1`, `false`, `False`, `f` or `0`.
    pub fn consume_bool(&mut self) -> Result<bool, ParseError> {
        self.try_consume_bool().ok_or_else(|| {
            self.parse_error(format!(
                "Expected \"true\" or \"false\". Found \"{}\".",
                self.current
            ))
        })
    }

    /// Boolean probe.
    pub fn try_consume_bool(&mut self) -> Option<bool> {
        let value = match self.current {
            "true" | "True" | "t" | "1" => true,
            "false" | "False" | "f" | "0" => false,
            _ => return None,
        };
        self.next_token();
        Some(value)
    }

    /// Consume one or more adjacent string literals as UTF-8 text.
    pub fn consume_string(&mut self) -> Result<String, ParseError> {
        let start = self.location();
        let bytes = self.consume_byte_string()?;
        String::from_utf8(bytes).map_err(|_| {
            ParseError::new(Some(start), "String is not valid UTF-8.")
                .with_kind(ParseErrorKind::InvalidEscape(EscapeError::InvalidUtf8))
        })
    }

    /// String probe.
    pub fn try_consume_string(&mut self) -> Option<String> {
        let mut probe = self.clone();
        let bytes = probe.read_byte_string().ok()?;
        let text = String::from_utf8(bytes).ok()?;
        *self = probe;
        Some(text)
    }

    /// Consume one or more adjacent string literals as raw bytes.
    pub fn consume_byte_string(&mut self) -> Result<Vec<u8>, ParseError> {
        self.read_byte_string().map_err(|err| match err {
            LiteralError::NotString => self.parse_error("Expected string."),
            LiteralError::MissingEndQuote => self.parse_error("String missing ending quote."),
            LiteralError::Escape(e) => {
                self.parse_error(e.to_string())
                    .with_kind(ParseErrorKind::InvalidEscape(e))
            }
        })
    }

    /// Byte string probe.
    pub fn try_consume_byte_string(&mut self) -> Option<Vec<u8>> {
        let mut probe = self.clone();
        let bytes = probe.read_byte_string().ok()?;
        *self = probe;
        Some(bytes)
    }

    fn read_byte_string(&mut self) -> Result<Vec<u8>, LiteralError> {
        let mut bytes = self.read_string_piece()?;
        while self.current.starts_with(['"', '\'']) {
            bytes.extend(self.read_string_piece()?);
        }
        Ok(bytes)
    }

    fn read_string_piece(&mut self) -> Result<Vec<u8>, LiteralError> {
        let token = self.current;
        let Some(quote) = token.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            return Err(LiteralError::NotString);
        };
        if token.len() < 2 || !token.ends_with(quote) {
            return Err(LiteralError::MissingEndQuote);
        }
        let bytes = unescape_bytes(&token[1..token.len() - 1]).map_err(LiteralError::Escape)?;
        self.next_token();
        Ok(bytes)
    }

    fn consume_number<T>(
        &mut self,
        parse: fn(&str) -> Result<T, NumberFormatError>,
        what: &str,
    ) -> Result<T, ParseError> {
        match parse(self.current) {
            Ok(value) => {
                self.next_token();
                Ok(value)
            }
            Err(e) => Err(self
                .parse_error(format!("Couldn't parse {what}: {e}"))
                .with_kind(ParseErrorKind::NumberFormat(e))),
        }
    }

    fn try_number<T>(&mut self, parse: fn(&str) -> Result<T, NumberFormatError>) -> Option<T> {
        let value = parse(self.current).ok()?;
        self.next_token();
        Some(value)
    }

    /// Move `pos` forward to `target`, updating line and column.
    fn advance_to(&mut self, target: usize) {
        for c in self.text[self.pos..target].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.pos = target;
    }

    /// Skip whitespace and comments; true if anything was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let bytes = self.text.as_bytes();
        let mut i = self.pos;
        while let Some(&b) = bytes.get(i) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C => i += 1,
                b'#' => {
                    while let Some(&c) = bytes.get(i) {
                        if c == b'\n' {
                            break;
                        }
                        i += 1;
                    }
                }
                _ => break,
            }
        }
        let skipped = i > self.pos;
        self.advance_to(i);
        skipped
    }

    fn read_token(&mut self) {
        let rest = &self.text[self.pos..];
        let len = token_len(rest);
        self.end = self.pos + len;
        self.current = &rest[..len];
    }
}

fn is_identifier_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'+' | b'-')
}

fn is_number_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'+' | b'-')
}

fn is_number_start(b: u8) -> bool {
    b.is_ascii_digit() || b == b'+' || b == b'-'
}

/// Byte length of the token at the start of `rest` (0 at end of input).
fn token_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let Some(&first) = bytes.first() else {
        return 0;
    };
    let run = |from: usize, pred: fn(u8) -> bool| {
        from + bytes[from..].iter().take_while(|b| pred(**b)).count()
    };
    if first.is_ascii_alphabetic() || first == b'_' {
        return run(1, is_identifier_char);
    }
    if is_number_start(first) {
        return run(1, is_number_char);
    }
    if first == b'.' && bytes.get(1).copied().is_some_and(is_number_start) {
        return run(2, is_number_char);
    }
    if first == b'"' || first == b'\'' {
        return quoted_len(bytes, first);
    }
    rest.chars().next().map_or(0, char::len_utf8)
}

fn quoted_len(bytes: &[u8], quote: u8) -> usize {
    let mut i = 1;
    while let Some(&b) = bytes.get(i) {
        if b == quote {
            return i + 1;
        }
        match b {
            b'\n' => return i,
            b'\\' => match bytes.get(i + 1) {
                Some(b'\n') | None => return i + 1,
                Some(_) => i += 2,
            },
            _ => i += 1,
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<&str> {
        let mut t = Tokenizer::new(text);
        let mut out = Vec::new();
        while !t.at_end() {
            out.push(t.current());
            t.next_token();
        }
        out
    }

    #[test]
    fn token_classes() {
        assert_eq!(
            tokens("foo_bar: -1.5e+3 { 'a\\'b' } .5 x-y"),
            vec!["foo_bar", ":", "-1.5e+3", "{", "'a\\'b'", "}", ".5", "x-y"]
        );
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(
            tokens("  # comment\n a # trailing\n\t:\x0B1"),
            vec!["a", ":", "1"]
        );
    }

    #[test]
    fn unterminated_string_stops_at_newline() {
        assert_eq!(tokens("\"abc\nx"), vec!["\"abc", "x"]);
    }

    #[test]
    fn lone_dot_is_punctuation() {
        assert_eq!(tokens(". a"), vec![".", "a"]);
    }

    #[test]
    fn non_ascii_punctuation_is_one_char() {
        assert_eq!(tokens("é:"), vec!["é", ":"]);
    }

    #[test]
    fn tracks_lines_and_columns() {
        let mut t = Tokenizer::new("a\n  bb: 1");
        assert_eq!(t.location(), Location::new(1, 1));
        t.next_token();
        assert_eq!(t.current(), "bb");
        assert_eq!(t.location(), Location::new(2, 3));
        assert_eq!(t.previous_location(), Location::new(1, 1));
        assert!(t.whitespace_after_previous());
        t.next_token();
        assert_eq!(t.location(), Location::new(2, 5));
        assert!(!t.whitespace_after_previous());
    }

    #[test]
    fn consume_reports_expected_literal() {
        let mut t = Tokenizer::new("foo");
        let err = t.consume("{").unwrap_err();
        assert_eq!(err.to_string(), "1:1: Expected \"{\".");
        assert!(t.try_consume("foo"));
        assert!(t.at_end());
    }

    #[test]
    fn integers() {
        let mut t = Tokenizer::new("0x7fffffff -2147483648 037 2147483648");
        assert_eq!(t.consume_i32().unwrap(), 2_147_483_647);
        assert_eq!(t.consume_i32().unwrap(), -2_147_483_648);
        assert_eq!(t.consume_i32().unwrap(), 31);
        let err = t.consume_i32().unwrap_err();
        assert!(err.message().starts_with("Couldn't parse integer: "));
        assert!(matches!(err.kind(), ParseErrorKind::NumberFormat(_)));
        assert_eq!(t.try_consume_i32(), None);
        assert_eq!(t.try_consume_u32(), Some(2_147_483_648));
    }

    #[test]
    fn floats() {
        let mut t = Tokenizer::new("1.5 -inf nan 2f 1e400");
        assert_eq!(t.consume_f64().unwrap(), 1.5);
        assert_eq!(t.consume_f64().unwrap(), f64::NEG_INFINITY);
        assert!(t.consume_f64().unwrap().is_nan());
        assert_eq!(t.consume_f32().unwrap(), 2.0);
        assert_eq!(t.try_consume_f64(), Some(f64::INFINITY));
    }

    #[test]
    fn booleans() {
        let mut t = Tokenizer::new("true True t 1 false False f 0 yes");
        for expected in [true, true, true, true, false, false, false, false] {
            assert_eq!(t.consume_bool().unwrap(), expected);
        }
        let err = t.consume_bool().unwrap_err();
        assert_eq!(
            err.message(),
            "Expected \"true\" or \"false\". Found \"yes\"."
        );
    }

    #[test]
    fn adjacent_strings_concatenate() {
        let mut t = Tokenizer::new("'ab' \"c\\n\" 'd' x");
        assert_eq!(t.consume_string().unwrap(), "abc\nd");
        assert_eq!(t.current(), "x");
    }

    #[test]
    fn string_errors() {
        let err = Tokenizer::new("x").consume_string().unwrap_err();
        assert_eq!(err.message(), "Expected string.");
        let err = Tokenizer::new("'abc").consume_string().unwrap_err();
        assert_eq!(err.message(), "String missing ending quote.");
        let err = Tokenizer::new("'\\q'").consume_byte_string().unwrap_err();
        assert!(matches!(err.kind(), ParseErrorKind::InvalidEscape(_)));
        let err = Tokenizer::new("'\\377'").consume_string().unwrap_err();
        assert!(matches!(
            err.kind(),
            ParseErrorKind::InvalidEscape(EscapeError::InvalidUtf8)
        ));
    }

    #[test]
    fn failed_probe_does_not_advance() {
        let mut t = Tokenizer::new("'ok' 'bad\\q' next");
        assert_eq!(t.try_consume_byte_string(), None);
        assert_eq!(t.current(), "'ok'");
        assert_eq!(t.try_consume_identifier(), None);
        let mut t = Tokenizer::new("a.b");
        assert_eq!(t.try_consume_identifier(), Some("a"));
        assert_eq!(t.current(), ".");
    }
}
