//! Parse errors and source locations.
//!
//! Every failure while reading text format surfaces as a [`ParseError`].
//! Its display form is `"<line>:<column>: <message>"` with 1-based
//! positions, or `"-1:-1: <message>"` when no position is known. Lower-level
//! causes (bad escapes, bad numbers, bad type URLs) are kept in
//! [`ParseErrorKind`] and exposed through [`std::error::Error::source`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::escape::EscapeError;
use crate::numeric::NumberFormatError;
use crate::registry::InvalidTypeUrl;

/// A 1-based line/column position in the parsed text.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl Location {
    /// Create a location from 1-based coordinates.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Create a location from the tokenizer's 0-based coordinates.
    pub(crate) fn from_zero_based(line: usize, column: usize) -> Self {
        Self {
            line: line + 1,
            column: column + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What went wrong, beyond the human-readable message.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The text does not follow the grammar.
    Syntax,
    /// The input names fields or extensions the message type does not
    /// have, and the parser was not configured to tolerate them.
    UnknownField {
        /// The first unresolved name that caused the failure.
        name: String,
    },
    /// A quoted literal contains a malformed escape.
    InvalidEscape(EscapeError),
    /// A numeric literal is malformed or out of range.
    NumberFormat(NumberFormatError),
    /// An `Any` type URL is malformed.
    InvalidTypeUrl(InvalidTypeUrl),
    /// Message nesting exceeds the parser's recursion limit.
    TooDeep,
}

/// A failure to parse text format, anchored to a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    location: Option<Location>,
    message: String,
    kind: ParseErrorKind,
}

impl ParseError {
    /// Create a syntax error.
    pub fn new(location: Option<Location>, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            kind: ParseErrorKind::Syntax,
        }
    }

    /// Replace the error kind (builder pattern).
    pub fn with_kind(mut self, kind: ParseErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Source position of the offending token, if known.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// 1-based line, or -1 when unknown.
    pub fn line(&self) -> i64 {
        self.location
            .and_then(|l| i64::try_from(l.line).ok())
            .unwrap_or(-1)
    }

    /// 1-based column, or -1 when unknown.
    pub fn column(&self) -> i64 {
        self.location
            .and_then(|l| i64::try_from(l.column).ok())
            .unwrap_or(-1)
    }

    /// The message without the location prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The error classification.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// The unresolved field or extension name, for unknown-field failures.
    pub fn unknown_field(&self) -> Option<&str> {
        match &self.kind {
            ParseErrorKind::UnknownField { name } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{location}: {}", self.message),
            None => write!(f, "-1:-1: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::InvalidEscape(e) => Some(e),
            ParseErrorKind::NumberFormat(e) => Some(e),
            ParseErrorKind::InvalidTypeUrl(e) => Some(e),
            ParseErrorKind::Syntax
            | ParseErrorKind::UnknownField { .. }
            | ParseErrorKind::TooDeep => None,
        }
    }
}
