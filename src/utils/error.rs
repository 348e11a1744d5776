//! Error handling for texfmt
//!
//! This module provides the syntax error reported by the grammar, the
//! crate-level error type, and the result alias used by the public API.

use std::fmt;
use std::ops::Range;

/// A position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// Byte offset from the start of the input
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in characters (1-indexed)
    pub column: usize,
}

impl Location {
    /// Compute the location of a byte offset in `source`
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let started: Vec<_> = line_spans(source)
            .into_iter()
            .take_while(|span| span.start <= offset)
            .collect();
        let line_start = started.last().map(|span| span.start).unwrap_or(0);
        Self {
            offset,
            line: started.len().max(1),
            column: source[line_start..offset].chars().count() + 1,
        }
    }
}

/// Byte ranges of the lines in `source`, terminators excluded
///
/// `\r\n`, `\n` and a lone `\r` each end a line, as in the grammar.
pub(crate) fn line_spans(source: &str) -> Vec<Range<usize>> {
    let bytes = source.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let width = match (bytes[i], bytes.get(i + 1)) {
            (b'\r', Some(b'\n')) => 2,
            (b'\r', _) | (b'\n', _) => 1,
            _ => {
                i += 1;
                continue;
            }
        };
        spans.push(start..i);
        i += width;
        start = i;
    }
    spans.push(start..bytes.len());
    spans
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The input could not be derived from the grammar
///
/// Carries the furthest position the parser reached and the alternatives
/// that were attempted there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human-readable message
    pub message: String,
    /// Alternatives tried at the failure position
    pub expected: Vec<String>,
    /// The text found at the failure position (`None` at end of input)
    pub found: Option<String>,
    /// Where parsing failed
    pub location: Location,
}

impl SyntaxError {
    /// Build an error with a PEG-style message from the expected set
    pub fn new(expected: Vec<String>, found: Option<String>, location: Location) -> Self {
        let message = build_message(&expected, found.as_deref());
        Self {
            message,
            expected,
            found,
            location,
        }
    }

    /// Whether the failure looks like a `\begin`/`\end` mismatch
    pub fn is_structural_mismatch(&self) -> bool {
        self.expected.iter().any(|e| e.starts_with("\"\\\\end{"))
    }
}

fn build_message(expected: &[String], found: Option<&str>) -> String {
    let expected_text = match expected {
        [] => "end of input".to_string(),
        [one] => one.clone(),
        [first, second] => format!("{} or {}", first, second),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
    };
    let found_text = match found {
        Some(text) => format!("{:?}", text),
        None => "end of input".to_string(),
    };
    format!("Expected {} but {} found.", expected_text, found_text)
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Crate-level error type
#[derive(Debug, Clone)]
pub enum FormatError {
    /// Input could not be parsed
    Syntax(SyntaxError),
    /// A tree operation addressed something that is not there
    MalformedTree { message: String },
    /// Printer options are out of range or unreadable
    InvalidOptions { message: String },
    /// IO error (binary only)
    Io { message: String },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Syntax(err) => write!(f, "{}", err),
            FormatError::MalformedTree { message } => write!(f, "Malformed tree: {}", message),
            FormatError::InvalidOptions { message } => write!(f, "Invalid options: {}", message),
            FormatError::Io { message } => write!(f, "IO error: {}", message),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Syntax(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SyntaxError> for FormatError {
    fn from(err: SyntaxError) -> Self {
        FormatError::Syntax(err)
    }
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        FormatError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for formatting operations
pub type FormatResult<T> = Result<T, FormatError>;

// Convenience constructors for errors
impl FormatError {
    pub fn malformed(message: impl Into<String>) -> Self {
        FormatError::MalformedTree {
            message: message.into(),
        }
    }

    pub fn invalid_options(message: impl Into<String>) -> Self {
        FormatError::InvalidOptions {
            message: message.into(),
        }
    }
}
