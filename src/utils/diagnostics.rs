//! LaTeX diagnostics from the parser
//!
//! This module turns parse failures into reports a person can act on. It
//! recognises:
//!
//! - Unclosed groups (`{` without `}`)
//! - Mismatched or unclosed environments
//! - Unclosed inline or display math
//!
//! Besides the one error a failed parse produces, the check notes lines
//! whose trailing whitespace the printers will drop.
//!
//! ## Example
//!
//! ```rust
//! use texfmt::diagnostics::{check_latex, Severity};
//!
//! let report = check_latex(r"\begin{foo}");
//! assert!(report.has_errors());
//! assert_eq!(report.diagnostics[0].severity, Severity::Error);
//! ```

use std::fmt;

use crate::core::parser::parse_raw;
use crate::utils::error::{line_spans, Location, SyntaxError};

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Formatting will change this, nothing is wrong
    Note,
    /// The input cannot be formatted
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Error => "error",
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            Severity::Note => "\x1b[34m",
            Severity::Error => "\x1b[31m",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One finding, optionally pinned to a source position
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
    /// The source line `location` points into
    pub line_text: Option<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            location: None,
            line_text: None,
            help: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    /// Pin to `location`, quoting its line from `source`
    pub fn at(mut self, location: Location, source: &str) -> Self {
        self.line_text = line_spans(source)
            .get(location.line.saturating_sub(1))
            .map(|span| source[span.clone()].to_string());
        self.location = Some(location);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Build an error diagnostic from a parse failure in `source`
    pub fn from_syntax_error(err: &SyntaxError, source: &str) -> Self {
        let diag = Diagnostic::error(err.message.clone()).at(err.location, source);
        match suggest(err) {
            Some(help) => diag.with_help(help),
            None => diag,
        }
    }
}

/// Renders as
///
/// ```text
/// error: message
///  --> 2:3
///   |
/// 2 | {a
///   |   ^
///   = help: suggestion
/// ```
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        let location = match self.location {
            Some(location) => location,
            None => return Ok(()),
        };

        let number = location.line.to_string();
        let gutter = " ".repeat(number.len());
        write!(f, "\n{} --> {}", gutter, location)?;
        if let Some(ref text) = self.line_text {
            // Tabs are kept so the caret lines up under them
            let pad: String = text
                .chars()
                .take(location.column.saturating_sub(1))
                .map(|c| if c == '\t' { '\t' } else { ' ' })
                .collect();
            write!(f, "\n{} |\n{} | {}\n{} | {}^", gutter, number, text, gutter, pad)?;
        }
        if let Some(ref help) = self.help {
            write!(f, "\n{} = help: {}", gutter, help)?;
        }
        Ok(())
    }
}

// ============================================================================
// Suggestions
// ============================================================================

/// The environment whose `\end` the parser wanted, if any
fn expected_end(err: &SyntaxError) -> Option<String> {
    err.expected.iter().find_map(|e| {
        e.strip_prefix("\"\\\\end{")
            .and_then(|rest| rest.strip_suffix("}\""))
            .map(str::to_string)
    })
}

fn expects(err: &SyntaxError, literal: &str) -> bool {
    let quoted = format!("{:?}", literal);
    err.expected.iter().any(|e| *e == quoted)
}

/// A fix for the common ways a document fails to parse
fn suggest(err: &SyntaxError) -> Option<String> {
    if err.is_structural_mismatch() {
        let name = expected_end(err)?;
        return Some(match err.found {
            Some(_) => format!(
                "environment '{}' is closed by a different \\end; use \\end{{{}}}",
                name, name
            ),
            None => format!(
                "environment '{}' is never closed; add \\end{{{}}}",
                name, name
            ),
        });
    }
    if let Some(close) = ["$$", "$", "\\]", "\\)"].iter().find(|c| expects(err, c)) {
        return Some(format!("math is never closed; add {}", close));
    }
    if expects(err, "}") && err.found.is_none() {
        return Some("group is never closed; add '}'".to_string());
    }
    if expects(err, "]") {
        return Some("optional argument is never closed; add ']'".to_string());
    }
    None
}

// ============================================================================
// Checking
// ============================================================================

/// Everything `check_latex` found, in source order
#[derive(Debug, Default)]
pub struct CheckReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn notes(&self) -> usize {
        self.count(Severity::Note)
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// `"1 error, 2 notes"`, or `"no issues found"`
    pub fn summary(&self) -> String {
        let plural = |n: usize, word: &str| match n {
            1 => format!("1 {}", word),
            n => format!("{} {}s", n, word),
        };
        let parts: Vec<String> = [(self.errors(), "error"), (self.notes(), "note")]
            .into_iter()
            .filter(|&(n, _)| n > 0)
            .map(|(n, word)| plural(n, word))
            .collect();
        if parts.is_empty() {
            "no issues found".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Check LaTeX source for issues
///
/// A parse failure is reported as a single error. Notes follow for each
/// line with trailing whitespace.
pub fn check_latex(input: &str) -> CheckReport {
    let mut report = CheckReport::default();

    if let Err(err) = parse_raw(input) {
        report
            .diagnostics
            .push(Diagnostic::from_syntax_error(&err, input));
    }

    for span in line_spans(input) {
        let line = &input[span.clone()];
        let kept = line.trim_end_matches([' ', '\t']).len();
        if kept < line.len() {
            let location = Location::from_offset(input, span.start + kept);
            report
                .diagnostics
                .push(Diagnostic::note("trailing whitespace will be removed").at(location, input));
        }
    }

    report
}

/// Render a report for the terminal, ending with a summary line
pub fn format_diagnostics(report: &CheckReport, use_color: bool) -> String {
    const RESET: &str = "\x1b[0m";
    const GREEN: &str = "\x1b[32m";

    let paint = |color: &str, text: String| {
        if use_color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text
        }
    };

    let mut output = String::new();
    for diag in &report.diagnostics {
        output.push_str(&paint(diag.severity.ansi(), diag.to_string()));
        output.push_str("\n\n");
    }

    let summary_color = if report.has_errors() {
        Severity::Error.ansi()
    } else {
        GREEN
    };
    output.push_str(&paint(
        summary_color,
        format!("Summary: {}", report.summary()),
    ));
    output
}
