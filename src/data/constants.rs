//! Character classes and name tables used by the grammar and the printers
//!
//! This module contains the fixed vocabularies of the formatter:
//! - Math environment names recognised by the grammar
//! - Character classes (punctuation, special characters)
//! - Macros that force line structure in the printers

use phf::phf_set;

// ============================================================================
// Environment names
// ============================================================================

/// Environments whose body is parsed in math mode.
///
/// This set is closed: any other environment is parsed as a generic text
/// environment, even when its contents are mathematical.
pub static MATH_ENVIRONMENTS: phf::Set<&'static str> = phf_set! {
    "equation",
    "equation*",
    "align",
    "align*",
    "alignat",
    "alignat*",
    "gather",
    "gather*",
    "multline",
    "multline*",
    "flalign",
    "flalign*",
    "split",
    "math",
    "displaymath",
};

/// Name of the environment whose body is kept byte-for-byte.
pub const VERBATIM_ENV: &str = "verbatim";

/// Name of the environment whose body is a block comment.
pub const COMMENT_ENV: &str = "comment";

// ============================================================================
// Character classes
// ============================================================================

/// Punctuation characters; each one is a string token of its own in text mode.
pub static PUNCTUATION: phf::Set<char> = phf_set! {
    '.', ',', ';', ':', '-', '*', '/', '(', ')', '!', '?', '=', '+', '<', '>', '[', ']',
};

/// Characters that end a run of plain text.
pub static SPECIAL_CHARS: phf::Set<char> = phf_set! {
    '\\', '%', '{', '}', '$', '&', '#', '^', '_', '\0', ' ', '\t', '\n', '\r',
};

/// A token starting with one of these never begins a wrapped line.
pub static NO_WRAP_LEADING: phf::Set<char> = phf_set! {
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '\\',
    '~', '(', ')',
};

// ============================================================================
// Macros with line structure
// ============================================================================

/// Macros that always start on a fresh line.
pub static LINE_START_MACROS: phf::Set<&'static str> = phf_set! {
    "usepackage",
    "newcommand",
};

/// Macros that prefer to start a new paragraph.
pub static PARAGRAPH_MACROS: phf::Set<&'static str> = phf_set! {
    "item",
};

/// Check if a name belongs to the closed set of math environments
#[inline]
pub fn is_math_environment(name: &str) -> bool {
    MATH_ENVIRONMENTS.contains(name)
}

/// Horizontal whitespace (`sp` in the grammar)
#[inline]
pub fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Characters allowed in a named macro (`\foo`)
#[inline]
pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Check if a character may appear inside a run of plain text
#[inline]
pub fn is_plain_char(c: char) -> bool {
    !SPECIAL_CHARS.contains(&c) && !PUNCTUATION.contains(&c)
}

/// Check if a string token may be moved to the start of a new line
#[inline]
pub fn is_wrappable(token: &str) -> bool {
    match token.chars().next() {
        Some(c) => !NO_WRAP_LEADING.contains(&c),
        None => false,
    }
}
