//! Document layout printer
//!
//! This module provides:
//! - `Doc`, the layout IR (groups, fills, lines, indentation)
//! - Builder functions for composing docs
//! - `render_doc`, the width-driven layout algorithm (see `printer`)
//! - `to_doc`, conversion from the syntax tree (see `from_ast`)

mod from_ast;
mod printer;

pub use from_ast::to_doc;
pub use printer::{render_doc, PrintedDoc};

/// Extra indentation carried by [`Doc::Align`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignKind {
    /// A fixed number of columns
    Width(usize),
    /// A literal prefix
    Str(String),
    /// Remove the innermost indentation level
    Dedent,
    /// Back to the indentation marked by `MarkRoot` (or none)
    DedentToRoot,
    /// Remember the current indentation for literal lines
    MarkRoot,
}

/// Layout IR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Doc {
    Text(String),
    Concat(Vec<Doc>),
    Group {
        contents: Box<Doc>,
        should_break: bool,
        /// Alternatives from least to most expanded
        expanded_states: Option<Vec<Doc>>,
    },
    /// Alternating content and separator parts, wrapped greedily
    Fill(Vec<Doc>),
    Indent(Box<Doc>),
    Align {
        kind: AlignKind,
        contents: Box<Doc>,
    },
    /// A space or nothing when flat, a newline when broken
    Line {
        hard: bool,
        soft: bool,
        literal: bool,
    },
    IfBreak {
        break_contents: Box<Doc>,
        flat_contents: Box<Doc>,
    },
    /// Deferred until the next newline
    LineSuffix(Box<Doc>),
    LineSuffixBoundary,
    /// Forces every enclosing group to break
    BreakParent,
    /// Drop trailing whitespace on the current line
    Trim,
    Cursor,
}

impl Doc {
    /// The empty document
    pub fn empty() -> Self {
        Doc::Concat(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Doc::Text(s) => s.is_empty(),
            Doc::Concat(parts) => parts.iter().all(Doc::is_empty),
            _ => false,
        }
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn text(s: impl Into<String>) -> Doc {
    Doc::Text(s.into())
}

pub fn concat(parts: Vec<Doc>) -> Doc {
    Doc::Concat(parts)
}

pub fn group(contents: Doc) -> Doc {
    Doc::Group {
        contents: Box::new(contents),
        should_break: false,
        expanded_states: None,
    }
}

/// A group that is broken regardless of width
pub fn broken_group(contents: Doc) -> Doc {
    Doc::Group {
        contents: Box::new(contents),
        should_break: true,
        expanded_states: None,
    }
}

/// Try `states` in order, printing the first that fits
///
/// Falls back to the last state in break mode. An empty list yields an
/// empty group.
pub fn conditional_group(states: Vec<Doc>) -> Doc {
    let contents = states.first().cloned().unwrap_or_else(Doc::empty);
    Doc::Group {
        contents: Box::new(contents),
        should_break: false,
        expanded_states: Some(states),
    }
}

pub fn fill(parts: Vec<Doc>) -> Doc {
    Doc::Fill(parts)
}

pub fn indent(contents: Doc) -> Doc {
    Doc::Indent(Box::new(contents))
}

pub fn align(kind: AlignKind, contents: Doc) -> Doc {
    Doc::Align {
        kind,
        contents: Box::new(contents),
    }
}

/// Space when flat, newline when broken
pub fn line() -> Doc {
    Doc::Line {
        hard: false,
        soft: false,
        literal: false,
    }
}

/// Nothing when flat, newline when broken
pub fn softline() -> Doc {
    Doc::Line {
        hard: false,
        soft: true,
        literal: false,
    }
}

/// Always a newline
pub fn hardline() -> Doc {
    concat(vec![
        Doc::Line {
            hard: true,
            soft: false,
            literal: false,
        },
        Doc::BreakParent,
    ])
}

/// Always a newline, without indentation
pub fn literalline() -> Doc {
    concat(vec![
        Doc::Line {
            hard: true,
            soft: false,
            literal: true,
        },
        Doc::BreakParent,
    ])
}

pub fn if_break(break_contents: Doc, flat_contents: Doc) -> Doc {
    Doc::IfBreak {
        break_contents: Box::new(break_contents),
        flat_contents: Box::new(flat_contents),
    }
}

pub fn line_suffix(contents: Doc) -> Doc {
    Doc::LineSuffix(Box::new(contents))
}

/// Interleave `docs` with copies of `separator`
pub fn join(separator: Doc, docs: Vec<Doc>) -> Doc {
    let mut parts = Vec::with_capacity(docs.len() * 2);
    for (i, doc) in docs.into_iter().enumerate() {
        if i > 0 {
            parts.push(separator.clone());
        }
        parts.push(doc);
    }
    concat(parts)
}
