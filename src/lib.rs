//! # texfmt
//!
//! LaTeX parser and pretty-printer written in Rust.
//!
//! ## Features
//!
//! - **Faithful Parsing**: PEG grammar with math mode, environments, verbatim
//!   passthrough and comments
//! - **Typed Tree**: a closed node enum with path-based navigation and
//!   parent/sibling annotation
//! - **Whitespace Cleanup**: redundant spaces and blank lines are collapsed
//! - **Two Printers**: a greedy word-wrapping token printer and a
//!   group/fill layout engine
//!
//! ## Usage Examples
//!
//! ### Token Printer
//!
//! ```rust
//! use texfmt::{print_as_text, Input};
//!
//! let out = print_as_text(Input::Text("Hello,   world.\n\n\n\nBye.")).unwrap();
//! assert_eq!(out, "Hello, world.\n\nBye.");
//! ```
//!
//! ### Layout Engine
//!
//! ```rust
//! use texfmt::{print_with_layout_engine, Input, PrintOptions};
//!
//! let out = print_with_layout_engine(
//!     Input::Text(r"\begin{itemize}\item one \item two\end{itemize}"),
//!     &PrintOptions::spaces(2),
//! )
//! .unwrap();
//! assert_eq!(out, "\\begin{itemize}\n  \\item one\n\n  \\item two\n\\end{itemize}");
//! ```
//!
//! ### Working With the Tree
//!
//! ```rust
//! use texfmt::{annotate, parse, NodePath, Slot};
//!
//! let root = parse(r"\emph x").unwrap();
//! let annotations = annotate(&root);
//! let first = NodePath::root().child(Slot::Content, 0);
//! assert_eq!(root.at(&first).and_then(|n| n.name()), Some("emph"));
//! assert_eq!(annotations.parent(&first), Some(&NodePath::root()));
//! ```

/// Core formatting pipeline
pub mod core;

/// Data layer - character classes and name tables
pub mod data;

/// Utility modules
pub mod utils;

// Re-export the pipeline
pub use core::ast::{annotate, build_ast, walk, Annotations, ArgList, Node, NodePath, Slot, Step};
pub use core::doc::{render_doc, to_doc, Doc, PrintedDoc};
pub use core::normalize::{normalize_in_place, remove_excess_space};
pub use core::options::{PrintOptions, TextOptions};
pub use core::parser::{parse_raw, RawKind, RawNode, RawRecord};
pub use core::tokens::{render_tokens, render_tokens_with, to_tokens, Token};

// Re-export data modules
pub use data::constants;

// Re-export utilities
pub use utils::diagnostics;
pub use utils::error::{FormatError, FormatResult, Location, SyntaxError};

/// What the printers accept: source text or an already-built tree
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    /// Parsed and normalized before printing
    Text(&'a str),
    /// Printed as given
    Ast(&'a Node),
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(text: &'a str) -> Self {
        Input::Text(text)
    }
}

impl<'a> From<&'a Node> for Input<'a> {
    fn from(node: &'a Node) -> Self {
        Input::Ast(node)
    }
}

/// Parse LaTeX source into a typed tree
///
/// The tree is not normalized; see [`remove_excess_space`].
pub fn parse(text: &str) -> FormatResult<Node> {
    let raw = parse_raw(text)?;
    build_ast(raw)
}

/// Parse and normalize in one step
pub fn parse_normalized(text: &str) -> FormatResult<Node> {
    parse(text).map(remove_excess_space)
}

/// Resolve an input to a tree, running `f` on it
fn with_tree<T>(input: Input<'_>, f: impl FnOnce(&Node) -> T) -> FormatResult<T> {
    match input {
        Input::Text(text) => {
            let ast = parse_normalized(text)?;
            Ok(f(&ast))
        }
        Input::Ast(ast) => Ok(f(ast)),
    }
}

/// Print with the token printer and default [`TextOptions`]
///
/// # Arguments
/// * `input` - LaTeX source or a tree
///
/// # Returns
/// Formatted LaTeX, or the syntax error for unparsable source
pub fn print_as_text(input: Input<'_>) -> FormatResult<String> {
    print_as_text_with(input, &TextOptions::default())
}

/// Print with the token printer and custom options
pub fn print_as_text_with(input: Input<'_>, options: &TextOptions) -> FormatResult<String> {
    options.validate()?;
    with_tree(input, |ast| render_tokens_with(&to_tokens(ast), options))
}

/// Print with the layout engine
///
/// # Arguments
/// * `input` - LaTeX source or a tree
/// * `options` - Width and indentation settings
///
/// # Returns
/// Formatted LaTeX, or the syntax error for unparsable source
pub fn print_with_layout_engine(input: Input<'_>, options: &PrintOptions) -> FormatResult<String> {
    options.validate()?;
    with_tree(input, |ast| render_doc(to_doc(ast), options).formatted)
}
