//! LaTeX parser
//!
//! Turns source text into the raw parse tree:
//! - `grammar`: the ordered-choice grammar over an explicit position
//! - `raw`: the tagged records it produces
//!
//! Parsing is all-or-nothing. Input that the grammar cannot derive, or that
//! is left over after the top rule, yields a [`SyntaxError`] and no tree.

mod grammar;
pub mod raw;

pub use raw::{RawKind, RawNode, RawRecord};

use crate::utils::error::SyntaxError;
use grammar::Grammar;

/// Parse LaTeX source into a raw tree (an [`RawNode::Array`] of tokens)
pub fn parse_raw(text: &str) -> Result<RawNode, SyntaxError> {
    match Grammar::new(text).document() {
        Ok(tree) => {
            tracing::debug!(
                target: "texfmt::parse",
                input_len = text.len(),
                tokens = tree.len(),
                "parsed document"
            );
            Ok(tree)
        }
        Err(err) => {
            tracing::debug!(
                target: "texfmt::parse",
                location = %err.location,
                expected = ?err.expected,
                "syntax error"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_empty() {
        assert_eq!(parse_raw(""), Ok(RawNode::Array(vec![])));
    }

    #[test]
    fn test_parse_raw_error() {
        let err = parse_raw("$x").unwrap_err();
        assert_eq!(err.expected, vec!["\"$\"".to_string()]);
        assert_eq!(err.location.column, 3);
    }
}
