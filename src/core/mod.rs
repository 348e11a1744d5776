//! Core formatting pipeline
//!
//! This module contains the stages between source text and printed output:
//! - `parser`: LaTeX grammar producing the raw tree
//! - `ast`: typed syntax tree, builder and navigation
//! - `normalize`: whitespace cleanup
//! - `tokens`: token-stream printer with greedy wrapping
//! - `doc`: layout IR and width-driven printer
//! - `options`: printer configuration

pub mod ast;
pub mod doc;
pub mod normalize;
pub mod options;
pub mod parser;
pub mod tokens;

// Re-export the pipeline entry points
pub use ast::{annotate, build_ast, walk, Annotations, ArgList, Node, NodePath, Slot, Step};
pub use doc::{render_doc, to_doc, Doc, PrintedDoc};
pub use normalize::{normalize_in_place, remove_excess_space};
pub use options::{PrintOptions, TextOptions};
pub use parser::{parse_raw, RawKind, RawNode, RawRecord};
pub use tokens::{render_tokens, render_tokens_with, to_tokens, Token};
