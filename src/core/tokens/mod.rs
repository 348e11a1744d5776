//! Token-stream printer
//!
//! The tree is flattened into string fragments and layout directives by
//! [`to_tokens`]; [`render_tokens`] lays them out with greedy word wrapping.

mod render;

pub use render::{render_tokens, render_tokens_with};

use std::fmt;

use crate::core::ast::{single_char_base, ArgList, Node};
use crate::data::{LINE_START_MACROS, PARAGRAPH_MACROS};

/// An element of the token stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text
    Text(String),
    /// Push one level of indentation
    Indent,
    /// Pop one level of indentation
    EndIndent,
    /// Suppress wrapping until the matching `EndNoWrap`
    NoWrap,
    EndNoWrap,
    Newline,
    /// Newline unless already at the start of a line
    EnsureNewline,
    /// Blank line unless one was just emitted
    EnsureParagraph,
    /// Blank line unless already at the start of a line
    PreferParagraph,
    ParagraphBreak,
    Space,
}

impl Token {
    pub fn text(s: impl Into<String>) -> Self {
        Token::Text(s.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Text(s) => write!(f, "{:?}", s),
            Token::Indent => f.write_str("indent"),
            Token::EndIndent => f.write_str("end-indent"),
            Token::NoWrap => f.write_str("no-wrap"),
            Token::EndNoWrap => f.write_str("end-no-wrap"),
            Token::Newline => f.write_str("newline"),
            Token::EnsureNewline => f.write_str("ensure-newline"),
            Token::EnsureParagraph => f.write_str("ensure-paragraph"),
            Token::PreferParagraph => f.write_str("prefer-paragraph"),
            Token::ParagraphBreak => f.write_str("paragraph-break"),
            Token::Space => f.write_str("space"),
        }
    }
}

/// Flatten a tree into its token stream
pub fn to_tokens(node: &Node) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_node(&mut tokens, node);
    tokens
}

fn push_all(tokens: &mut Vec<Token>, nodes: &[Node]) {
    for node in nodes {
        push_node(tokens, node);
    }
}

fn push_args(tokens: &mut Vec<Token>, args: &ArgList) {
    tokens.push(Token::text("["));
    push_all(tokens, &args.content);
    tokens.push(Token::text("]"));
}

/// `\begin{env}`, body, `\end{env}` with the body indented
fn push_block(tokens: &mut Vec<Token>, env: &str, args: Option<&ArgList>, body: &[Node]) {
    tokens.push(Token::EnsureNewline);
    tokens.push(Token::Text(format!("\\begin{{{}}}", env)));
    tokens.push(Token::Indent);
    if let Some(args) = args {
        push_args(tokens, args);
    }
    tokens.push(Token::Newline);
    push_all(tokens, body);
    tokens.push(Token::EndIndent);
    tokens.push(Token::Newline);
    tokens.push(Token::Text(format!("\\end{{{}}}", env)));
}

fn push_script(tokens: &mut Vec<Token>, mark: &str, base: Option<&Node>) {
    match base {
        None => tokens.push(Token::text(mark)),
        Some(base) => match single_char_base(base) {
            Some(c) => tokens.push(Token::Text(format!("{}{}", mark, c))),
            None if matches!(base, Node::Group { .. }) => {
                tokens.push(Token::text(mark));
                push_node(tokens, base);
            }
            None => {
                tokens.push(Token::Text(format!("{}{{", mark)));
                push_node(tokens, base);
                tokens.push(Token::text("}"));
            }
        },
    }
}

/// Literal text that must never be wrapped
fn push_opaque(tokens: &mut Vec<Token>, node: &Node) {
    tokens.push(Token::NoWrap);
    tokens.push(Token::Text(node.to_string()));
    tokens.push(Token::EndNoWrap);
}

fn push_node(tokens: &mut Vec<Token>, node: &Node) {
    match node {
        Node::NodeList { content } => push_all(tokens, content),
        Node::String { content } => tokens.push(Token::text(content.as_str())),
        Node::Whitespace => tokens.push(Token::Space),
        Node::Parbreak => tokens.push(Token::ParagraphBreak),
        Node::Macro { name, args } => {
            if LINE_START_MACROS.contains(name.as_str()) {
                tokens.push(Token::EnsureNewline);
            } else if PARAGRAPH_MACROS.contains(name.as_str()) {
                tokens.push(Token::PreferParagraph);
            }
            tokens.push(Token::Text(format!("\\{}", name)));
            if let Some(args) = args {
                push_args(tokens, args);
            }
        }
        Node::Environment { env, args, content } => {
            push_block(tokens, env, args.as_ref(), content)
        }
        Node::MathEnv { env, content } => push_block(tokens, env, None, content),
        Node::InlineMath { content } => {
            tokens.push(Token::text("$"));
            push_all(tokens, content);
            tokens.push(Token::text("$"));
        }
        Node::DisplayMath { content } => {
            tokens.push(Token::EnsureNewline);
            tokens.push(Token::text("\\["));
            tokens.push(Token::Indent);
            tokens.push(Token::Newline);
            push_all(tokens, content);
            tokens.push(Token::EndIndent);
            tokens.push(Token::Newline);
            tokens.push(Token::text("\\]"));
        }
        Node::Group { content } => {
            tokens.push(Token::NoWrap);
            tokens.push(Token::text("{"));
            push_all(tokens, content);
            tokens.push(Token::text("}"));
            tokens.push(Token::EndNoWrap);
        }
        Node::Subscript { content } => push_script(tokens, "_", content.as_deref()),
        Node::Superscript { content } => push_script(tokens, "^", content.as_deref()),
        Node::Verbatim { .. } => {
            tokens.push(Token::EnsureNewline);
            push_opaque(tokens, node);
        }
        Node::Verb { .. } => push_opaque(tokens, node),
        Node::CommentEnv { .. } => {
            tokens.push(Token::EnsureNewline);
            push_opaque(tokens, node);
            tokens.push(Token::Newline);
        }
        Node::Comment { content, sameline } => {
            if !sameline {
                tokens.push(Token::EnsureNewline);
            }
            tokens.push(Token::Text(format!("%{}", content)));
            tokens.push(Token::Newline);
        }
        Node::ArgList(args) => push_args(tokens, args),
    }
}
