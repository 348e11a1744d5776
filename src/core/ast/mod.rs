//! Typed syntax tree
//!
//! [`Node`] is the closed set of node shapes the printers understand. It is
//! built from the raw parse tree by [`build_ast`], rewritten in place by the
//! normalizer, and read by the printers.
//!
//! Parent and sibling relations are not stored in the tree; see
//! [`annotate`] for the derived view.

pub mod annotate;

pub use annotate::{annotate, walk, Annotations, NodePath, Slot, Step};

use std::fmt;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::core::parser::{RawKind, RawNode, RawRecord};
use crate::data::{COMMENT_ENV, VERBATIM_ENV};
use crate::utils::error::{FormatError, FormatResult};

/// Contents of an optional `[...]` argument
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ArgList {
    pub content: Vec<Node>,
}

impl ArgList {
    pub fn new(content: Vec<Node>) -> Self {
        Self { content }
    }
}

/// A node of the syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Node {
    /// Ordered sequence; the document root is one
    NodeList { content: Vec<Node> },
    /// Run of literal characters
    String { content: String },
    Whitespace,
    Parbreak,
    Macro {
        name: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        args: Option<ArgList>,
    },
    Environment {
        env: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        args: Option<ArgList>,
        content: Vec<Node>,
    },
    /// One of the named math environments; no argument list
    MathEnv { env: String, content: Vec<Node> },
    InlineMath { content: Vec<Node> },
    DisplayMath { content: Vec<Node> },
    Group { content: Vec<Node> },
    Subscript { content: Option<Box<Node>> },
    Superscript { content: Option<Box<Node>> },
    Verbatim { content: String },
    Verb { delimiter: char, content: String },
    CommentEnv { content: String },
    Comment { content: String, sameline: bool },
    ArgList(ArgList),
}

impl Node {
    pub fn string(content: impl Into<String>) -> Self {
        Node::String {
            content: content.into(),
        }
    }

    pub fn list(content: Vec<Node>) -> Self {
        Node::NodeList { content }
    }

    pub fn macro_(name: impl Into<String>) -> Self {
        Node::Macro {
            name: name.into(),
            args: None,
        }
    }

    /// The `type` tag of this node
    pub fn kind(&self) -> &'static str {
        match self {
            Node::NodeList { .. } => "nodelist",
            Node::String { .. } => "string",
            Node::Whitespace => "whitespace",
            Node::Parbreak => "parbreak",
            Node::Macro { .. } => "macro",
            Node::Environment { .. } => "environment",
            Node::MathEnv { .. } => "mathenv",
            Node::InlineMath { .. } => "inlinemath",
            Node::DisplayMath { .. } => "displaymath",
            Node::Group { .. } => "group",
            Node::Subscript { .. } => "subscript",
            Node::Superscript { .. } => "superscript",
            Node::Verbatim { .. } => "verbatim",
            Node::Verb { .. } => "verb",
            Node::CommentEnv { .. } => "commentenv",
            Node::Comment { .. } => "comment",
            Node::ArgList(_) => "arglist",
        }
    }

    /// Macro or environment name
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Macro { name, .. } => Some(name),
            Node::Environment { env, .. } | Node::MathEnv { env, .. } => Some(env),
            Node::Verbatim { .. } => Some(VERBATIM_ENV),
            Node::CommentEnv { .. } => Some(COMMENT_ENV),
            _ => None,
        }
    }

    /// Whitespace or paragraph break
    #[inline]
    pub fn is_space(&self) -> bool {
        matches!(self, Node::Whitespace | Node::Parbreak)
    }

    /// Block-level environments, around which space is insignificant
    #[inline]
    pub fn is_environment_like(&self) -> bool {
        matches!(
            self,
            Node::Environment { .. }
                | Node::MathEnv { .. }
                | Node::Verbatim { .. }
                | Node::CommentEnv { .. }
        )
    }

    /// The children stored in `slot`, if this node has that slot
    ///
    /// A script's single base is exposed as a one-element slice.
    pub fn children(&self, slot: Slot) -> Option<&[Node]> {
        match slot {
            Slot::Content => match self {
                Node::NodeList { content }
                | Node::Environment { content, .. }
                | Node::MathEnv { content, .. }
                | Node::InlineMath { content }
                | Node::DisplayMath { content }
                | Node::Group { content }
                | Node::ArgList(ArgList { content }) => Some(content),
                Node::Subscript { content } | Node::Superscript { content } => {
                    content.as_deref().map(std::slice::from_ref)
                }
                _ => None,
            },
            Slot::Args => match self {
                Node::Macro { args, .. } | Node::Environment { args, .. } => {
                    args.as_ref().map(|a| a.content.as_slice())
                }
                _ => None,
            },
        }
    }

    /// The list stored in `slot`, when that slot holds a list
    pub fn list_mut(&mut self, slot: Slot) -> Option<&mut Vec<Node>> {
        match slot {
            Slot::Content => match self {
                Node::NodeList { content }
                | Node::Environment { content, .. }
                | Node::MathEnv { content, .. }
                | Node::InlineMath { content }
                | Node::DisplayMath { content }
                | Node::Group { content }
                | Node::ArgList(ArgList { content }) => Some(content),
                _ => None,
            },
            Slot::Args => match self {
                Node::Macro { args, .. } | Node::Environment { args, .. } => {
                    args.as_mut().map(|a| &mut a.content)
                }
                _ => None,
            },
        }
    }

    fn child_mut(&mut self, step: Step) -> Option<&mut Node> {
        match (self, step.slot) {
            (Node::Subscript { content } | Node::Superscript { content }, Slot::Content) => {
                if step.index == 0 {
                    content.as_deref_mut()
                } else {
                    None
                }
            }
            (node, slot) => node.list_mut(slot)?.get_mut(step.index),
        }
    }

    /// The node addressed by `path`, starting from `self`
    pub fn at(&self, path: &NodePath) -> Option<&Node> {
        path.steps().iter().try_fold(self, |node, step| {
            node.children(step.slot)?.get(step.index)
        })
    }

    pub fn at_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let mut node = self;
        for step in path.steps() {
            node = node.child_mut(*step)?;
        }
        Some(node)
    }

    /// Replace `range` of the list in `slot` with `replacement`
    ///
    /// Returns the removed nodes. Annotations taken before the call are stale
    /// afterwards.
    pub fn splice(
        &mut self,
        slot: Slot,
        range: Range<usize>,
        replacement: Vec<Node>,
    ) -> FormatResult<Vec<Node>> {
        let kind = self.kind();
        let list = self
            .list_mut(slot)
            .ok_or_else(|| FormatError::malformed(format!("{} has no {} list", kind, slot)))?;
        if range.start > range.end || range.end > list.len() {
            return Err(FormatError::malformed(format!(
                "range {}..{} out of bounds for list of length {}",
                range.start,
                range.end,
                list.len()
            )));
        }
        Ok(list.splice(range, replacement).collect())
    }
}

// ============================================================================
// Plain LaTeX rendering
// ============================================================================

fn write_all(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    nodes.iter().try_for_each(|node| write!(f, "{}", node))
}

/// A script base that prints without braces
pub(crate) fn single_char_base(base: &Node) -> Option<&str> {
    match base {
        Node::String { content } if content.chars().count() == 1 => Some(content),
        Node::Group { content } => match content.as_slice() {
            [only] => single_char_base(only).filter(|_| matches!(only, Node::String { .. })),
            _ => None,
        },
        _ => None,
    }
}

fn write_script(f: &mut fmt::Formatter<'_>, mark: char, base: Option<&Node>) -> fmt::Result {
    match base {
        None => write!(f, "{}", mark),
        Some(base) => match single_char_base(base) {
            Some(c) => write!(f, "{}{}", mark, c),
            None if matches!(base, Node::Group { .. }) => write!(f, "{}{}", mark, base),
            None => write!(f, "{}{{{}}}", mark, base),
        },
    }
}

impl fmt::Display for ArgList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        write_all(f, &self.content)?;
        f.write_str("]")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::NodeList { content } => write_all(f, content),
            Node::String { content } => f.write_str(content),
            Node::Whitespace => f.write_str(" "),
            Node::Parbreak => f.write_str("\n\n"),
            Node::Macro { name, args } => {
                write!(f, "\\{}", name)?;
                match args {
                    Some(args) => write!(f, "{}", args),
                    None => Ok(()),
                }
            }
            Node::Environment { env, args, content } => {
                write!(f, "\\begin{{{}}}", env)?;
                if let Some(args) = args {
                    write!(f, "{}", args)?;
                }
                write_all(f, content)?;
                write!(f, "\\end{{{}}}", env)
            }
            Node::MathEnv { env, content } => {
                write!(f, "\\begin{{{}}}", env)?;
                write_all(f, content)?;
                write!(f, "\\end{{{}}}", env)
            }
            Node::InlineMath { content } => {
                f.write_str("$")?;
                write_all(f, content)?;
                f.write_str("$")
            }
            Node::DisplayMath { content } => {
                f.write_str("\\[")?;
                write_all(f, content)?;
                f.write_str("\\]")
            }
            Node::Group { content } => {
                f.write_str("{")?;
                write_all(f, content)?;
                f.write_str("}")
            }
            Node::Subscript { content } => write_script(f, '_', content.as_deref()),
            Node::Superscript { content } => write_script(f, '^', content.as_deref()),
            Node::Verbatim { content } => write!(
                f,
                "\\begin{{{}}}{}\\end{{{}}}",
                VERBATIM_ENV, content, VERBATIM_ENV
            ),
            Node::Verb { delimiter, content } => {
                write!(f, "\\verb{}{}{}", delimiter, content, delimiter)
            }
            Node::CommentEnv { content } => write!(
                f,
                "\\begin{{{}}}{}\\end{{{}}}",
                COMMENT_ENV, content, COMMENT_ENV
            ),
            Node::Comment { content, .. } => writeln!(f, "%{}", content),
            Node::ArgList(args) => write!(f, "{}", args),
        }
    }
}

// ============================================================================
// Raw tree conversion
// ============================================================================

/// Convert a raw parse tree into a typed tree
///
/// An array becomes a [`Node::NodeList`], a text leaf a [`Node::String`].
/// Records missing a field their kind requires are reported as
/// [`FormatError::MalformedTree`].
pub fn build_ast(raw: RawNode) -> FormatResult<Node> {
    match raw {
        RawNode::Text(content) => Ok(Node::String { content }),
        RawNode::Array(items) => Ok(Node::NodeList {
            content: build_list(items)?,
        }),
        RawNode::Record(record) => build_record(record),
    }
}

fn build_list(items: Vec<RawNode>) -> FormatResult<Vec<Node>> {
    items.into_iter().map(build_ast).collect()
}

fn build_record(record: RawRecord) -> FormatResult<Node> {
    let kind = record.kind;
    let missing = |field: &str| FormatError::malformed(format!("{} without {}", kind.tag(), field));

    let name = record.name;
    let sameline = record.sameline;
    let delimiter = record.delimiter;
    let args = record.args.map(|a| build_args(*a)).transpose()?;
    let content = record.content.map(|c| *c);

    let list = |content: Option<RawNode>| -> FormatResult<Vec<Node>> {
        match content {
            Some(RawNode::Array(items)) => build_list(items),
            Some(other) => Ok(vec![build_ast(other)?]),
            None => Ok(Vec::new()),
        }
    };
    let text = |content: Option<RawNode>| -> FormatResult<String> {
        match content {
            Some(RawNode::Text(s)) => Ok(s),
            _ => Err(missing("text content")),
        }
    };

    let node = match kind {
        RawKind::Whitespace => Node::Whitespace,
        RawKind::Parbreak => Node::Parbreak,
        RawKind::Macro => Node::Macro {
            name: name.ok_or_else(|| missing("name"))?,
            args,
        },
        RawKind::Environment => Node::Environment {
            env: name.ok_or_else(|| missing("name"))?,
            args,
            content: list(content)?,
        },
        RawKind::MathEnv => Node::MathEnv {
            env: name.ok_or_else(|| missing("name"))?,
            content: list(content)?,
        },
        RawKind::InlineMath => Node::InlineMath {
            content: list(content)?,
        },
        RawKind::DisplayMath => Node::DisplayMath {
            content: list(content)?,
        },
        RawKind::Group => Node::Group {
            content: list(content)?,
        },
        RawKind::Subscript => Node::Subscript {
            content: content.map(build_ast).transpose()?.map(Box::new),
        },
        RawKind::Superscript => Node::Superscript {
            content: content.map(build_ast).transpose()?.map(Box::new),
        },
        RawKind::Verbatim => Node::Verbatim {
            content: text(content)?,
        },
        RawKind::Verb => Node::Verb {
            delimiter: delimiter.ok_or_else(|| missing("delimiter"))?,
            content: text(content)?,
        },
        RawKind::CommentEnv => Node::CommentEnv {
            content: text(content)?,
        },
        RawKind::Comment => Node::Comment {
            content: text(content)?,
            sameline,
        },
        RawKind::ArgList => Node::ArgList(ArgList::new(list(content)?)),
    };
    Ok(node)
}

fn build_args(raw: RawNode) -> FormatResult<ArgList> {
    match build_ast(raw)? {
        Node::ArgList(args) => Ok(args),
        Node::NodeList { content } => Ok(ArgList::new(content)),
        other => Err(FormatError::malformed(format!(
            "argument list expected, found {}",
            other.kind()
        ))),
    }
}
