//! Raw parse tree
//!
//! The grammar produces loosely typed records tagged with a [`RawKind`]; the
//! AST builder turns them into [`crate::core::ast::Node`]s. Every record owns
//! its children, nothing is shared with the typed tree.

/// Tag of a raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawKind {
    Whitespace,
    Parbreak,
    Macro,
    Environment,
    MathEnv,
    InlineMath,
    DisplayMath,
    Group,
    Subscript,
    Superscript,
    Verbatim,
    Verb,
    CommentEnv,
    Comment,
    ArgList,
}

impl RawKind {
    /// The `type` tag this record carries in serialized trees
    pub fn tag(self) -> &'static str {
        match self {
            RawKind::Whitespace => "whitespace",
            RawKind::Parbreak => "parbreak",
            RawKind::Macro => "macro",
            RawKind::Environment => "environment",
            RawKind::MathEnv => "mathenv",
            RawKind::InlineMath => "inlinemath",
            RawKind::DisplayMath => "displaymath",
            RawKind::Group => "group",
            RawKind::Subscript => "subscript",
            RawKind::Superscript => "superscript",
            RawKind::Verbatim => "verbatim",
            RawKind::Verb => "verb",
            RawKind::CommentEnv => "commentenv",
            RawKind::Comment => "comment",
            RawKind::ArgList => "arglist",
        }
    }
}

/// A tagged record of the raw tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub kind: RawKind,
    /// Macro or environment name
    pub name: Option<String>,
    pub content: Option<Box<RawNode>>,
    /// Optional `[...]` argument list
    pub args: Option<Box<RawNode>>,
    /// Comment on the same line as preceding content
    pub sameline: bool,
    /// `\verb` delimiter
    pub delimiter: Option<char>,
}

impl RawRecord {
    pub fn new(kind: RawKind) -> Self {
        Self {
            kind,
            name: None,
            content: None,
            args: None,
            sameline: false,
            delimiter: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_content(mut self, content: RawNode) -> Self {
        self.content = Some(Box::new(content));
        self
    }

    pub fn with_args(mut self, args: Option<RawNode>) -> Self {
        self.args = args.map(Box::new);
        self
    }
}

/// A node of the raw tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawNode {
    /// Literal characters
    Text(String),
    /// Ordered children
    Array(Vec<RawNode>),
    Record(RawRecord),
}

impl RawNode {
    pub fn text(s: impl Into<String>) -> Self {
        RawNode::Text(s.into())
    }

    pub fn record(record: RawRecord) -> Self {
        RawNode::Record(record)
    }

    /// Shorthand for records that carry nothing but their tag
    pub fn bare(kind: RawKind) -> Self {
        RawNode::Record(RawRecord::new(kind))
    }

    pub fn kind(&self) -> Option<RawKind> {
        match self {
            RawNode::Record(r) => Some(r.kind),
            _ => None,
        }
    }

    /// Number of direct children of an array node
    pub fn len(&self) -> usize {
        match self {
            RawNode::Array(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
