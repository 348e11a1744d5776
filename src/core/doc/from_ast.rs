//! Conversion from the syntax tree to a [`Doc`]
//!
//! The builder follows the same line discipline as the token printer
//! (ensure-newline, prefer-paragraph, skipped leading spaces) so that both
//! printers produce identical text when nothing needs to wrap. Runs of
//! words become `fill`s; optional argument lists become groups that break
//! after their commas.

use super::{concat, fill, group, hardline, indent, line, literalline, softline, text, Doc};
use crate::core::ast::{single_char_base, ArgList, Node};
use crate::data::{is_wrappable, LINE_START_MACROS, PARAGRAPH_MACROS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Start,
    Newline,
    Paragraph,
    Content,
}

/// Parts of one fill: chunks alternating with separators
#[derive(Debug, Default)]
struct Acc {
    parts: Vec<Doc>,
    chunk: Vec<Doc>,
}

impl Acc {
    fn push(&mut self, doc: Doc) {
        self.chunk.push(doc);
    }

    /// Close the current chunk with `separator`
    fn separate(&mut self, separator: Doc) {
        let chunk = std::mem::take(&mut self.chunk);
        self.parts.push(concat(chunk));
        self.parts.push(separator);
    }

    fn finish(mut self) -> Doc {
        if self.parts.is_empty() {
            return match self.chunk.len() {
                1 => self.chunk.remove(0),
                _ => concat(self.chunk),
            };
        }
        self.parts.push(concat(self.chunk));
        fill(self.parts)
    }
}

/// Text that may span lines; inner newlines keep no indentation
fn text_doc(s: &str) -> Doc {
    if !s.contains('\n') {
        return text(s);
    }
    let mut parts = Vec::new();
    for (i, piece) in s.split('\n').enumerate() {
        if i > 0 {
            parts.push(literalline());
        }
        if !piece.is_empty() {
            parts.push(text(piece));
        }
    }
    concat(parts)
}

fn is_comma(node: &Node) -> bool {
    matches!(node, Node::String { content } if content == ",")
}

struct DocBuilder {
    last: Last,
    no_wrap: usize,
    pending_space: bool,
}

impl DocBuilder {
    fn new() -> Self {
        Self {
            last: Last::Start,
            no_wrap: 0,
            pending_space: false,
        }
    }

    /// Emit a pending space before `next`, as a fill separator when `next`
    /// may start a line
    fn resolve_space(&mut self, acc: &mut Acc, next: &str) {
        if std::mem::take(&mut self.pending_space) {
            if self.no_wrap == 0 && is_wrappable(next) {
                acc.separate(line());
            } else {
                acc.push(text(" "));
            }
        }
    }

    fn text(&mut self, acc: &mut Acc, s: &str) {
        self.resolve_space(acc, s);
        acc.push(text_doc(s));
        self.last = Last::Content;
    }

    fn space(&mut self) {
        if self.last == Last::Content {
            self.pending_space = true;
        }
    }

    fn hard_break(&mut self, acc: &mut Acc, count: usize) {
        self.pending_space = false;
        for _ in 0..count {
            acc.push(hardline());
        }
        acc.separate(Doc::empty());
    }

    fn newline(&mut self, acc: &mut Acc) {
        self.hard_break(acc, 1);
        self.last = Last::Newline;
    }

    fn ensure_newline(&mut self, acc: &mut Acc) {
        if self.last == Last::Content {
            self.newline(acc);
        }
    }

    fn paragraph_break(&mut self, acc: &mut Acc) {
        match self.last {
            Last::Start => {}
            Last::Newline => {
                self.hard_break(acc, 1);
                self.last = Last::Paragraph;
            }
            Last::Paragraph | Last::Content => {
                self.hard_break(acc, 2);
                self.last = Last::Paragraph;
            }
        }
    }

    fn prefer_paragraph(&mut self, acc: &mut Acc) {
        if self.last == Last::Content {
            self.hard_break(acc, 2);
            self.last = Last::Paragraph;
        }
    }

    fn nodes(&mut self, acc: &mut Acc, nodes: &[Node]) {
        for node in nodes {
            self.node(acc, node);
        }
    }

    /// Text that is never wrapped internally
    fn opaque(&mut self, acc: &mut Acc, node: &Node) {
        self.no_wrap += 1;
        self.text(acc, &node.to_string());
        self.no_wrap -= 1;
    }

    /// `\begin{env}`, indented body, `\end{env}`
    fn block(&mut self, acc: &mut Acc, env: &str, args: Option<&ArgList>, body: &[Node]) {
        self.ensure_newline(acc);
        self.text(acc, &format!("\\begin{{{}}}", env));
        let mut inner = Acc::default();
        if let Some(args) = args {
            self.args(&mut inner, args);
        }
        self.newline(&mut inner);
        self.nodes(&mut inner, body);
        acc.push(indent(inner.finish()));
        self.newline(acc);
        self.text(acc, &format!("\\end{{{}}}", env));
    }

    /// `[a, b]` as a group that breaks after its commas
    fn args(&mut self, acc: &mut Acc, args: &ArgList) {
        self.resolve_space(acc, "[");
        self.last = Last::Content;
        self.no_wrap += 1;

        let mut items = Acc::default();
        let nodes = &args.content;
        let mut i = 0;
        while i < nodes.len() {
            let node = &nodes[i];
            self.node(&mut items, node);
            i += 1;
            if !is_comma(node) || self.last != Last::Content {
                continue;
            }
            match (nodes.get(i), nodes.get(i + 1)) {
                (Some(Node::Whitespace), next) if !matches!(next, Some(Node::Comment { .. })) => {
                    items.push(line());
                    i += 1;
                }
                (Some(_), _) => items.push(softline()),
                (None, _) => {}
            }
        }
        if std::mem::take(&mut self.pending_space) {
            items.push(text(" "));
        }

        self.no_wrap -= 1;
        acc.push(group(concat(vec![
            text("["),
            indent(items.finish()),
            text("]"),
        ])));
        self.last = Last::Content;
    }

    fn script(&mut self, acc: &mut Acc, mark: &str, base: Option<&Node>) {
        match base {
            None => self.text(acc, mark),
            Some(base) => match single_char_base(base) {
                Some(c) => self.text(acc, &format!("{}{}", mark, c)),
                None if matches!(base, Node::Group { .. }) => {
                    self.text(acc, mark);
                    self.node(acc, base);
                }
                None => {
                    self.text(acc, &format!("{}{{", mark));
                    self.node(acc, base);
                    self.text(acc, "}");
                }
            },
        }
    }

    fn node(&mut self, acc: &mut Acc, node: &Node) {
        match node {
            Node::NodeList { content } => self.nodes(acc, content),
            Node::String { content } => self.text(acc, content),
            Node::Whitespace => self.space(),
            Node::Parbreak => self.paragraph_break(acc),
            Node::Macro { name, args } => {
                if LINE_START_MACROS.contains(name.as_str()) {
                    self.ensure_newline(acc);
                } else if PARAGRAPH_MACROS.contains(name.as_str()) {
                    self.prefer_paragraph(acc);
                }
                self.text(acc, &format!("\\{}", name));
                if let Some(args) = args {
                    self.args(acc, args);
                }
            }
            Node::Environment { env, args, content } => {
                self.block(acc, env, args.as_ref(), content)
            }
            Node::MathEnv { env, content } => self.block(acc, env, None, content),
            Node::InlineMath { content } => {
                self.text(acc, "$");
                self.nodes(acc, content);
                self.text(acc, "$");
            }
            Node::DisplayMath { content } => {
                self.ensure_newline(acc);
                self.text(acc, "\\[");
                let mut inner = Acc::default();
                self.newline(&mut inner);
                self.nodes(&mut inner, content);
                acc.push(indent(inner.finish()));
                self.newline(acc);
                self.text(acc, "\\]");
            }
            Node::Group { content } => {
                self.no_wrap += 1;
                self.text(acc, "{");
                self.nodes(acc, content);
                self.text(acc, "}");
                self.no_wrap -= 1;
            }
            Node::Subscript { content } => self.script(acc, "_", content.as_deref()),
            Node::Superscript { content } => self.script(acc, "^", content.as_deref()),
            Node::Verbatim { .. } => {
                self.ensure_newline(acc);
                self.opaque(acc, node);
            }
            Node::Verb { .. } => self.opaque(acc, node),
            Node::CommentEnv { .. } => {
                self.ensure_newline(acc);
                self.opaque(acc, node);
                self.newline(acc);
            }
            Node::Comment { content, sameline } => {
                if !sameline {
                    self.ensure_newline(acc);
                }
                self.text(acc, &format!("%{}", content));
                self.newline(acc);
            }
            Node::ArgList(args) => self.args(acc, args),
        }
    }
}

/// Convert a tree into a layout document
pub fn to_doc(node: &Node) -> Doc {
    let mut builder = DocBuilder::new();
    let mut acc = Acc::default();
    builder.node(&mut acc, node);
    if builder.pending_space {
        acc.push(text(" "));
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::super::render_doc;
    use super::*;
    use crate::core::ast::build_ast;
    use crate::core::normalize::remove_excess_space;
    use crate::core::options::PrintOptions;
    use crate::core::parser::parse_raw;

    fn layout(src: &str, width: usize) -> String {
        let ast = remove_excess_space(build_ast(parse_raw(src).unwrap()).unwrap());
        let options = PrintOptions {
            print_width: width,
            ..PrintOptions::default()
        };
        render_doc(to_doc(&ast), &options).formatted
    }

    #[test]
    fn test_short_paragraph_is_unchanged() {
        assert_eq!(layout("Hello,   world.", 80), "Hello, world.");
    }

    #[test]
    fn test_fill_wraps_words() {
        assert_eq!(
            layout("aaaa bbbb cccc dddd", 10),
            "aaaa bbbb\ncccc dddd"
        );
    }

    #[test]
    fn test_punctuation_stays_attached() {
        assert_eq!(layout("aaaa bbbb, cc", 9), "aaaa\nbbbb, cc");
    }

    #[test]
    fn test_environment_indents_body() {
        assert_eq!(
            layout("\\begin{itemize}\n\\item a\n\\item b\n\\end{itemize}", 80),
            "\\begin{itemize}\n\t\\item a\n\n\t\\item b\n\\end{itemize}"
        );
    }

    #[test]
    fn test_display_math() {
        assert_eq!(layout(r"a \[x\] b", 80), "a\n\\[\n\tx\n\\] b");
    }

    #[test]
    fn test_group_does_not_wrap() {
        assert_eq!(layout("aaaa {bb cc dd}", 8), "aaaa {bb cc dd}");
    }

    #[test]
    fn test_arglist_breaks_after_commas() {
        assert_eq!(layout(r"\x[a, b]", 80), r"\x[a, b]");
        assert_eq!(
            layout(r"\x[aaaa, bbbb, cccc]", 10),
            "\\x[aaaa,\n\tbbbb,\n\tcccc]"
        );
    }

    #[test]
    fn test_verbatim_is_literal() {
        assert_eq!(
            layout("\\begin{foo}\n\\begin{verbatim}\n  x\n\\end{verbatim}\n\\end{foo}", 80),
            "\\begin{foo}\n\t\\begin{verbatim}\n  x\n\\end{verbatim}\n\\end{foo}"
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(layout("a % c\nb", 80), "a % c\nb");
        assert_eq!(layout("a\n% c\nb", 80), "a\n% c\nb");
    }

    #[test]
    fn test_spaces_option() {
        let ast = remove_excess_space(
            build_ast(parse_raw(r"\begin{x}y\end{x}").unwrap()).unwrap(),
        );
        let printed = render_doc(to_doc(&ast), &PrintOptions::spaces(2));
        assert_eq!(printed.formatted, "\\begin{x}\n  y\n\\end{x}");
    }
}
