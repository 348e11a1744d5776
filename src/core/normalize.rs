//! Whitespace normalization
//!
//! `remove_excess_space` rewrites every list of the tree so that:
//! - space at the start or end of an environment body is dropped
//! - space next to a block environment is dropped
//! - any other run of whitespace and paragraph breaks becomes one node,
//!   a paragraph break if the run held one
//!
//! Applying it twice gives the same tree as applying it once.

use crate::core::ast::{Node, Slot};

/// Normalize whitespace throughout `ast` and return it
pub fn remove_excess_space(mut ast: Node) -> Node {
    normalize_in_place(&mut ast);
    ast
}

/// Normalize whitespace in place, returning how many nodes were removed
pub fn normalize_in_place(ast: &mut Node) -> usize {
    let removed = normalize_node(ast);
    tracing::trace!(target: "texfmt::normalize", removed, "removed excess space");
    removed
}

fn normalize_node(node: &mut Node) -> usize {
    let env_body = matches!(node, Node::Environment { .. } | Node::MathEnv { .. });
    let mut removed = 0;
    if let Some(args) = node.list_mut(Slot::Args) {
        removed += collapse(args, false);
    }
    if let Node::Subscript { content: Some(base) } | Node::Superscript { content: Some(base) } =
        node
    {
        return removed + normalize_node(base);
    }
    if let Some(list) = node.list_mut(Slot::Content) {
        removed += collapse(list, env_body);
    }
    removed
}

/// Rebuild one list; `env_body` marks the direct body of an environment
fn collapse(list: &mut Vec<Node>, env_body: bool) -> usize {
    let mut removed = 0;
    for node in list.iter_mut() {
        removed += normalize_node(node);
    }

    let items = std::mem::take(list);
    let len = items.len();
    let env_like: Vec<bool> = items.iter().map(Node::is_environment_like).collect();

    let flush = |out: &mut Vec<Node>, start: usize, end: usize, parbreak: bool| {
        let at_edge = env_body && (start == 0 || end == len);
        let near_env = (start > 0 && env_like[start - 1]) || (end < len && env_like[end]);
        if !at_edge && !near_env {
            out.push(if parbreak {
                Node::Parbreak
            } else {
                Node::Whitespace
            });
        }
    };

    let mut out = Vec::with_capacity(len);
    let mut run: Option<(usize, bool)> = None;
    for (i, node) in items.into_iter().enumerate() {
        if node.is_space() {
            let is_parbreak = matches!(node, Node::Parbreak);
            run = match run {
                Some((start, parbreak)) => Some((start, parbreak || is_parbreak)),
                None => Some((i, is_parbreak)),
            };
            continue;
        }
        if let Some((start, parbreak)) = run.take() {
            flush(&mut out, start, i, parbreak);
        }
        out.push(node);
    }
    if let Some((start, parbreak)) = run {
        flush(&mut out, start, len, parbreak);
    }

    removed += len - out.len();
    *list = out;
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::build_ast;
    use crate::core::parser::parse_raw;

    fn normalized(src: &str) -> Node {
        remove_excess_space(build_ast(parse_raw(src).unwrap()).unwrap())
    }

    #[test]
    fn test_collapse_spaces() {
        assert_eq!(normalized("a   b").to_string(), "a b");
        assert_eq!(normalized("a \n b").to_string(), "a b");
    }

    #[test]
    fn test_parbreak_wins_over_space() {
        assert_eq!(normalized("a\n\n\nb").to_string(), "a\n\nb");
        assert_eq!(
            normalized("a {x} \n\n b").children(Slot::Content).unwrap().len(),
            5
        );
    }

    #[test]
    fn test_environment_body_edges() {
        assert_eq!(
            normalized("\\begin{foo}\n  x y \n\\end{foo}").to_string(),
            r"\begin{foo}x y\end{foo}"
        );
        assert_eq!(
            normalized("\\begin{align}\n  x\n\\end{align}").to_string(),
            r"\begin{align}x\end{align}"
        );
    }

    #[test]
    fn test_space_around_environments() {
        assert_eq!(
            normalized("a \n\n \\begin{foo}x\\end{foo}\n b").to_string(),
            r"a\begin{foo}x\end{foo}b"
        );
        assert_eq!(
            normalized("a \\begin{verbatim} v \\end{verbatim} b").to_string(),
            r"a\begin{verbatim} v \end{verbatim}b"
        );
    }

    #[test]
    fn test_group_edges_are_kept() {
        assert_eq!(normalized("{ a  }").to_string(), "{ a }");
    }

    #[test]
    fn test_nested_lists() {
        assert_eq!(normalized(r"\x[a  ,  b]").to_string(), r"\x[a , b]");
        assert_eq!(normalized("$x  +  y$").to_string(), "$x + y$");
    }

    #[test]
    fn test_idempotent() {
        let src = "a  \\begin{foo}  \n\n b \\begin{bar} c \\end{bar}\n\n\\end{foo} \n\n\n d {e  f}";
        let once = normalized(src);
        let mut twice = once.clone();
        assert_eq!(normalize_in_place(&mut twice), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_removed_count() {
        let mut ast = build_ast(parse_raw("a \n\n b").unwrap()).unwrap();
        // whitespace is absorbed into the parbreak by the grammar
        assert_eq!(normalize_in_place(&mut ast), 0);
        let mut ast = build_ast(parse_raw("\\begin{x} a \\end{x}").unwrap()).unwrap();
        assert_eq!(normalize_in_place(&mut ast), 2);
    }
}
