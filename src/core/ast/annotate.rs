//! Parent and sibling relations
//!
//! Nodes are addressed by [`NodePath`]s from the root. [`annotate`] walks the
//! tree once and records, for every path, the path of its parent and of its
//! neighbours in the enclosing list. The result is a snapshot: any splice
//! invalidates it and the walk has to be repeated.

use std::fmt;

use fxhash::FxHashMap;

use super::Node;

/// Which child collection of a node a step descends into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Body list, or a script's base
    Content,
    /// The optional `[...]` argument list
    Args,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Content => f.write_str("content"),
            Slot::Args => f.write_str("args"),
        }
    }
}

/// One step of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub slot: Slot,
    pub index: usize,
}

/// Address of a node relative to the root; empty for the root itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<Step>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the `index`-th child in `slot`
    pub fn child(&self, slot: Slot, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(Step { slot, index });
        Self(steps)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn last(&self) -> Option<Step> {
        self.0.last().copied()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Same parent and slot, `index` replaced
    fn sibling(&self, index: usize) -> Option<Self> {
        let mut steps = self.0.clone();
        steps.last_mut()?.index = index;
        Some(Self(steps))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}[{}]", step.slot, step.index)?;
        }
        Ok(())
    }
}

/// Derived parent, previous and next relations of one tree
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    parent: FxHashMap<NodePath, NodePath>,
    previous: FxHashMap<NodePath, NodePath>,
    next: FxHashMap<NodePath, NodePath>,
    nodes: usize,
}

impl Annotations {
    /// The node owning the list (or script base) that holds `path`
    pub fn parent(&self, path: &NodePath) -> Option<&NodePath> {
        self.parent.get(path)
    }

    pub fn previous(&self, path: &NodePath) -> Option<&NodePath> {
        self.previous.get(path)
    }

    pub fn next(&self, path: &NodePath) -> Option<&NodePath> {
        self.next.get(path)
    }

    /// Number of nodes visited, the root included
    pub fn len(&self) -> usize {
        self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes == 0
    }
}

/// Compute parent and sibling relations for every node under `root`
pub fn annotate(root: &Node) -> Annotations {
    let mut annotations = Annotations::default();
    walk(root, &mut |path, _| {
        annotations.nodes += 1;
        let Some(parent) = path.parent() else {
            return;
        };
        if let Some(step) = path.last() {
            let siblings = root
                .at(&parent)
                .and_then(|owner| owner.children(step.slot))
                .map(<[Node]>::len)
                .unwrap_or(0);
            if step.index > 0 {
                if let Some(prev) = path.sibling(step.index - 1) {
                    annotations.previous.insert(path.clone(), prev);
                }
            }
            if step.index + 1 < siblings {
                if let Some(next) = path.sibling(step.index + 1) {
                    annotations.next.insert(path.clone(), next);
                }
            }
        }
        annotations.parent.insert(path.clone(), parent);
    });
    annotations
}

/// Pre-order traversal in document order (arguments before content)
pub fn walk<F>(root: &Node, f: &mut F)
where
    F: FnMut(&NodePath, &Node),
{
    walk_at(&NodePath::root(), root, f);
}

fn walk_at<F>(path: &NodePath, node: &Node, f: &mut F)
where
    F: FnMut(&NodePath, &Node),
{
    f(path, node);
    for slot in [Slot::Args, Slot::Content] {
        if let Some(children) = node.children(slot) {
            for (index, child) in children.iter().enumerate() {
                walk_at(&path.child(slot, index), child, f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::build_ast;
    use crate::core::parser::parse_raw;

    fn ast(src: &str) -> Node {
        build_ast(parse_raw(src).unwrap()).unwrap()
    }

    #[test]
    fn test_walk_document_order() {
        let root = ast(r"\x[a]{b}");
        let mut kinds = Vec::new();
        walk(&root, &mut |_, node| kinds.push(node.to_string()));
        assert_eq!(kinds, vec![r"\x[a]{b}", r"\x[a]", "a", "{b}", "b"]);
    }

    #[test]
    fn test_annotate_siblings() {
        let root = ast("a b");
        let notes = annotate(&root);
        let first = NodePath::root().child(Slot::Content, 0);
        let second = NodePath::root().child(Slot::Content, 1);
        let third = NodePath::root().child(Slot::Content, 2);

        assert_eq!(notes.len(), 4);
        assert_eq!(notes.parent(&second), Some(&NodePath::root()));
        assert_eq!(notes.previous(&first), None);
        assert_eq!(notes.next(&first), Some(&second));
        assert_eq!(notes.previous(&third), Some(&second));
        assert_eq!(notes.next(&third), None);
        assert_eq!(notes.parent(&NodePath::root()), None);
    }

    #[test]
    fn test_annotate_script_base_has_no_siblings() {
        let root = ast("$x^y$");
        let notes = annotate(&root);
        let script = NodePath::root()
            .child(Slot::Content, 0)
            .child(Slot::Content, 1);
        let base = script.child(Slot::Content, 0);
        assert_eq!(root.at(&base), Some(&Node::string("y")));
        assert_eq!(notes.parent(&base), Some(&script));
        assert_eq!(notes.next(&base), None);
        assert_eq!(notes.previous(&base), None);
    }

    #[test]
    fn test_annotations_are_recomputed_after_splice() {
        let mut root = ast("a b");
        root.splice(Slot::Content, 1..3, vec![]).unwrap();
        let notes = annotate(&root);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes.next(&NodePath::root().child(Slot::Content, 0)), None);
    }

    #[test]
    fn test_path_display() {
        let path = NodePath::root()
            .child(Slot::Content, 1)
            .child(Slot::Args, 0);
        assert_eq!(path.to_string(), "/content[1]/args[0]");
        assert_eq!(path.depth(), 2);
        assert!(NodePath::root().is_root());
    }
}
