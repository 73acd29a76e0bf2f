//! Doubly linked inline tree used while delimiters are resolved.
//!
//! Emphasis and link resolution move runs of siblings under new parents;
//! an index arena with sibling links makes that cheap. The finished tree is
//! converted into owned [`Inline`] vectors.

use crate::ast::{Inline, Link};

pub(super) const ROOT: usize = 0;

#[derive(Debug)]
pub(super) struct LinkTarget {
    pub destination: String,
    pub title: Option<String>,
    pub autolink: bool,
}

#[derive(Debug)]
pub(super) enum NodeValue {
    Root,
    Text(String),
    Code(String),
    Html(String),
    SoftBreak,
    HardBreak,
    Emphasis,
    Strong,
    Strikethrough,
    Link(LinkTarget),
    Image(LinkTarget),
}

#[derive(Debug)]
struct Node {
    value: NodeValue,
    parent: Option<usize>,
    prev: Option<usize>,
    next: Option<usize>,
    first_child: Option<usize>,
    last_child: Option<usize>,
    /// Longest path down to a leaf, fixed once the node is attached.
    height: usize,
}

#[derive(Debug)]
pub(super) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(super) fn new() -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.add(NodeValue::Root);
        tree
    }

    /// Create a detached node.
    pub(super) fn add(&mut self, value: NodeValue) -> usize {
        self.nodes.push(Node {
            value,
            parent: None,
            prev: None,
            next: None,
            first_child: None,
            last_child: None,
            height: 0,
        });
        self.nodes.len() - 1
    }

    pub(super) fn value_mut(&mut self, idx: usize) -> &mut NodeValue {
        &mut self.nodes[idx].value
    }

    pub(super) fn next(&self, idx: usize) -> Option<usize> {
        self.nodes[idx].next
    }

    pub(super) fn last_child(&self, idx: usize) -> Option<usize> {
        self.nodes[idx].last_child
    }

    /// Height a new parent would have if it adopted the siblings after
    /// `start` (up to, not including, `end`).
    pub(super) fn wrapped_height(&self, start: usize, end: Option<usize>) -> usize {
        let mut height = 0;
        let mut current = self.next(start);
        while let Some(node) = current {
            if Some(node) == end {
                break;
            }
            height = height.max(self.nodes[node].height);
            current = self.next(node);
        }
        height + 1
    }

    fn grow(&mut self, parent: Option<usize>, child: usize) {
        if let Some(parent) = parent {
            let height = self.nodes[child].height + 1;
            let node = &mut self.nodes[parent];
            node.height = node.height.max(height);
        }
    }

    pub(super) fn append_child(&mut self, parent: usize, child: usize) {
        self.unlink(child);
        let last = self.nodes[parent].last_child;
        {
            let node = &mut self.nodes[child];
            node.parent = Some(parent);
            node.prev = last;
        }
        match last {
            Some(last) => self.nodes[last].next = Some(child),
            None => self.nodes[parent].first_child = Some(child),
        }
        self.nodes[parent].last_child = Some(child);
        self.grow(Some(parent), child);
    }

    pub(super) fn insert_after(&mut self, sibling: usize, node: usize) {
        self.unlink(node);
        let parent = self.nodes[sibling].parent;
        let next = self.nodes[sibling].next;
        {
            let n = &mut self.nodes[node];
            n.parent = parent;
            n.prev = Some(sibling);
            n.next = next;
        }
        self.nodes[sibling].next = Some(node);
        match next {
            Some(next) => self.nodes[next].prev = Some(node),
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent].last_child = Some(node);
                }
            }
        }
        self.grow(parent, node);
    }

    pub(super) fn unlink(&mut self, idx: usize) {
        let Node {
            parent, prev, next, ..
        } = self.nodes[idx];
        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent].last_child = prev;
                }
            }
        }
        let node = &mut self.nodes[idx];
        node.parent = None;
        node.prev = None;
        node.next = None;
    }

    /// Move every sibling after `start` (up to, not including, `end`)
    /// under `parent`.
    pub(super) fn adopt_siblings(&mut self, start: usize, end: Option<usize>, parent: usize) {
        let mut current = self.next(start);
        while let Some(node) = current {
            if Some(node) == end {
                break;
            }
            current = self.next(node);
            self.append_child(parent, node);
        }
    }

    pub(super) fn into_inlines(mut self) -> Vec<Inline> {
        self.children_into_inlines(ROOT)
    }

    fn children_into_inlines(&mut self, parent: usize) -> Vec<Inline> {
        let mut out: Vec<Inline> = Vec::new();
        let mut current = self.nodes[parent].first_child;

        while let Some(idx) = current {
            current = self.nodes[idx].next;
            let value = std::mem::replace(&mut self.nodes[idx].value, NodeValue::Root);

            let inline = match value {
                NodeValue::Root => continue,
                NodeValue::Text(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    if let Some(Inline::Text(previous)) = out.last_mut() {
                        previous.push_str(&text);
                        continue;
                    }
                    Inline::Text(text)
                }
                NodeValue::Code(code) => Inline::Code(code),
                NodeValue::Html(html) => Inline::Html(html),
                NodeValue::SoftBreak => Inline::SoftBreak,
                NodeValue::HardBreak => Inline::HardBreak,
                NodeValue::Emphasis => Inline::Emphasis(self.children_into_inlines(idx)),
                NodeValue::Strong => Inline::Strong(self.children_into_inlines(idx)),
                NodeValue::Strikethrough => {
                    Inline::Strikethrough(self.children_into_inlines(idx))
                }
                NodeValue::Link(target) => Inline::Link(self.link(idx, target)),
                NodeValue::Image(target) => Inline::Image(self.link(idx, target)),
            };
            out.push(inline);
        }

        out
    }

    fn link(&mut self, idx: usize, target: LinkTarget) -> Link {
        Link {
            destination: target.destination,
            title: target.title,
            children: self.children_into_inlines(idx),
            autolink: target.autolink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(tree: &mut Tree, s: &str) -> usize {
        let idx = tree.add(NodeValue::Text(s.to_owned()));
        tree.append_child(ROOT, idx);
        idx
    }

    #[test]
    fn test_adjacent_text_merged() {
        let mut tree = Tree::new();
        text(&mut tree, "a");
        text(&mut tree, "");
        text(&mut tree, "b");
        assert_eq!(tree.into_inlines(), vec![Inline::Text("ab".to_owned())]);
    }

    #[test]
    fn test_adopt_and_insert_after() {
        let mut tree = Tree::new();
        let open = text(&mut tree, "*");
        text(&mut tree, "x");
        let close = text(&mut tree, "*");

        let emph = tree.add(NodeValue::Emphasis);
        tree.adopt_siblings(open, Some(close), emph);
        tree.insert_after(open, emph);
        tree.unlink(open);
        tree.unlink(close);

        assert_eq!(
            tree.into_inlines(),
            vec![Inline::Emphasis(vec![Inline::Text("x".to_owned())])]
        );
    }

    #[test]
    fn test_wrapped_height() {
        let mut tree = Tree::new();
        let open = text(&mut tree, "*");
        let inner = tree.add(NodeValue::Strong);
        let leaf = tree.add(NodeValue::Text("x".to_owned()));
        tree.append_child(inner, leaf);
        tree.append_child(ROOT, inner);
        let close = text(&mut tree, "*");

        assert_eq!(tree.wrapped_height(open, Some(close)), 2);
        assert_eq!(tree.wrapped_height(inner, Some(close)), 1);
    }
}
