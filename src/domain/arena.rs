use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{BookmarkNode, Outline};

/// Data payload for bookmark nodes during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub title: String,
    /// Zero-based page index
    pub page: usize,
    /// Nesting depth, 0 for top-level bookmarks
    pub level: usize,
}

/// Tree node in the arena-based outline forest.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for top-level nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in insertion order
    pub children: Vec<Index>,
}

/// Arena-based forest used while placing bookmarks.
///
/// Nodes are addressed by generational index so the builder can keep
/// handles to every accepted line and attach children to any of them.
/// Once complete, the forest is converted into owned [`BookmarkNode`]s.
#[derive(Debug, Default)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        match parent.and_then(|idx| self.arena.get_mut(idx)) {
            Some(parent) => parent.children.push(node_idx),
            None => self.roots.push(node_idx),
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    /// Depth-first pre-order traversal over the whole forest.
    #[cfg(test)]
    fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Convert into an owned outline, preserving child order.
    #[instrument(level = "debug", skip(self))]
    pub fn into_outline(mut self) -> Outline {
        let roots = std::mem::take(&mut self.roots);
        let nodes = roots
            .into_iter()
            .filter_map(|idx| self.take_subtree(idx))
            .collect();
        Outline::new(nodes)
    }

    fn take_subtree(&mut self, idx: Index) -> Option<BookmarkNode> {
        let node = self.arena.remove(idx)?;
        let children = node
            .children
            .into_iter()
            .filter_map(|child| self.take_subtree(child))
            .collect();
        Some(BookmarkNode::new(node.data.title, node.data.page).with_children(children))
    }
}

#[cfg(test)]
struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

#[cfg(test)]
impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let stack = arena.roots.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

#[cfg(test)]
impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
