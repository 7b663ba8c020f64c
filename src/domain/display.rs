//! Tree rendering of resolved outlines for terminal display.

use termtree::Tree;

use crate::domain::entities::{BookmarkNode, Outline};

pub trait ToTreeString {
    fn to_tree_string(&self) -> Tree<String>;
}

impl ToTreeString for BookmarkNode {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(format!("{} ({})", self.title, self.page + 1)).with_leaves(leaves)
    }
}

impl Outline {
    /// Tree view of the forest hung under a `label` root (usually the file name).
    pub fn to_tree(&self, label: impl Into<String>) -> Tree<String> {
        let leaves: Vec<_> = self.roots.iter().map(|n| n.to_tree_string()).collect();
        Tree::new(label.into()).with_leaves(leaves)
    }
}
