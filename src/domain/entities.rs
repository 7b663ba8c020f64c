//! Domain entities: outline trees and destination encodings

use lopdf::Object;

/// A bookmark in an outline forest.
///
/// Nodes are owned exclusively by their parent; the [`Outline`] owns the
/// top-level nodes. The nesting level is implied by position in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkNode {
    pub title: String,
    /// Zero-based page index
    pub page: usize,
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    pub fn new(title: impl Into<String>, page: usize) -> Self {
        Self {
            title: title.into(),
            page,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<BookmarkNode>) -> Self {
        self.children = children;
        self
    }
}

/// Ordered forest of top-level bookmarks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    pub roots: Vec<BookmarkNode>,
}

impl Outline {
    pub fn new(roots: Vec<BookmarkNode>) -> Self {
        Self { roots }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of bookmarks at all levels.
    pub fn len(&self) -> usize {
        fn count(nodes: &[BookmarkNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.roots)
    }

    /// Number of levels, 0 for an empty outline.
    pub fn depth(&self) -> usize {
        fn levels(nodes: &[BookmarkNode]) -> usize {
            nodes.iter().map(|n| 1 + levels(&n.children)).max().unwrap_or(0)
        }
        levels(&self.roots)
    }

    /// Flatten to `(level, page, title)` entries in depth-first pre-order.
    pub fn entries(&self) -> Vec<OutlineEntry> {
        fn walk(nodes: &[BookmarkNode], level: usize, out: &mut Vec<OutlineEntry>) {
            for node in nodes {
                out.push(OutlineEntry {
                    level,
                    page: node.page,
                    title: node.title.clone(),
                });
                walk(&node.children, level + 1, out);
            }
        }
        let mut out = Vec::with_capacity(self.len());
        walk(&self.roots, 0, &mut out);
        out
    }
}

/// One resolved bookmark, as consumed by the serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub level: usize,
    /// Zero-based page index
    pub page: usize,
    pub title: String,
}

/// How an outline item encodes its target page.
///
/// Decided once when the item is read; the resolver dispatches on the variant
/// and never re-inspects the underlying object kinds.
#[derive(Debug, Clone)]
pub enum RawDestination {
    /// `[page /Fit ...]`: first element plus view parameters
    ExplicitArray(Vec<Object>),
    /// Byte-string key into the `/Names` `/Dests` name tree
    NamedStringRef(Vec<u8>),
    /// Name-object key (PDF 1.1 `/Dests` dictionary)
    NamedObjectRef(Vec<u8>),
    /// Already a zero-based page index
    DirectInteger(i64),
}

impl RawDestination {
    /// Classify a dereferenced destination object.
    ///
    /// Returns `None` for kinds outside the four supported encodings.
    pub fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Array(items) => Some(Self::ExplicitArray(items.clone())),
            Object::String(bytes, _) => Some(Self::NamedStringRef(bytes.clone())),
            Object::Name(name) => Some(Self::NamedObjectRef(name.clone())),
            Object::Integer(n) => Some(Self::DirectInteger(*n)),
            _ => None,
        }
    }
}

/// An outline item as read from a document, before resolution.
#[derive(Debug, Clone)]
pub struct OutlineItem {
    pub title: String,
    /// The item's `/Dest` entry
    pub destination: Option<RawDestination>,
    /// The `/D` entry of the item's action, used when `/Dest` is absent
    pub action_destination: Option<RawDestination>,
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    pub fn new(title: impl Into<String>, destination: Option<RawDestination>) -> Self {
        Self {
            title: title.into(),
            destination,
            action_destination: None,
            children: Vec::new(),
        }
    }
}

/// A `(key, target)` pair flattened from the document's name table.
#[derive(Debug, Clone)]
pub struct NameEntry {
    pub key: Vec<u8>,
    pub target: NameTarget,
}

/// Dereferenced value of a named destination.
#[derive(Debug, Clone)]
pub enum NameTarget {
    Array(Vec<Object>),
    /// Dictionary target, holding its `/D` array when present
    Dictionary(Option<Vec<Object>>),
    Other(&'static str),
}
