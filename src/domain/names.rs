//! Names collector: flattens the document's named-destination tables.
//!
//! A name tree node either carries a `/Names` array of alternating
//! `key, target` pairs (a leaf) or a `/Kids` array of further nodes. Nothing
//! guarantees balance or acyclicity, so traversal is capped in depth and
//! refuses to revisit an indirect object.

use std::collections::HashSet;

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, instrument, trace};

use crate::domain::entities::{NameEntry, NameTarget};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::objects::{catalog, dereference, dict_entry, object_kind};

pub const DEFAULT_MAX_NAME_TREE_DEPTH: usize = 64;

/// Flattens `/Root/Names/Dests` and the legacy `/Root/Dests` dictionary.
pub struct NamesCollector<'a> {
    doc: &'a Document,
    max_depth: usize,
}

impl<'a> NamesCollector<'a> {
    pub fn new(doc: &'a Document, max_depth: usize) -> Self {
        Self { doc, max_depth }
    }

    /// All named destinations of the document, in source order.
    ///
    /// Name-tree entries come first, followed by the PDF 1.1 `/Dests`
    /// dictionary. A document without either table yields an empty list.
    #[instrument(level = "debug", skip(self))]
    pub fn collect(&self) -> DomainResult<Vec<NameEntry>> {
        let Some(catalog) = catalog(self.doc) else {
            debug!("no accessible catalog, no named destinations");
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        if let Some(root) = dict_entry(self.doc, catalog, b"Names")
            .and_then(|names| names.get(b"Dests").ok())
        {
            entries = self.flatten(root)?;
        }

        if let Some(dests) = dict_entry(self.doc, catalog, b"Dests") {
            for (key, value) in dests.iter() {
                entries.push(NameEntry {
                    key: key.clone(),
                    target: self.classify(value),
                });
            }
        }

        debug!("collected {} named destinations", entries.len());
        Ok(entries)
    }

    /// Flatten a name tree rooted at `root` into ordered entries.
    pub fn flatten(&self, root: &Object) -> DomainResult<Vec<NameEntry>> {
        let mut entries = Vec::new();
        let mut visited = HashSet::new();
        self.flatten_node(root, 0, &mut visited, &mut entries)?;
        Ok(entries)
    }

    fn flatten_node(
        &self,
        node: &Object,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
        out: &mut Vec<NameEntry>,
    ) -> DomainResult<()> {
        if depth > self.max_depth {
            return Err(DomainError::MalformedNameTree(format!(
                "nesting exceeds {} levels",
                self.max_depth
            )));
        }
        if let Object::Reference(id) = node {
            if !visited.insert(*id) {
                return Err(DomainError::MalformedNameTree(format!(
                    "cycle through object {} {}",
                    id.0, id.1
                )));
            }
        }

        let dict = dereference(self.doc, node)
            .and_then(|obj| obj.as_dict().ok())
            .ok_or_else(|| DomainError::MalformedNameTree("node is not a dictionary".into()))?;

        if let Ok(names) = dict.get(b"Names") {
            let pairs = self.array(names, "Names")?;
            for pair in pairs.chunks_exact(2) {
                match dereference(self.doc, &pair[0]) {
                    Some(Object::String(key, _)) | Some(Object::Name(key)) => out.push(NameEntry {
                        key: key.clone(),
                        target: self.classify(&pair[1]),
                    }),
                    other => trace!("skipping name tree key of kind {:?}", other.map(object_kind)),
                }
            }
        } else if let Ok(kids) = dict.get(b"Kids") {
            for kid in self.array(kids, "Kids")? {
                self.flatten_node(kid, depth + 1, visited, out)?;
            }
        } else {
            return Err(DomainError::MalformedNameTree(
                "node has neither /Names nor /Kids".into(),
            ));
        }
        Ok(())
    }

    fn array<'o>(&self, obj: &'o Object, field: &str) -> DomainResult<&'o Vec<Object>>
    where
        'a: 'o,
    {
        dereference(self.doc, obj)
            .and_then(|o| o.as_array().ok())
            .ok_or_else(|| DomainError::MalformedNameTree(format!("/{field} is not an array")))
    }

    /// Dereference a named target and decide its kind.
    fn classify(&self, value: &Object) -> NameTarget {
        match dereference(self.doc, value) {
            Some(Object::Array(items)) => NameTarget::Array(items.clone()),
            Some(Object::Dictionary(dict)) => NameTarget::Dictionary(
                dict.get(b"D")
                    .ok()
                    .and_then(|d| dereference(self.doc, d))
                    .and_then(|d| d.as_array().ok())
                    .cloned(),
            ),
            Some(other) => NameTarget::Other(object_kind(other)),
            None => NameTarget::Other("missing object"),
        }
    }
}
