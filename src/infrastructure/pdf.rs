//! lopdf-backed document access: page table, outline read and write.

use std::collections::{HashMap, HashSet};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument, warn};

use crate::domain::objects::{catalog, decode_text_string, dereference, encode_text_string};
use crate::domain::{
    BookmarkNode, DomainResult, NameEntry, NamesCollector, Outline, OutlineItem, PageLookup,
    RawDestination,
};

/// An opened document together with its page table.
pub struct PdfDocument {
    doc: Document,
    /// Page object ids in page order
    pages: Vec<ObjectId>,
    page_indices: HashMap<ObjectId, usize>,
    max_outline_depth: usize,
}

impl PdfDocument {
    pub fn new(doc: Document, max_outline_depth: usize) -> Self {
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let page_indices = pages.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        Self {
            doc,
            pages,
            page_indices,
            max_outline_depth,
        }
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Flattened named destinations, see [`NamesCollector`].
    pub fn named_destinations(&self, max_depth: usize) -> DomainResult<Vec<NameEntry>> {
        NamesCollector::new(&self.doc, max_depth).collect()
    }

    /// Read the outline as unresolved items.
    ///
    /// Sibling chains are followed through `/Next`, children through `/First`.
    /// An item already visited ends its chain, and nesting deeper than the
    /// configured depth is not descended into.
    #[instrument(level = "debug", skip(self))]
    pub fn read_outline(&self) -> Vec<OutlineItem> {
        let Some(first) = self
            .outlines()
            .and_then(|outlines| outlines.get(b"First").ok())
        else {
            debug!("document has no outline");
            return Vec::new();
        };
        let mut visited = HashSet::new();
        self.read_level(first, 0, &mut visited)
    }

    fn read_level(
        &self,
        first: &Object,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
    ) -> Vec<OutlineItem> {
        let mut items = Vec::new();
        if depth >= self.max_outline_depth {
            warn!("outline nesting exceeds {} levels, truncated", self.max_outline_depth);
            return items;
        }

        let mut current = Some(first);
        while let Some(obj) = current {
            if let Object::Reference(id) = obj {
                if !visited.insert(*id) {
                    warn!("outline item {} {} visited twice, chain stopped", id.0, id.1);
                    break;
                }
            }
            let Some(dict) = dereference(&self.doc, obj).and_then(|o| o.as_dict().ok()) else {
                break;
            };

            let mut item = OutlineItem::new(self.title(dict), self.destination(dict, b"Dest"));
            item.action_destination = dict
                .get(b"A")
                .ok()
                .and_then(|a| dereference(&self.doc, a))
                .and_then(|a| a.as_dict().ok())
                .and_then(|action| self.destination(action, b"D"));
            if let Ok(child) = dict.get(b"First") {
                item.children = self.read_level(child, depth + 1, visited);
            }
            items.push(item);

            current = dict.get(b"Next").ok();
        }
        items
    }

    fn title(&self, dict: &Dictionary) -> String {
        match dict.get(b"Title").ok().and_then(|t| dereference(&self.doc, t)) {
            Some(Object::String(bytes, _)) => decode_text_string(bytes),
            _ => String::new(),
        }
    }

    fn destination(&self, dict: &Dictionary, key: &[u8]) -> Option<RawDestination> {
        let obj = dereference(&self.doc, dict.get(key).ok()?)?;
        RawDestination::from_object(obj)
    }

    /// The `/Outlines` dictionary, if any.
    fn outlines(&self) -> Option<&Dictionary> {
        let outlines = catalog(&self.doc)?.get(b"Outlines").ok()?;
        dereference(&self.doc, outlines)?.as_dict().ok()
    }

    /// Append `outline` after the existing top-level items.
    ///
    /// New items point at `[page /Fit]` and are written closed. Returns the
    /// number of items written.
    #[instrument(level = "debug", skip(self, outline))]
    pub fn append_outline(&mut self, outline: &Outline) -> lopdf::Result<usize> {
        if outline.is_empty() {
            return Ok(0);
        }
        let root_id = self.outlines_root()?;
        let ids = self.write_level(&outline.roots, root_id)?;

        let (previous_last, previous_count) = {
            let root = self.doc.get_object(root_id)?.as_dict()?;
            let last = match root.get(b"Last") {
                Ok(Object::Reference(id)) => Some(*id),
                _ => None,
            };
            (last, root.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0))
        };

        let (Some(&first), Some(&last)) = (ids.first(), ids.last()) else {
            return Ok(0);
        };
        if let Some(previous) = previous_last {
            self.doc.get_object_mut(previous)?.as_dict_mut()?.set("Next", first);
            self.doc.get_object_mut(first)?.as_dict_mut()?.set("Prev", previous);
        }

        let root = self.doc.get_object_mut(root_id)?.as_dict_mut()?;
        if previous_last.is_none() {
            root.set("First", first);
        }
        root.set("Last", last);
        root.set("Count", previous_count.max(0) + ids.len() as i64);

        debug!("appended {} bookmarks", outline.len());
        Ok(outline.len())
    }

    fn write_level(&mut self, nodes: &[BookmarkNode], parent: ObjectId) -> lopdf::Result<Vec<ObjectId>> {
        let ids: Vec<ObjectId> = nodes.iter().map(|_| self.doc.new_object_id()).collect();
        for (i, node) in nodes.iter().enumerate() {
            let page = *self
                .pages
                .get(node.page)
                .ok_or(lopdf::Error::PageNumberNotFound(node.page as u32 + 1))?;
            let mut dict = dictionary! {
                "Title" => encode_text_string(&node.title),
                "Parent" => parent,
                "Dest" => vec![Object::Reference(page), "Fit".into()],
            };
            if i > 0 {
                dict.set("Prev", ids[i - 1]);
            }
            if let Some(&next) = ids.get(i + 1) {
                dict.set("Next", next);
            }
            let children = self.write_level(&node.children, ids[i])?;
            if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
                dict.set("First", first);
                dict.set("Last", last);
                dict.set("Count", -(children.len() as i64));
            }
            self.doc.objects.insert(ids[i], Object::Dictionary(dict));
        }
        Ok(ids)
    }

    /// Id of the `/Outlines` dictionary, creating it when absent.
    fn outlines_root(&mut self) -> lopdf::Result<ObjectId> {
        let existing = self.doc.catalog()?.get(b"Outlines").ok().cloned();
        match existing {
            Some(Object::Reference(id)) if self.doc.get_dictionary(id).is_ok() => Ok(id),
            Some(Object::Dictionary(dict)) => {
                let id = self.doc.add_object(dict);
                self.doc.catalog_mut()?.set("Outlines", id);
                Ok(id)
            }
            _ => {
                let id = self.doc.add_object(dictionary! { "Type" => "Outlines", "Count" => 0 });
                self.doc.catalog_mut()?.set("Outlines", id);
                Ok(id)
            }
        }
    }

    /// Detach the outline and drop objects no longer reachable.
    ///
    /// Returns whether an outline was present.
    pub fn clear_outline(&mut self) -> lopdf::Result<bool> {
        let removed = self.doc.catalog_mut()?.remove(b"Outlines").is_some();
        if removed {
            let pruned = self.doc.prune_objects();
            debug!("outline removed, {} objects pruned", pruned.len());
        }
        Ok(removed)
    }
}

impl PageLookup for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_index(&self, target: &Object) -> Option<usize> {
        match target {
            Object::Reference(id) => self.page_indices.get(id).copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DestinationResolver, DomainError};
    use crate::util::testing::{add_outline_item, page_dest, sample_document};

    fn nested_outline() -> Outline {
        Outline::new(vec![
            BookmarkNode::new("Preface", 0),
            BookmarkNode::new("Chapter 1", 1).with_children(vec![
                BookmarkNode::new("1.1 Setup", 2),
                BookmarkNode::new("1.2 Übersicht", 3),
            ]),
        ])
    }

    #[test]
    fn given_appended_outline_when_reading_then_structure_round_trips() {
        let mut pdf = PdfDocument::new(sample_document(5), 64);

        let written = pdf.append_outline(&nested_outline()).unwrap();
        let items = pdf.read_outline();

        assert_eq!(written, 4);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].title, "Chapter 1");
        assert_eq!(items[1].children[1].title, "1.2 Übersicht");

        let resolver = DestinationResolver::new(&pdf, &[]);
        assert_eq!(resolver.resolve_outline(&items).unwrap(), nested_outline());
    }

    #[test]
    fn given_existing_outline_when_appending_then_new_items_follow() {
        let mut pdf = PdfDocument::new(sample_document(5), 64);
        pdf.append_outline(&Outline::new(vec![BookmarkNode::new("Old", 0)]))
            .unwrap();

        pdf.append_outline(&Outline::new(vec![BookmarkNode::new("New", 4)]))
            .unwrap();

        let titles: Vec<_> = pdf.read_outline().into_iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["Old", "New"]);
    }

    #[test]
    fn given_cyclic_sibling_chain_when_reading_then_stops() {
        let mut doc = sample_document(2);
        let dest = page_dest(&doc, 0);
        let first = add_outline_item(&mut doc, "Loop", dest);
        doc.get_object_mut(first)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Next", first);
        let pdf = PdfDocument::new(doc, 64);

        let items = pdf.read_outline();

        assert_eq!(items.len(), 1);
    }

    #[test]
    fn given_outline_when_clearing_then_nothing_is_left_to_read() {
        let mut pdf = PdfDocument::new(sample_document(4), 64);
        pdf.append_outline(&nested_outline()).unwrap();

        assert!(pdf.clear_outline().unwrap());
        assert!(pdf.read_outline().is_empty());
        assert!(!pdf.clear_outline().unwrap());
    }

    #[test]
    fn given_node_beyond_page_table_when_appending_then_fails() {
        let mut pdf = PdfDocument::new(sample_document(1), 64);

        let result = pdf.append_outline(&Outline::new(vec![BookmarkNode::new("Far", 3)]));

        assert!(result.is_err());
    }

    #[test]
    fn given_item_with_goto_action_when_resolving_then_uses_action_destination() {
        let mut doc = sample_document(4);
        let dest = page_dest(&doc, 2);
        let item = add_outline_item(&mut doc, "Action", dest.clone());
        let dict = doc.get_object_mut(item).unwrap().as_dict_mut().unwrap();
        dict.remove(b"Dest");
        dict.set(
            "A",
            dictionary! { "S" => "GoTo", "D" => dest },
        );
        let pdf = PdfDocument::new(doc, 64);

        let items = pdf.read_outline();
        let resolver = DestinationResolver::new(&pdf, &[]);

        assert!(items[0].destination.is_none());
        assert_eq!(resolver.resolve_item(&items[0]).unwrap(), 2);
    }

    #[test]
    fn given_item_without_any_destination_when_resolving_then_no_destination() {
        let mut doc = sample_document(1);
        let dest = page_dest(&doc, 0);
        let item = add_outline_item(&mut doc, "Nowhere", dest);
        doc.get_object_mut(item)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .remove(b"Dest");
        let pdf = PdfDocument::new(doc, 64);

        let err = DestinationResolver::new(&pdf, &[])
            .resolve_outline(&pdf.read_outline())
            .unwrap_err();

        assert_eq!(err, DomainError::NoDestination("Nowhere".into()));
    }
}
