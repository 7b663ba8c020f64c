//! Destination resolver: turns an outline item's raw destination into a
//! zero-based page index.

use lopdf::Object;
use tracing::trace;

use crate::domain::entities::{
    BookmarkNode, NameEntry, NameTarget, Outline, OutlineItem, RawDestination,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::objects::{display_key, object_kind};

/// Page lookup capability of a document.
pub trait PageLookup {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Zero-based index of the page `target` refers to, if it is a page.
    fn page_index(&self, target: &Object) -> Option<usize>;
}

/// Resolves destinations against a document's pages and flattened name list.
pub struct DestinationResolver<'a, P: PageLookup + ?Sized> {
    pages: &'a P,
    names: &'a [NameEntry],
}

impl<'a, P: PageLookup + ?Sized> DestinationResolver<'a, P> {
    pub fn new(pages: &'a P, names: &'a [NameEntry]) -> Self {
        Self { pages, names }
    }

    /// Resolve every item of an outline, keeping its shape.
    ///
    /// The first failing item aborts the whole walk.
    pub fn resolve_outline(&self, items: &[OutlineItem]) -> DomainResult<Outline> {
        Ok(Outline::new(self.resolve_nodes(items)?))
    }

    fn resolve_nodes(&self, items: &[OutlineItem]) -> DomainResult<Vec<BookmarkNode>> {
        items
            .iter()
            .map(|item| {
                let page = self.resolve_item(item)?;
                Ok(BookmarkNode::new(item.title.clone(), page)
                    .with_children(self.resolve_nodes(&item.children)?))
            })
            .collect()
    }

    /// Resolve an outline item, falling back to its action's destination.
    pub fn resolve_item(&self, item: &OutlineItem) -> DomainResult<usize> {
        let destination = item
            .destination
            .as_ref()
            .or(item.action_destination.as_ref())
            .ok_or_else(|| DomainError::NoDestination(item.title.clone()))?;
        self.resolve(destination)
    }

    /// Resolve one raw destination to a page index within the document.
    pub fn resolve(&self, destination: &RawDestination) -> DomainResult<usize> {
        let page = match destination {
            RawDestination::DirectInteger(n) => {
                let n = *n;
                if n < 0 || n >= self.pages.page_count() as i64 {
                    return Err(DomainError::PageOutOfRange {
                        page: n,
                        page_count: self.pages.page_count(),
                    });
                }
                n as usize
            }
            RawDestination::ExplicitArray(items) => self.resolve_array(items)?,
            RawDestination::NamedStringRef(key) | RawDestination::NamedObjectRef(key) => {
                self.resolve_named(key)?
            }
        };
        trace!(page, "resolved destination");
        Ok(page)
    }

    /// `[page /Fit ...]`: the first element is normally the page itself.
    /// When it is not a page but a string or name, it is looked up as a key.
    fn resolve_array(&self, items: &[Object]) -> DomainResult<usize> {
        let first = items
            .first()
            .ok_or_else(|| DomainError::UnresolvedDestination("empty destination array".into()))?;
        if let Some(page) = self.pages.page_index(first) {
            return Ok(page);
        }
        match first {
            Object::String(key, _) | Object::Name(key) => self.resolve_named(key),
            other => Err(DomainError::UnresolvedDestination(format!(
                "destination array starts with {}",
                object_kind(other)
            ))),
        }
    }

    /// First entry in the name list whose key matches wins.
    fn resolve_named(&self, key: &[u8]) -> DomainResult<usize> {
        let entry = self
            .names
            .iter()
            .find(|entry| entry.key == key)
            .ok_or_else(|| DomainError::UnresolvedDestination(display_key(key)))?;

        let target = match &entry.target {
            NameTarget::Array(items) => items.first(),
            NameTarget::Dictionary(Some(d)) => d.first(),
            NameTarget::Dictionary(None) => {
                return Err(DomainError::UnexpectedTargetKind {
                    key: display_key(key),
                    kind: "dictionary without /D".into(),
                })
            }
            NameTarget::Other(kind) => {
                return Err(DomainError::UnexpectedTargetKind {
                    key: display_key(key),
                    kind: (*kind).into(),
                })
            }
        };

        let target = target.ok_or_else(|| DomainError::UnexpectedTargetKind {
            key: display_key(key),
            kind: "empty array".into(),
        })?;
        self.pages
            .page_index(target)
            .ok_or_else(|| DomainError::UnresolvedDestination(display_key(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pages are references `(n + 1, 0)` for page index `n`.
    struct FakePages(usize);

    impl PageLookup for FakePages {
        fn page_count(&self) -> usize {
            self.0
        }

        fn page_index(&self, target: &Object) -> Option<usize> {
            match target {
                Object::Reference((id, 0)) if (1..=self.0 as u32).contains(id) => {
                    Some(*id as usize - 1)
                }
                _ => None,
            }
        }
    }

    fn page_ref(index: u32) -> Object {
        Object::Reference((index + 1, 0))
    }

    fn names() -> Vec<NameEntry> {
        vec![
            NameEntry {
                key: b"intro".to_vec(),
                target: NameTarget::Array(vec![page_ref(2), "Fit".into()]),
            },
            NameEntry {
                key: b"appendix".to_vec(),
                target: NameTarget::Dictionary(Some(vec![page_ref(7), "XYZ".into()])),
            },
            NameEntry {
                key: b"intro".to_vec(),
                target: NameTarget::Array(vec![page_ref(9)]),
            },
            NameEntry {
                key: b"broken".to_vec(),
                target: NameTarget::Other("integer"),
            },
        ]
    }

    #[test]
    fn given_direct_integer_when_resolving_then_returns_it_unchanged() {
        let pages = FakePages(10);
        let resolver = DestinationResolver::new(&pages, &[]);

        assert_eq!(resolver.resolve(&RawDestination::DirectInteger(4)).unwrap(), 4);
    }

    #[test]
    fn given_explicit_array_when_resolving_then_uses_first_element() {
        let pages = FakePages(10);
        let resolver = DestinationResolver::new(&pages, &[]);
        let dest = RawDestination::ExplicitArray(vec![page_ref(5), "XYZ".into(), Object::Null]);

        assert_eq!(resolver.resolve(&dest).unwrap(), 5);
    }

    #[test]
    fn given_named_string_when_resolving_then_first_match_wins() {
        let pages = FakePages(10);
        let names = names();
        let resolver = DestinationResolver::new(&pages, &names);

        let page = resolver
            .resolve(&RawDestination::NamedStringRef(b"intro".to_vec()))
            .unwrap();

        assert_eq!(page, 2);
    }

    #[test]
    fn given_named_object_with_dictionary_target_when_resolving_then_uses_d() {
        let pages = FakePages(10);
        let names = names();
        let resolver = DestinationResolver::new(&pages, &names);

        let page = resolver
            .resolve(&RawDestination::NamedObjectRef(b"appendix".to_vec()))
            .unwrap();

        assert_eq!(page, 7);
    }

    #[test]
    fn given_array_starting_with_name_key_when_resolving_then_looks_it_up() {
        let pages = FakePages(10);
        let names = names();
        let resolver = DestinationResolver::new(&pages, &names);
        let dest = RawDestination::ExplicitArray(vec![Object::string_literal("appendix")]);

        assert_eq!(resolver.resolve(&dest).unwrap(), 7);
    }

    #[test]
    fn given_unknown_key_and_empty_names_when_resolving_then_unresolved() {
        let pages = FakePages(10);
        let resolver = DestinationResolver::new(&pages, &[]);

        let err = resolver
            .resolve(&RawDestination::NamedStringRef(b"missing".to_vec()))
            .unwrap_err();

        assert_eq!(err, DomainError::UnresolvedDestination("missing".into()));
    }

    #[test]
    fn given_target_of_other_kind_when_resolving_then_unexpected_kind() {
        let pages = FakePages(10);
        let names = names();
        let resolver = DestinationResolver::new(&pages, &names);

        let err = resolver
            .resolve(&RawDestination::NamedStringRef(b"broken".to_vec()))
            .unwrap_err();

        assert!(matches!(err, DomainError::UnexpectedTargetKind { .. }));
    }

    #[test]
    fn given_integer_beyond_page_count_when_resolving_then_out_of_range() {
        let pages = FakePages(3);
        let resolver = DestinationResolver::new(&pages, &[]);

        let err = resolver.resolve(&RawDestination::DirectInteger(3)).unwrap_err();

        assert_eq!(
            err,
            DomainError::PageOutOfRange {
                page: 3,
                page_count: 3
            }
        );
    }

    #[test]
    fn given_item_without_destination_when_resolving_then_uses_action_or_fails() {
        let pages = FakePages(10);
        let resolver = DestinationResolver::new(&pages, &[]);
        let mut item = OutlineItem::new("Orphan", None);

        assert_eq!(
            resolver.resolve_item(&item).unwrap_err(),
            DomainError::NoDestination("Orphan".into())
        );

        item.action_destination = Some(RawDestination::ExplicitArray(vec![page_ref(1)]));
        assert_eq!(resolver.resolve_item(&item).unwrap(), 1);
    }
}
