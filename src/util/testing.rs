use std::env;
use std::sync::Once;

use lopdf::{dictionary, Document, Object, ObjectId};
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // lopdf's parser is chatty at trace level
    let noisy_modules = ["lopdf"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

// ============================================================
// PDF FIXTURES
// ============================================================

/// In-memory document with `page_count` empty A4 pages and no outline.
pub fn sample_document(page_count: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..page_count)
        .map(|_| {
            let media_box = vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ];
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box,
            })
            .into()
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Explicit `[page /Fit]` destination for the zero-based page `index`.
pub fn page_dest(doc: &Document, index: usize) -> Object {
    let page = doc.get_pages()[&(index as u32 + 1)];
    Object::Array(vec![Object::Reference(page), "Fit".into()])
}

fn catalog_reference(doc: &Document, key: &[u8]) -> Option<ObjectId> {
    match doc.catalog().ok()?.get(key).ok()? {
        Object::Reference(id) => Some(*id),
        _ => None,
    }
}

fn catalog_mut(doc: &mut Document) -> &mut lopdf::Dictionary {
    doc.catalog_mut().expect("fixture document has a catalog")
}

/// Append a top-level outline item whose `/Dest` is `dest`, as is.
pub fn add_outline_item(doc: &mut Document, title: &str, dest: Object) -> ObjectId {
    let existing = catalog_reference(doc, b"Outlines");
    let outlines_id = match existing {
        Some(id) => id,
        None => {
            let id = doc.add_object(dictionary! { "Type" => "Outlines", "Count" => 0 });
            catalog_mut(doc).set("Outlines", id);
            id
        }
    };
    let item = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Parent" => outlines_id,
        "Dest" => dest,
    });

    let outlines = doc
        .get_object_mut(outlines_id)
        .and_then(Object::as_dict_mut)
        .expect("outlines dictionary");
    let previous = match outlines.get(b"Last") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };
    let count = outlines.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    if previous.is_none() {
        outlines.set("First", item);
    }
    outlines.set("Last", item);
    outlines.set("Count", count + 1);

    if let Some(previous) = previous {
        doc.get_object_mut(previous)
            .and_then(Object::as_dict_mut)
            .expect("previous outline item")
            .set("Next", item);
        doc.get_object_mut(item)
            .and_then(Object::as_dict_mut)
            .expect("new outline item")
            .set("Prev", previous);
    }
    item
}

/// Register `key` in the `/Names` `/Dests` name tree (a single leaf).
pub fn add_named_destination(doc: &mut Document, key: &str, dest: Object) {
    let existing = catalog_reference(doc, b"Names").and_then(|names_id| {
        match doc.get_dictionary(names_id).ok()?.get(b"Dests").ok()? {
            Object::Reference(id) => Some(*id),
            _ => None,
        }
    });
    let tree_id = match existing {
        Some(id) => id,
        None => {
            let tree_id = doc.add_object(dictionary! { "Names" => Vec::<Object>::new() });
            let names_id = doc.add_object(dictionary! { "Dests" => tree_id });
            catalog_mut(doc).set("Names", names_id);
            tree_id
        }
    };

    let leaf = doc
        .get_object_mut(tree_id)
        .and_then(Object::as_dict_mut)
        .expect("name tree leaf");
    if let Ok(Object::Array(names)) = leaf.get_mut(b"Names") {
        names.push(Object::string_literal(key));
        names.push(dest);
    }
}

/// Legacy PDF 1.1 `/Dests` dictionary entry on the catalog.
pub fn add_legacy_destination(doc: &mut Document, name: &str, dest: Object) {
    let catalog = catalog_mut(doc);
    if !matches!(catalog.get(b"Dests"), Ok(Object::Dictionary(_))) {
        catalog.set("Dests", lopdf::Dictionary::new());
    }
    if let Ok(Object::Dictionary(dests)) = catalog.get_mut(b"Dests") {
        dests.set(name, dest);
    }
}

// test
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_page_count_when_building_sample_then_page_tree_matches() {
        let doc = sample_document(3);

        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn given_two_items_when_adding_then_chain_is_linked() {
        let mut doc = sample_document(2);
        let first_dest = page_dest(&doc, 0);
        let second_dest = page_dest(&doc, 1);

        let first = add_outline_item(&mut doc, "One", first_dest);
        let second = add_outline_item(&mut doc, "Two", second_dest);

        let next = doc.get_dictionary(first).unwrap().get(b"Next").unwrap();
        assert!(matches!(next, Object::Reference(id) if *id == second));
    }
}
