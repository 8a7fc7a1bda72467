//! ModelStore tests against the shared page fixture.

use pagemodel::{Model, ModelStore, StoreError};
use serde_json::json;

use crate::helpers::*;

fn assert_nested_scenario(store: &ModelStore) {
    let cases = [
        (
            "/content/test/child_page_1/jcr:content/root/child1001",
            json!({ ":type": "test/components/componentchild1" }),
        ),
        (
            "/content/test/child_page_1/jcr:content/root",
            child_page_1_root(),
        ),
        (
            "/content/test/page/jcr:content/root/child0000/child0010",
            json!({ ":type": "test/components/componentchild0" }),
        ),
        ("/content/test/page/jcr:content/root/child0000", child0000()),
        (
            "/content/test/page/jcr:content/root/child0001",
            json!({ ":type": "test/components/componentchild1" }),
        ),
    ];

    for (path, expected) in cases {
        assert_eq!(store.get_data(Some(path)), Some(model(expected)), "at {path}");
    }
}

fn items_order(store: &ModelStore, path: &str) -> Vec<String> {
    store
        .get_data(Some(path))
        .and_then(|node| node.items_order)
        .unwrap_or_default()
}

#[test]
fn test_full_model_reads() {
    let store = setup_store();
    let full = model(page_model());

    assert_eq!(store.get_data(None), Some(full.clone()));
    assert_eq!(store.get_data(Some(ROOT_PATH)), Some(full.clone()));
    assert_eq!(
        store.get_data(Some("/content/test/page/jcr:content")),
        Some(full)
    );
    assert_eq!(store.root_path(), ROOT_PATH);
}

#[test]
fn test_child_page_and_nested_items() {
    let store = setup_store();

    assert_eq!(
        store.get_data(Some("/content/test/child_page_1")),
        Some(model(child_page_1()))
    );
    assert_nested_scenario(&store);

    assert_eq!(
        store.get_data(Some("/content/test/subpage2/jcr:content/root")),
        Some(model(subpage2_root()))
    );
    assert_eq!(
        store
            .get_data(Some("/content/test/subpage2/subpage22/jcr:content/page"))
            .and_then(|page| page.resource_type),
        Some("test/components/page".to_string())
    );
}

#[test]
fn test_unknown_paths_are_none() {
    let store = setup_store();

    assert_eq!(
        store.get_data(Some("/content/test/child_page_1/root/child1001/child_no_loaded")),
        None
    );
    assert_eq!(store.get_data(Some("/content/test/child_page_1/unknown")), None);
    assert_eq!(store.get_data(Some("/content/test/unknown/path")), None);
    assert_eq!(
        store.get_data(Some("/content/test/page/jcr:content/root/child0000/nope")),
        None
    );
}

#[test]
fn test_insert_page() {
    let mut store = setup_store();
    store.insert_data("/content/test/page1", model(page1()), None, false);

    assert_nested_scenario(&store);
    assert_eq!(
        store.get_data(Some("/content/test/page1")),
        Some(model(page1()))
    );
    assert_eq!(
        store.get_data(Some("/content/test/page1/jcr:content/stem/child0000")),
        Some(model(json!({ ":type": "test/components/componentchild1" })))
    );
}

#[test]
fn test_insert_at_content_root_after_sibling() {
    let mut store = setup_store();
    let sibling = model(subpage2_root());

    store.insert_data(
        "/content/test/child_page_1/jcr:content/sibling",
        sibling.clone(),
        Some("root"),
        false,
    );

    assert_nested_scenario(&store);
    assert_eq!(
        items_order(&store, "/content/test/child_page_1"),
        ["root", "sibling"]
    );
    assert_eq!(
        store.get_data(Some("/content/test/child_page_1/jcr:content/sibling")),
        Some(sibling)
    );
    assert_eq!(
        store.get_data(Some("/content/test/child_page_1/jcr:content/sibling/child2001")),
        Some(model(json!({ ":type": "test/components/componentchild1" })))
    );
}

#[test]
fn test_insert_at_content_root_before_sibling() {
    let mut store = setup_store();

    store.insert_data(
        "/content/test/child_page_1/jcr:content/sibling",
        model(subpage2_root()),
        Some("root"),
        true,
    );

    assert_nested_scenario(&store);
    assert_eq!(
        items_order(&store, "/content/test/child_page_1"),
        ["sibling", "root"]
    );
}

#[test]
fn test_insert_at_nested_level() {
    let mut store = setup_store();
    let path = "/content/test/child_page_1/jcr:content/root/sibling";

    store.insert_data(path, model(subpage2_root()), Some("child1001"), false);
    assert_eq!(
        items_order(&store, "/content/test/child_page_1/jcr:content/root"),
        ["child1000", "child1001", "sibling"]
    );

    store.insert_data(path, model(subpage2_root()), Some("child1000"), true);
    assert_eq!(
        items_order(&store, "/content/test/child_page_1/jcr:content/root"),
        ["sibling", "child1000", "child1001"]
    );

    store.insert_data(
        "/content/test/child_page_1/jcr:content/root/other",
        Model::new(),
        Some("missing"),
        true,
    );
    assert_eq!(
        items_order(&store, "/content/test/child_page_1/jcr:content/root"),
        ["sibling", "child1000", "child1001", "other"]
    );
}

#[test]
fn test_inserted_data_is_owned_by_store() {
    let mut store = setup_store();
    let mut data = model(json!({ ":type": "text" }));
    let path = "/content/test/page/jcr:content/root/text";

    store.insert_data(path, data.clone(), None, false);
    data.set_property("changed", true);

    let stored = store.get_data(Some(path)).unwrap();
    assert!(stored.property("changed").is_none());
    assert_eq!(
        items_order(&store, "/content/test/page/jcr:content/root"),
        ["child0000", "child0001", "text"]
    );
}

#[test]
fn test_remove_page() {
    let mut store = setup_store();
    assert!(store.data_map().has_child("/content/test/subpage2"));

    assert_eq!(store.remove_data("/content/test/subpage2"), None);

    assert!(!store.data_map().has_child("/content/test/subpage2"));
    assert!(store.data_map().has_child("/content/test/subpage2/subpage22"));
    assert_eq!(store.get_data(Some("/content/test/subpage2")), None);
}

#[test]
fn test_remove_nested_item() {
    let mut store = setup_store();
    let parent = "/content/test/child_page_1/jcr:content/root";

    let removed = store.remove_data("/content/test/child_page_1/jcr:content/root/child1001");

    assert_eq!(removed.as_deref(), Some(parent));
    let root = store.get_data(Some(parent)).unwrap();
    assert!(root.item("child1001").is_none());
    assert_eq!(root.items_order, Some(vec!["child1000".to_string()]));
    assert_eq!(
        store.get_data(Some("/content/test/child_page_1/jcr:content/root/child1001")),
        None
    );
}

#[test]
fn test_remove_item_of_root_page() {
    let mut store = setup_store();

    store.remove_data("/content/test/page/jcr:content/root/child0001");

    assert_eq!(
        items_order(&store, "/content/test/page/jcr:content/root"),
        ["child0000"]
    );
    assert_eq!(
        store.get_data(Some("/content/test/page/jcr:content/root/child0001")),
        None
    );
}

#[test]
fn test_remove_missing_item() {
    let mut store = setup_store();
    let before = store.get_data(None);

    assert_eq!(
        store.remove_data("/content/test/page/jcr:content/root/child9999"),
        None
    );
    assert_eq!(store.remove_data("/content/test/unknown"), None);
    assert_eq!(store.get_data(None), before);
}

#[test]
fn test_set_data_replaces_item_only() {
    let mut store = setup_store();
    let path = "/content/test/page/jcr:content/root/child0000/child0010";

    store.set_data(path, json!({ "key": "ignored", "value": { ":type": "replaced" } }));

    assert_eq!(
        store.get_data(Some(path)),
        Some(model(json!({ ":type": "replaced" })))
    );
    assert_eq!(
        items_order(&store, "/content/test/page/jcr:content/root/child0000"),
        ["child0010", "child0011"]
    );
}

#[test]
fn test_reads_are_copies() {
    let store = setup_store();
    let path = "/content/test/subpage2/jcr:content/root";

    let mut first = store.get_data(Some(path)).unwrap();
    first.set_property("mutation", true);

    let second = store.get_data(Some(path)).unwrap();
    assert!(second.property("mutation").is_none());
}

#[test]
fn test_mutable_reads_are_live() {
    let mut store = setup_store();
    let path = "/content/test/subpage2/jcr:content/root";

    store
        .get_data_mut(Some(path))
        .unwrap()
        .set_property("mutation", true);

    assert_eq!(
        store.get_data(Some(path)).unwrap().property("mutation"),
        Some(&json!(true))
    );
}

#[test]
fn test_initialize_replaces_tree() {
    let mut store = setup_store();
    store.initialize("/content/test/page1", model(page1()));

    assert_eq!(store.root_path(), "/content/test/page1");
    assert_eq!(store.get_data(None), Some(model(page1())));
    assert_eq!(store.get_data(Some("/content/test/child_page_1")), None);
    store.destroy();
}

#[test]
fn test_custom_delimiters() {
    let data = model(json!({
        ":path": "/site",
        ":items": {
            "grid": {
                ":items": {
                    "fragment": {
                        ":items": { "root": { ":items": { "leaf": { ":type": "leaf" } } } }
                    }
                }
            }
        }
    }));
    let store =
        ModelStore::with_delimiters("/site", Some(data), ["jcr:content", "master"]).unwrap();

    assert_eq!(
        store
            .get_data(Some("/site/jcr:content/grid/fragment/master/root/leaf"))
            .and_then(|leaf| leaf.resource_type),
        Some("leaf".to_string())
    );

    assert!(matches!(
        ModelStore::with_delimiters("/site", None, Vec::<&str>::new()),
        Err(StoreError::MissingDelimiters)
    ));
}

#[test]
fn test_removal_example() {
    let data = model(json!({
        ":path": "/content/test/page",
        ":items": {
            "root": {
                ":itemsOrder": ["child0000", "child0001"],
                ":items": { "child0000": {}, "child0001": {} }
            }
        }
    }));
    let mut store = ModelStore::new("/content/test/page", Some(data));

    store.remove_data("/content/test/page/jcr:content/root/child0001");

    assert_eq!(
        items_order(&store, "/content/test/page/jcr:content/root"),
        ["child0000"]
    );
    assert_eq!(
        store.get_data(Some("/content/test/page/jcr:content/root/child0001")),
        None
    );
}

#[test]
fn test_insert_below_missing_parent_is_ignored() {
    let data = model(json!({
        ":path": "/p",
        ":items": {
            "root": {
                ":itemsOrder": ["a"],
                ":items": { "a": { ":type": "text" } }
            }
        }
    }));
    let mut store = ModelStore::new("/p", Some(data));
    let before = store.get_data(None);

    store.insert_data(
        "/p/jcr:content/root/missing/x",
        model(json!({ ":type": "text" })),
        None,
        false,
    );

    assert_eq!(store.get_data(Some("/p/jcr:content/root/missing/x")), None);
    assert_eq!(store.get_data(Some("/p/jcr:content/root/x")), None);
    assert_eq!(items_order(&store, "/p/jcr:content/root"), ["a"]);
    assert_eq!(store.get_data(None), before);

    store.insert_data(
        "/p/jcr:content/unknown/x",
        Model::new(),
        Some("a"),
        true,
    );
    assert_eq!(store.get_data(None), before);
}

#[test]
fn test_insert_then_read_round_trip() {
    let mut store = setup_store();
    let paths = [
        "/content/test/page/jcr:content/root/child0000/child0012",
        "/content/test/child_page_1/jcr:content/root/child1002",
        "/content/test/subpage2/jcr:content/top",
    ];

    for path in paths {
        let data = model(json!({ ":type": "inserted", "at": path }));
        store.insert_data(path, data.clone(), None, false);
        assert_eq!(store.get_data(Some(path)), Some(data), "at {path}");
    }
}

#[test]
fn test_trailing_content_root_reads_page() {
    let store = setup_store();

    assert_eq!(
        store.get_data(Some("/content/test/page/jcr:content/")),
        Some(model(page_model()))
    );
    assert_eq!(
        store.get_data(Some("/content/test/child_page_1/jcr:content/")),
        Some(model(child_page_1()))
    );
}
