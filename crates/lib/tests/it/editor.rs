//! Editor updates applied through the manager.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pagemodel::{EditorClient, EditorCommand, Model, PageModelEvent};
use serde_json::json;
use tokio::sync::mpsc;

use crate::helpers::*;

const CHILD0000: &str = "/content/test/page/jcr:content/root/child0000";
const CHILD0010: &str = "/content/test/page/jcr:content/root/child0000/child0010";
const CHILD0011: &str = "/content/test/page/jcr:content/root/child0000/child0011";

async fn setup() -> (Arc<pagemodel::ModelManager>, EditorClient) {
    let manager = setup_manager(Arc::new(MockClient::new())).await;
    let editor = EditorClient::new(Arc::clone(&manager));
    (manager, editor)
}

fn watch(manager: &pagemodel::ModelManager, path: &str) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let listener_count = Arc::clone(&count);
    manager.add_listener(
        path,
        Arc::new(move |_: &str| -> pagemodel::Result<()> {
            listener_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );
    count
}

async fn items_order(manager: &pagemodel::ModelManager, path: &str) -> Vec<String> {
    manager
        .get_data(path)
        .await
        .unwrap()
        .items_order
        .unwrap_or_default()
}

#[tokio::test]
async fn test_delete_notifies_parent() {
    let (manager, editor) = setup().await;
    let parent = watch(&manager, CHILD0000);
    let mut events = manager.subscribe_events();

    editor
        .handle_message(&json!({ "msg": { "cmd": "delete", "path": CHILD0010 } }))
        .unwrap();

    assert_eq!(parent.load(Ordering::SeqCst), 1);
    assert_eq!(items_order(&manager, CHILD0000).await, ["child0011"]);

    let PageModelEvent::Loaded { model } = events.try_recv().unwrap() else {
        panic!("expected a loaded event");
    };
    let grid = model
        .item("root")
        .and_then(|root| root.item("child0000"))
        .unwrap();
    assert!(grid.item("child0010").is_none());
    assert!(grid.item("child0011").is_some());
}

#[tokio::test]
async fn test_replace_updates_item_in_place() {
    let (manager, editor) = setup().await;
    let item = watch(&manager, CHILD0010);

    editor
        .apply(EditorCommand::Replace {
            path: CHILD0010.to_string(),
            data: json!({ "key": "child0010", "value": { ":type": "replaced", "text": "new" } }),
        })
        .unwrap();

    assert_eq!(item.load(Ordering::SeqCst), 1);
    let replaced = manager.get_data(CHILD0010).await.unwrap();
    assert_eq!(replaced.resource_type.as_deref(), Some("replaced"));
    assert_eq!(replaced.property("text"), Some(&json!("new")));
    assert_eq!(items_order(&manager, CHILD0000).await, ["child0010", "child0011"]);
}

#[tokio::test]
async fn test_insert_before_and_after() {
    let (manager, editor) = setup().await;
    let parent = watch(&manager, CHILD0000);

    editor
        .handle_message(&json!({
            "cmd": "insertBefore",
            "path": CHILD0011,
            "data": { "key": "before", "value": { ":type": "text" } }
        }))
        .unwrap();
    editor
        .handle_message(&json!({
            "cmd": "insertAfter",
            "path": CHILD0011,
            "data": { "key": "after", "value": { ":type": "image" } }
        }))
        .unwrap();

    assert_eq!(parent.load(Ordering::SeqCst), 2);
    assert_eq!(
        items_order(&manager, CHILD0000).await,
        ["child0010", "before", "child0011", "after"]
    );

    let inserted: Model = manager
        .get_data(format!("{CHILD0000}/after"))
        .await
        .unwrap();
    assert_eq!(inserted.resource_type.as_deref(), Some("image"));
}

#[tokio::test]
async fn test_invalid_messages_leave_tree_untouched() {
    let (manager, editor) = setup().await;
    let before = manager.get_data("").await.unwrap();
    let mut events = manager.subscribe_events();

    let err = editor.handle_message(&json!({ "cmd": "delete" })).unwrap_err();
    assert!(err.is_malformed_input());

    let err = editor
        .handle_message(&json!({ "cmd": "move", "path": CHILD0010 }))
        .unwrap_err();
    assert!(matches!(err, pagemodel::Error::Editor(e) if e.is_unsupported_command()));

    assert_eq!(manager.get_data("").await.unwrap(), before);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_listen_applies_channel_messages() {
    let (manager, editor) = setup().await;
    let (tx, rx) = mpsc::channel(8);

    let listener = tokio::spawn({
        let editor = editor.clone();
        async move { editor.listen(rx).await }
    });

    tx.send(json!({ "cmd": "unknown", "path": CHILD0010 }))
        .await
        .unwrap();
    tx.send(json!({ "cmd": "delete", "path": CHILD0010 }))
        .await
        .unwrap();
    tx.send(json!({ "cmd": "delete", "path": CHILD0011 }))
        .await
        .unwrap();
    drop(tx);

    listener.await.unwrap();

    assert!(items_order(&manager, CHILD0000).await.is_empty());
}

#[tokio::test]
async fn test_panicking_listener_does_not_abort_update() {
    let (manager, editor) = setup().await;
    manager.add_listener(
        CHILD0000,
        Arc::new(|_: &str| -> pagemodel::Result<()> { panic!("listener bug") }),
    );
    let parent = watch(&manager, CHILD0000);
    let mut events = manager.subscribe_events();

    editor
        .handle_message(&json!({ "cmd": "delete", "path": CHILD0011 }))
        .unwrap();

    assert_eq!(parent.load(Ordering::SeqCst), 1);
    assert_eq!(items_order(&manager, CHILD0000).await, ["child0010"]);
    assert!(matches!(
        events.try_recv().unwrap(),
        PageModelEvent::Loaded { .. }
    ));
}
