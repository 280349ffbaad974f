use dropshelf_core::{ItemKind, ShelfItem, ShelfStore, StoreError};
use uuid::Uuid;

fn text_item(content: &str) -> ShelfItem {
    let mut item = ShelfItem::new(ItemKind::Text, content);
    item.file_size = content.len() as i64;
    item
}

#[test]
fn items_are_returned_in_insertion_order() {
    let store = ShelfStore::open_in_memory().unwrap();
    let shelf = store.create_shelf(0.0, 0.0).unwrap();

    let first = text_item("first");
    let second = text_item("second");
    let third = text_item("third");
    store.add_item(&first, shelf.id).unwrap();
    store.add_item(&second, shelf.id).unwrap();
    store.add_item(&third, shelf.id).unwrap();

    let items = store.fetch_items(shelf.id).unwrap();
    let names: Vec<_> = items.iter().map(|item| item.display_name.as_str()).collect();
    assert_eq!(names, ["first", "second", "third"]);
}

#[test]
fn add_item_to_missing_shelf_fails_without_effect() {
    let store = ShelfStore::open_in_memory().unwrap();
    let missing = Uuid::new_v4();

    let err = store.add_item(&text_item("orphan"), missing).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));

    // The failed insert left nothing behind.
    let shelf = store.create_shelf(0.0, 0.0).unwrap();
    assert!(store.fetch_items(shelf.id).unwrap().is_empty());
    assert!(store.fetch_items(missing).unwrap().is_empty());
}

#[test]
fn add_item_enforces_payload_invariant() {
    let store = ShelfStore::open_in_memory().unwrap();
    let shelf = store.create_shelf(0.0, 0.0).unwrap();

    // File kind with no stored payload must be rejected.
    let invalid = ShelfItem::new(ItemKind::File, "report.pdf");
    assert!(matches!(
        store.add_item(&invalid, shelf.id),
        Err(StoreError::Validation(_))
    ));
    assert!(store.fetch_items(shelf.id).unwrap().is_empty());
}

#[test]
fn delete_shelf_cascades_to_items() {
    let store = ShelfStore::open_in_memory().unwrap();
    let shelf = store.create_shelf(0.0, 0.0).unwrap();
    let other = store.create_shelf(10.0, 10.0).unwrap();

    store.add_item(&text_item("a"), shelf.id).unwrap();
    store.add_item(&text_item("b"), shelf.id).unwrap();
    let kept = text_item("kept");
    store.add_item(&kept, other.id).unwrap();

    store.delete_shelf(shelf.id).unwrap();

    assert!(store.fetch_shelf(shelf.id).unwrap().is_none());
    assert!(store.fetch_items(shelf.id).unwrap().is_empty());

    // Sibling shelves keep their items.
    let remaining = store.fetch_items(other.id).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);
}

#[test]
fn delete_items_skips_missing_ids() {
    let store = ShelfStore::open_in_memory().unwrap();
    let shelf = store.create_shelf(0.0, 0.0).unwrap();

    let keep = text_item("keep");
    let remove = text_item("remove");
    store.add_item(&keep, shelf.id).unwrap();
    store.add_item(&remove, shelf.id).unwrap();

    store
        .delete_items(&[remove.id, Uuid::new_v4(), Uuid::new_v4()])
        .unwrap();

    let items = store.fetch_items(shelf.id).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, keep.id);

    // Empty id list is a no-op.
    store.delete_items(&[]).unwrap();
    assert_eq!(store.fetch_items(shelf.id).unwrap().len(), 1);
}

#[test]
fn items_roundtrip_payload_and_thumbnail_paths() {
    let store = ShelfStore::open_in_memory().unwrap();
    let shelf = store.create_shelf(0.0, 0.0).unwrap();

    let mut item = ShelfItem::new(ItemKind::File, "photo.jpg");
    item.payload_path = Some("photo.jpg".to_string());
    item.thumbnail_path = Some(format!("{}.png", item.id));
    item.file_size = 4096;
    store.add_item(&item, shelf.id).unwrap();

    let fetched = store.fetch_items(shelf.id).unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0], item);
}
