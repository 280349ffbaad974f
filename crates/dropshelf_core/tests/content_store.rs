use dropshelf_core::{ContentError, ContentStore};
use std::fs;

fn store_in(dir: &tempfile::TempDir) -> ContentStore {
    ContentStore::new(dir.path().join("storage"), dir.path().join("thumbnails"))
}

#[test]
fn copy_preserves_name_and_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let source = dir.path().join("notes.txt");
    fs::write(&source, b"shelf contents").unwrap();

    let relative = store.copy_into_storage(&source).unwrap();
    assert_eq!(relative, "notes.txt");
    assert_eq!(
        fs::read(store.resolve_payload(&relative)).unwrap(),
        b"shelf contents"
    );
    assert_eq!(store.size_of(&relative), 14);
}

#[test]
fn colliding_names_never_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let first_dir = dir.path().join("a");
    let second_dir = dir.path().join("b");
    fs::create_dir_all(&first_dir).unwrap();
    fs::create_dir_all(&second_dir).unwrap();
    let first = first_dir.join("draft.md");
    let second = second_dir.join("draft.md");
    fs::write(&first, b"first draft").unwrap();
    fs::write(&second, b"second draft").unwrap();

    let first_rel = store.copy_into_storage(&first).unwrap();
    let second_rel = store.copy_into_storage(&second).unwrap();

    assert_ne!(first_rel, second_rel);
    assert!(second_rel.starts_with("draft-"));
    assert!(second_rel.ends_with(".md"));
    assert_eq!(fs::read(store.resolve_payload(&first_rel)).unwrap(), b"first draft");
    assert_eq!(
        fs::read(store.resolve_payload(&second_rel)).unwrap(),
        b"second draft"
    );
}

#[test]
fn unreadable_source_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let missing = dir.path().join("does-not-exist.bin");
    assert!(matches!(
        store.copy_into_storage(&missing),
        Err(ContentError::UnreadableSource { .. })
    ));

    // Directories are not regular files.
    assert!(matches!(
        store.copy_into_storage(dir.path()),
        Err(ContentError::UnreadableSource { .. })
    ));
}

#[test]
fn size_of_missing_payload_is_zero() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert_eq!(store.size_of("never-stored.bin"), 0);
}

#[test]
fn write_payload_applies_collision_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let first = store.write_payload(b"one", "pasted.png").unwrap();
    let second = store.write_payload(b"two", "pasted.png").unwrap();

    assert_eq!(first, "pasted.png");
    assert_ne!(first, second);
    assert_eq!(fs::read(store.resolve_payload(&first)).unwrap(), b"one");
    assert_eq!(fs::read(store.resolve_payload(&second)).unwrap(), b"two");
}

#[test]
fn thumbnails_are_keyed_and_overwritable() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let first = store.write_thumbnail(b"v1", "item-1234").unwrap();
    let second = store.write_thumbnail(b"v2", "item-1234").unwrap();

    assert_eq!(first, "item-1234.png");
    assert_eq!(first, second);
    assert_eq!(
        fs::read(store.thumbnail_root().join(&second)).unwrap(),
        b"v2"
    );
}

#[test]
fn roots_are_created_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    assert!(!store.payload_root().exists());
    assert!(!store.thumbnail_root().exists());

    let source = dir.path().join("seed.txt");
    fs::write(&source, b"x").unwrap();
    store.copy_into_storage(&source).unwrap();
    assert!(store.payload_root().exists());

    store.write_thumbnail(b"t", "seed").unwrap();
    assert!(store.thumbnail_root().exists());
}
