use dropshelf_core::{
    promised_file, ContentStore, DeferredSink, DragPayload, ItemKind, ResolveError, ResolveResult,
    ShelfItem, ShelfStore, SourceResolver,
};
use std::fs;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

const DELIVERY_WAIT: Duration = Duration::from_secs(5);

fn fixture() -> (Arc<ShelfStore>, SourceResolver, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ShelfStore::open_in_memory().unwrap());
    let content = Arc::new(ContentStore::new(
        dir.path().join("storage"),
        dir.path().join("thumbnails"),
    ));
    let resolver = SourceResolver::new(Arc::clone(&store), content);
    (store, resolver, dir)
}

fn collecting_sink() -> (DeferredSink, mpsc::Receiver<ResolveResult<ShelfItem>>) {
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let sink: DeferredSink = Arc::new(move |result| {
        tx.lock().unwrap().send(result).unwrap();
    });
    (sink, rx)
}

#[test]
fn fulfilled_promise_inserts_a_deferred_file_item() {
    let (store, resolver, dir) = fixture();
    let shelf = store.create_shelf(0.0, 0.0).unwrap();

    let (ticket, promise) = promised_file();
    let payload = DragPayload {
        promised_files: vec![Box::new(promise)],
        ..DragPayload::default()
    };

    let (sink, rx) = collecting_sink();
    let outcome = resolver.resolve(payload, shelf.id, sink);
    assert!(outcome.items.is_empty());
    assert_eq!(outcome.deferred, 1);

    let delivered = dir.path().join("promised.txt");
    fs::write(&delivered, b"arrived later").unwrap();
    ticket.fulfill(delivered);

    let item = rx.recv_timeout(DELIVERY_WAIT).unwrap().unwrap();
    assert_eq!(item.kind, ItemKind::DeferredFile);
    assert_eq!(item.display_name, "promised.txt");
    assert_eq!(item.file_size, 13);

    let stored = store.fetch_items(shelf.id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, item.id);

    // Exactly one delivery; the channel closes after it.
    assert!(rx.recv_timeout(DELIVERY_WAIT).is_err());
}

#[test]
fn failed_delivery_reports_exactly_once_and_stores_nothing() {
    let (store, resolver, _dir) = fixture();
    let shelf = store.create_shelf(0.0, 0.0).unwrap();

    let (ticket, promise) = promised_file();
    let payload = DragPayload {
        promised_files: vec![Box::new(promise)],
        ..DragPayload::default()
    };

    let (sink, rx) = collecting_sink();
    resolver.resolve(payload, shelf.id, sink);

    ticket.fail("source application quit");

    let result = rx.recv_timeout(DELIVERY_WAIT).unwrap();
    assert!(matches!(result, Err(ResolveError::UnreadableSource(_))));
    assert!(store.fetch_items(shelf.id).unwrap().is_empty());
    assert!(rx.recv_timeout(DELIVERY_WAIT).is_err());
}

#[test]
fn dropped_ticket_still_completes_with_a_failure() {
    let (store, resolver, _dir) = fixture();
    let shelf = store.create_shelf(0.0, 0.0).unwrap();

    let (ticket, promise) = promised_file();
    let payload = DragPayload {
        promised_files: vec![Box::new(promise)],
        ..DragPayload::default()
    };

    let (sink, rx) = collecting_sink();
    resolver.resolve(payload, shelf.id, sink);

    drop(ticket);

    let result = rx.recv_timeout(DELIVERY_WAIT).unwrap();
    assert!(result.is_err());
    assert!(store.fetch_items(shelf.id).unwrap().is_empty());
}

#[test]
fn registered_promises_short_circuit_lower_tiers() {
    let (store, resolver, _dir) = fixture();
    let shelf = store.create_shelf(0.0, 0.0).unwrap();

    let (ticket, promise) = promised_file();
    let payload = DragPayload {
        promised_files: vec![Box::new(promise)],
        links: vec!["https://example.com/x".to_string()],
        text: Some("fallback text".to_string()),
        ..DragPayload::default()
    };

    let (sink, rx) = collecting_sink();
    let outcome = resolver.resolve(payload, shelf.id, sink);

    // Registration counts as produced: no link or text items.
    assert!(outcome.items.is_empty());
    assert_eq!(outcome.deferred, 1);
    assert!(store.fetch_items(shelf.id).unwrap().is_empty());

    ticket.fail("never materialized");
    assert!(rx.recv_timeout(DELIVERY_WAIT).unwrap().is_err());
    assert!(store.fetch_items(shelf.id).unwrap().is_empty());
}

#[test]
fn multiple_promises_complete_independently() {
    let (store, resolver, dir) = fixture();
    let shelf = store.create_shelf(0.0, 0.0).unwrap();

    let (ticket_a, promise_a) = promised_file();
    let (ticket_b, promise_b) = promised_file();
    let payload = DragPayload {
        promised_files: vec![Box::new(promise_a), Box::new(promise_b)],
        ..DragPayload::default()
    };

    let (sink, rx) = collecting_sink();
    let outcome = resolver.resolve(payload, shelf.id, sink);
    assert_eq!(outcome.deferred, 2);

    // Complete out of registration order; one succeeds, one fails.
    ticket_b.fail("expired");
    let delivered = dir.path().join("slow.bin");
    fs::write(&delivered, b"bytes").unwrap();
    ticket_a.fulfill(delivered);

    let first = rx.recv_timeout(DELIVERY_WAIT).unwrap();
    let second = rx.recv_timeout(DELIVERY_WAIT).unwrap();
    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let stored = store.fetch_items(shelf.id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].kind, ItemKind::DeferredFile);
    assert_eq!(stored[0].display_name, "slow.bin");
}
