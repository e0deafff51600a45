use egui::pos2;
use futures::StreamExt;
use futures::executor::block_on;
use sketchpad::store::Row;
use sketchpad::{Argb, Drawing, DrawingId, DrawingStore, MemoryBackend, Segment, StoreError};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn cat_segments() -> Vec<Segment> {
    vec![Segment::new(pos2(0.0, 0.0), pos2(5.0, 5.0), Argb(0xFF00_0000), 10.0)]
}

fn scribble() -> Vec<Segment> {
    vec![
        Segment::new(pos2(10.0, 10.0), pos2(11.5, 12.0), Argb(0xFF68_5FFF), 20.0),
        Segment::new(pos2(11.5, 12.0), pos2(13.25, 12.5), Argb(0xFF68_5FFF), 20.0),
        Segment::new(pos2(13.25, 12.5), pos2(13.25, 12.5), Argb(0xFFFF_D886), 7.5),
    ]
}

#[test]
fn test_insert_update_delete_scenario() {
    init_logging();
    let store = DrawingStore::in_memory().unwrap();

    let id = block_on(store.insert("cat", cat_segments())).unwrap();
    assert_eq!(id, DrawingId(1));

    let all = block_on(store.get_all()).unwrap();
    let drawings: Vec<_> = all.drawings().cloned().collect();
    assert_eq!(drawings, vec![Drawing::stored(id, "cat", cat_segments())]);

    block_on(store.update(id, Vec::new())).unwrap();
    let updated = block_on(store.get(id)).unwrap();
    assert_eq!(updated, Drawing::stored(id, "cat", Vec::new()));

    block_on(store.delete(id)).unwrap();
    assert!(block_on(store.get_all()).unwrap().is_empty());
}

#[test]
fn test_insert_then_get_preserves_order() {
    let store = DrawingStore::in_memory().unwrap();
    let id = block_on(store.insert("scribble", scribble())).unwrap();

    let drawing = block_on(store.get(id)).unwrap();
    assert_eq!(drawing.id(), Some(id));
    assert_eq!(drawing.name(), "scribble");
    assert_eq!(drawing.segments(), scribble().as_slice());
}

#[test]
fn test_update_missing_fails_without_inserting() {
    let store = DrawingStore::in_memory().unwrap();

    let result = block_on(store.update(DrawingId(7), scribble()));
    assert!(matches!(result, Err(StoreError::NotFound(DrawingId(7)))));
    assert!(block_on(store.get_all()).unwrap().is_empty());

    let result = block_on(store.save(DrawingId(7), "ghost", scribble()));
    assert!(matches!(result, Err(StoreError::NotFound(DrawingId(7)))));
    assert!(block_on(store.get_all()).unwrap().is_empty());
}

#[test]
fn test_get_missing_is_not_found() {
    let store = DrawingStore::in_memory().unwrap();
    assert!(matches!(
        block_on(store.get(DrawingId(3))),
        Err(StoreError::NotFound(DrawingId(3)))
    ));
}

#[test]
fn test_delete_is_idempotent() {
    let store = DrawingStore::in_memory().unwrap();
    block_on(store.delete(DrawingId(42))).unwrap();

    let first = block_on(store.insert("a", cat_segments())).unwrap();
    let second = block_on(store.insert("b", scribble())).unwrap();

    block_on(store.delete(first)).unwrap();
    block_on(store.delete(first)).unwrap();

    let remaining: Vec<_> = block_on(store.get_all())
        .unwrap()
        .drawings()
        .filter_map(Drawing::id)
        .collect();
    assert_eq!(remaining, vec![second]);
}

#[test]
fn test_ids_are_never_reused() {
    let store = DrawingStore::in_memory().unwrap();
    let first = block_on(store.insert("a", Vec::new())).unwrap();
    block_on(store.delete(first)).unwrap();
    let second = block_on(store.insert("b", Vec::new())).unwrap();
    assert!(second > first);
}

#[test]
fn test_rename_keeps_segments() {
    let store = DrawingStore::in_memory().unwrap();
    let id = block_on(store.insert("cat", scribble())).unwrap();

    block_on(store.rename(id, "dog")).unwrap();
    let drawing = block_on(store.get(id)).unwrap();
    assert_eq!(drawing.name(), "dog");
    assert_eq!(drawing.segments(), scribble().as_slice());

    assert!(matches!(
        block_on(store.rename(DrawingId(99), "nobody")),
        Err(StoreError::NotFound(DrawingId(99)))
    ));
}

#[test]
fn test_save_overwrites_name_and_segments() {
    let store = DrawingStore::in_memory().unwrap();
    let id = block_on(store.insert("cat", cat_segments())).unwrap();

    block_on(store.save(id, "tiger", scribble())).unwrap();
    assert_eq!(
        block_on(store.get(id)).unwrap(),
        Drawing::stored(id, "tiger", scribble())
    );
}

#[test]
fn test_operations_apply_in_issue_order() {
    let store = DrawingStore::in_memory().unwrap();

    // Issued back to back, awaited afterwards.
    let insert = store.insert("cat", cat_segments());
    let update = store.update(DrawingId(1), scribble());
    let rename = store.rename(DrawingId(1), "kitten");

    assert_eq!(block_on(insert).unwrap(), DrawingId(1));
    block_on(update).unwrap();
    block_on(rename).unwrap();

    assert_eq!(
        block_on(store.get(DrawingId(1))).unwrap(),
        Drawing::stored(DrawingId(1), "kitten", scribble())
    );
}

#[test]
fn test_dropped_future_still_runs() {
    let store = DrawingStore::in_memory().unwrap();
    drop(store.insert("fire and forget", cat_segments()));

    let all = block_on(store.get_all()).unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn test_subscriber_sees_every_mutation_in_order() {
    init_logging();
    let store = DrawingStore::in_memory().unwrap();
    let mut snapshots = store.subscribe_all();

    let initial = block_on(snapshots.next()).unwrap();
    assert!(initial.is_empty());

    let id = block_on(store.insert("cat", cat_segments())).unwrap();
    let after_insert = block_on(snapshots.next()).unwrap();
    let drawings: Vec<_> = after_insert.drawings().cloned().collect();
    assert_eq!(drawings, vec![Drawing::stored(id, "cat", cat_segments())]);

    block_on(store.update(id, Vec::new())).unwrap();
    let after_update = block_on(snapshots.next()).unwrap();
    let drawings: Vec<_> = after_update.drawings().cloned().collect();
    assert_eq!(drawings, vec![Drawing::stored(id, "cat", Vec::new())]);

    block_on(store.delete(id)).unwrap();
    let after_delete = block_on(snapshots.next()).unwrap();
    assert!(after_delete.is_empty());
}

#[test]
fn test_late_subscriber_gets_current_state_first() {
    let store = DrawingStore::in_memory().unwrap();
    block_on(store.insert("a", cat_segments())).unwrap();
    block_on(store.insert("b", scribble())).unwrap();

    let mut snapshots = store.subscribe_all();
    let first = block_on(snapshots.next()).unwrap();
    let names: Vec<_> = first.summaries().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_single_record_subscription() {
    let store = DrawingStore::in_memory().unwrap();
    let mut watched = store.subscribe(DrawingId(1));

    assert_eq!(block_on(watched.next()).unwrap(), None);

    block_on(store.insert("cat", cat_segments())).unwrap();
    let entry = block_on(watched.next()).unwrap().unwrap().unwrap();
    assert_eq!(entry.name(), "cat");

    block_on(store.delete(DrawingId(1))).unwrap();
    assert_eq!(block_on(watched.next()).unwrap(), None);
}

#[test]
fn test_corrupt_record_is_reported_per_record() {
    init_logging();
    let backend = MemoryBackend::with_rows([
        Row {
            id: DrawingId(1),
            name: "good".to_owned(),
            draw: "[]".to_owned(),
        },
        Row {
            id: DrawingId(2),
            name: "bad".to_owned(),
            draw: r#"[{"start":{"x":1"#.to_owned(),
        },
    ]);
    let store = DrawingStore::new(backend).unwrap();

    let all = block_on(store.get_all()).unwrap();
    assert_eq!(all.drawings().count(), 1);
    let corrupt: Vec<_> = all.corrupt().map(|record| record.id).collect();
    assert_eq!(corrupt, vec![DrawingId(2)]);

    assert!(matches!(
        block_on(store.get(DrawingId(2))),
        Err(StoreError::Deserialization { id: DrawingId(2), .. })
    ));

    // Overwriting the segments repairs the record.
    block_on(store.update(DrawingId(2), scribble())).unwrap();
    assert_eq!(block_on(store.get(DrawingId(2))).unwrap().name(), "bad");

    // New ids continue after the seeded rows.
    assert_eq!(block_on(store.insert("new", Vec::new())).unwrap(), DrawingId(3));
}
