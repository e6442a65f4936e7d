use tempfile::TempDir;

use medialog::{
    backend::raster::RasterImage,
    color::Rgba8,
    command::CommandId,
    document::{Document, RasterDocument},
    op::Operation,
    persist::{LogSink, PersistError, sqlite::SqliteJournal},
};

fn doc() -> RasterDocument {
    Document::new(RasterImage::blank(64, 48, Rgba8::BLACK))
}

#[test]
fn journal_round_trips_log_and_order() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("edits.db");

    let mut doc = doc();
    doc.crop(4, 4, 32, 32).expect("crop");
    doc.rotate_with_background(15.0, "#336699").expect("rotate");
    doc.brightness(-12.5).expect("brightness");

    let mut journal = SqliteJournal::open(&db_path).expect("open sqlite");
    assert_eq!(doc.flush_to(&mut journal, "photo").expect("flush"), 3);
    journal.flush().expect("checkpoint");
    drop(journal);

    let journal = SqliteJournal::open(&db_path).expect("reopen sqlite");
    let loaded = journal.load_log("photo", 1024).expect("load");
    assert_eq!(&loaded, doc.log());
    assert_eq!(journal.latest_index("photo").expect("latest"), Some(2));

    let mut replayed = self::doc();
    replayed.replay(&loaded).expect("replay");
    assert_eq!(replayed.serialize().expect("json"), doc.serialize().expect("json"));
    assert_eq!(replayed.extent(), doc.extent());
}

#[test]
fn flush_only_writes_new_operations() {
    let mut journal = SqliteJournal::open_in_memory().expect("open");
    let mut doc = doc();

    doc.negate().expect("negate");
    assert_eq!(doc.flush_to(&mut journal, "a").expect("flush"), 1);
    assert_eq!(doc.flush_to(&mut journal, "a").expect("flush"), 0);

    doc.vertical_flip().expect("flip");
    doc.normalize().expect("normalize");
    assert_eq!(doc.flush_to(&mut journal, "a").expect("flush"), 2);

    let commands: Vec<_> = journal
        .load_log("a", 16)
        .expect("load")
        .iter()
        .map(Operation::command)
        .collect();
    assert_eq!(
        commands,
        vec![CommandId::Negate, CommandId::VerticalFlip, CommandId::Normalize]
    );
}

#[test]
fn documents_are_kept_apart() {
    let mut journal = SqliteJournal::open_in_memory().expect("open");
    let mut first = doc();
    let mut second = doc();
    first.negate().expect("negate");
    second.equalize().expect("equalize");
    second.despeckle().expect("despeckle");
    first.flush_to(&mut journal, "first").expect("flush");
    second.flush_to(&mut journal, "second").expect("flush");

    assert_eq!(journal.documents().expect("docs"), vec!["first", "second"]);
    assert_eq!(journal.load_log("second", 16).expect("load").len(), 2);
    assert_eq!(journal.latest_index("missing").expect("latest"), None);

    assert_eq!(journal.clear("first").expect("clear"), 1);
    assert_eq!(journal.documents().expect("docs"), vec!["second"]);
}

#[test]
fn non_contiguous_append_is_rejected() {
    let mut journal = SqliteJournal::open_in_memory().expect("open");
    let ops = [Operation::new(CommandId::Negate)];
    journal.append_ops("doc", 0, &ops).expect("first append");
    let err = journal.append_ops("doc", 5, &ops).expect_err("gap");
    assert!(matches!(err, PersistError::Message(_)));
    assert_eq!(journal.append_ops("doc", 1, &ops).expect("next append"), 2);
}

#[test]
fn loading_into_a_smaller_log_fails() {
    let mut journal = SqliteJournal::open_in_memory().expect("open");
    let ops = vec![Operation::new(CommandId::Negate); 3];
    journal.append_ops("doc", 0, &ops).expect("append");
    assert!(matches!(journal.load_log("doc", 2), Err(PersistError::Wire(_))));
}
