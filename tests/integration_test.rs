use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Offset, Utc};
use image::{DynamicImage, GrayImage, Luma};
use stikqr::generate::{generate, Generator};
use stikqr::platform::ShareSink;
use stikqr::report::export::{ExportFormatter, Exporter, SEPARATOR};
use stikqr::scan::frames::DirectoryFrames;
use stikqr::scan::live::{FeedOptions, LiveFeed};
use stikqr::scan::{self, DEFAULT_MAX_DIMENSION};
use stikqr::store::settings::SqliteSettings;
use stikqr::store::CodeStore;

/// Share sink that only records what it was handed.
#[derive(Default)]
struct Collect {
    shared: RefCell<Vec<PathBuf>>,
}

impl ShareSink for Collect {
    fn share(&self, path: &Path) -> stikqr::Result<()> {
        self.shared.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

#[test]
fn history_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("stikqr.db");

    let first_id = {
        let mut store = CodeStore::open(SqliteSettings::open(&db).unwrap());
        let first = store.append("https://example.com").unwrap();
        store.append("second");
        store.append("https://example.com");
        first.id
    };

    let mut store = CodeStore::open(SqliteSettings::open(&db).unwrap());
    assert_eq!(store.len(), 2);
    assert_eq!(store.codes()[0].id, first_id);

    store.clear_all();
    let store = CodeStore::open(SqliteSettings::open(&db).unwrap());
    assert!(store.is_empty());
}

#[test]
fn generated_png_scans_back_into_history_once() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("code.png");
    Generator::default().save("WIFI:S:home;T:WPA;P:secret;;", &png).unwrap();

    let mut store = CodeStore::open(SqliteSettings::open_in_memory().unwrap());
    for _ in 0..2 {
        let payload = scan::read_image(&png, DEFAULT_MAX_DIMENSION).unwrap().unwrap();
        store.append(&payload);
    }

    assert_eq!(store.len(), 1);
    assert_eq!(store.codes()[0].content, "WIFI:S:home;T:WPA;P:secret;;");
}

#[test]
fn live_feed_from_frame_directory_fills_history() {
    let frames = tempfile::tempdir().unwrap();
    let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(120, 120, Luma([255])));

    generate("A").unwrap().save(frames.path().join("001.png")).unwrap();
    blank.save(frames.path().join("002.png")).unwrap();
    generate("A").unwrap().save(frames.path().join("003.png")).unwrap();
    generate("B").unwrap().save(frames.path().join("004.png")).unwrap();

    let mut store = CodeStore::open(SqliteSettings::open_in_memory().unwrap());
    let mut feed = LiveFeed::new(DirectoryFrames::new(frames.path(), false), FeedOptions::default());

    let subscription = feed.start().unwrap();
    let delivered = subscription.dispatch_until(None, |payload| {
        store.append(&payload);
    });
    feed.stop();

    assert_eq!(delivered, 3);
    let contents: Vec<&str> = store.codes().iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, ["A", "B"]);
}

#[test]
fn export_all_hands_file_to_share_sink() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = CodeStore::open(SqliteSettings::open_in_memory().unwrap());
    store.append("A");
    store.append("B");

    let exporter = Exporter::new(ExportFormatter::new(Utc.fix()), dir.path());
    let sink = Collect::default();
    let path = exporter.export_all(store.codes(), Utc::now()).unwrap();
    sink.share(&path).unwrap();

    let shared = sink.shared.borrow();
    assert_eq!(shared.as_slice(), [path.clone()]);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("StikQR Export\nDate: "));
    assert_eq!(text.matches(SEPARATOR).count(), 1);
}

#[test]
fn single_export_uses_record_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = CodeStore::open(SqliteSettings::open_in_memory().unwrap());
    let code = store.append("https://example.com").unwrap();

    let exporter = Exporter::new(ExportFormatter::new(Utc.fix()), dir.path());
    let path = exporter.export_single(store.resolve(&code.short_id()).unwrap(), Utc::now()).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        format!("ScannedQRCode_{}.txt", code.id)
    );
}
