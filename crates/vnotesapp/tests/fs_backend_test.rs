use chrono::{TimeZone, Utc};
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;
use vnotesapp::clock::ManualClock;
use vnotesapp::engine::{Durability, EngineSettings, PersistenceEngine};
use vnotesapp::repository::{NoteRepository, DEFAULT_RATE_LIMIT};
use vnotesapp::store::{FsBackend, MemBackend, StorageBackend, Tier, TieredStore};

fn setup() -> (TempDir, FsBackend) {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::new(dir.path().join("data"));
    (dir, backend)
}

fn clock() -> Rc<ManualClock> {
    Rc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
    ))
}

fn open(root: &std::path::Path, clock: &Rc<ManualClock>) -> NoteRepository {
    let store = TieredStore::select(
        Some(Box::new(FsBackend::new(root.to_path_buf()))),
        Some(Box::new(MemBackend::new())),
    );
    let engine = PersistenceEngine::new(store, EngineSettings::default(), clock.clone());
    NoteRepository::open(engine, clock.clone(), DEFAULT_RATE_LIMIT)
}

#[test]
fn test_fs_backend_basic_io() {
    let (_dir, backend) = setup();

    backend.write("vnotes-data", "Hello World").unwrap();
    assert_eq!(
        backend.read("vnotes-data").unwrap(),
        Some("Hello World".to_string())
    );

    backend.remove("vnotes-data").unwrap();
    assert_eq!(backend.read("vnotes-data").unwrap(), None);
}

#[test]
fn test_fs_backend_atomic_write_artifacts() {
    let (_dir, backend) = setup();

    backend.write("vnotes-data", "Atomic").unwrap();
    backend.write("vnotes-data", "Atomic again").unwrap();

    let expected = backend.key_path("vnotes-data");
    assert_eq!(fs::read_to_string(&expected).unwrap(), "Atomic again");

    for entry in fs::read_dir(backend.root()).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_fs_backend_probe_leaves_nothing_behind() {
    let (_dir, backend) = setup();

    assert!(backend.probe());
    assert_eq!(fs::read_dir(backend.root()).unwrap().count(), 0);
}

#[test]
fn test_fs_backend_unwritable_root_fails_probe() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();

    let backend = FsBackend::new(blocker.join("data"));

    assert!(!backend.probe());
    let store = TieredStore::select(Some(Box::new(backend)), Some(Box::new(MemBackend::new())));
    assert_eq!(store.tiers(), vec![Tier::Ephemeral]);
}

#[test]
fn test_notes_persist_across_sessions() {
    let dir = TempDir::new().unwrap();
    let clock = clock();

    let mut repo = open(dir.path(), &clock);
    let outcome = repo.create("Shopping", "Buy milk").unwrap();
    assert_eq!(outcome.durability, Durability::Durable);
    repo.teardown();

    let repo = open(dir.path(), &clock);
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.notes()[0], outcome.value);
}

#[test]
fn test_corrupt_records_on_disk_are_dropped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vnotes-data.json");
    fs::write(
        &path,
        r#"{
            "notes": [
                {"id": "ok", "title": "Fine", "content": "body",
                 "createdAt": "2024-01-01T00:00:00.000Z", "updatedAt": "2024-01-01T00:00:00.000Z"},
                {"id": "bad", "title": "", "content": "body",
                 "createdAt": "2024-01-01T00:00:00.000Z", "updatedAt": "2024-01-01T00:00:00.000Z"},
                {"id": "worse", "title": "No timestamps", "content": "body"}
            ],
            "lastModified": "2024-01-01T00:00:00.000Z",
            "version": "1.0"
        }"#,
    )
    .unwrap();

    let repo = open(dir.path(), &clock());

    assert_eq!(repo.len(), 1);
    assert_eq!(repo.notes()[0].id, "ok");
}

#[test]
fn test_legacy_array_on_disk_is_read() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("vnotes-data.json"),
        r#"[{"id": "old", "title": "From before", "content": "body",
             "createdAt": "2023-06-01T12:00:00Z", "updatedAt": "2023-06-02T12:00:00Z"}]"#,
    )
    .unwrap();

    let repo = open(dir.path(), &clock());

    assert_eq!(repo.len(), 1);
    assert_eq!(repo.notes()[0].title, "From before");
}

#[test]
fn test_garbage_on_disk_starts_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("vnotes-data.json"), "{{{ not json").unwrap();

    let mut repo = open(dir.path(), &clock());
    assert!(repo.is_empty());

    repo.create("Fresh", "start").unwrap();
    let repo = open(dir.path(), &clock());
    assert_eq!(repo.len(), 1);
}
