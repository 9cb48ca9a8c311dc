//! Two contexts sharing storage, the way two browser tabs share local storage.

use chrono::{TimeZone, Utc};
use std::rc::Rc;
use std::time::Duration;
use vnotesapp::clock::ManualClock;
use vnotesapp::commands::{export, import};
use vnotesapp::engine::{AutosaveOutcome, Durability, EngineSettings, PersistenceEngine};
use vnotesapp::repository::{NoteRepository, DEFAULT_RATE_LIMIT};
use vnotesapp::store::{MemBackend, TieredStore};
use vnotesapp::sync::ChangeHub;

struct Shared {
    clock: Rc<ManualClock>,
    durable: Rc<MemBackend>,
    ephemeral: Rc<MemBackend>,
    hub: ChangeHub,
}

impl Shared {
    fn new() -> Self {
        Self {
            clock: Rc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            )),
            durable: Rc::new(MemBackend::new()),
            ephemeral: Rc::new(MemBackend::new()),
            hub: ChangeHub::new(),
        }
    }

    fn open(&self) -> NoteRepository {
        let store = TieredStore::select(
            Some(Box::new(Rc::clone(&self.durable))),
            Some(Box::new(Rc::clone(&self.ephemeral))),
        );
        let engine = PersistenceEngine::new(store, EngineSettings::default(), self.clock.clone())
            .with_change_hub(&self.hub);
        NoteRepository::open(engine, self.clock.clone(), DEFAULT_RATE_LIMIT)
    }
}

#[test]
fn writes_in_one_context_reach_the_other() {
    let shared = Shared::new();
    let mut left = shared.open();
    let mut right = shared.open();

    let note = left.create("Shopping", "Buy milk").unwrap().value;

    assert!(right.engine().has_external_changes());
    assert!(right.apply_external_changes());
    assert_eq!(right.notes(), &[note.clone()]);

    // The writer does not hear its own echo.
    assert!(!left.apply_external_changes());

    shared.clock.advance(Duration::from_millis(300));
    right.delete(&note.id).unwrap();
    assert!(left.apply_external_changes());
    assert!(left.is_empty());
}

#[test]
fn torn_down_context_stops_listening() {
    let shared = Shared::new();
    let mut left = shared.open();
    let right = shared.open();
    assert_eq!(shared.hub.subscriber_count(), 2);

    right.teardown();
    assert_eq!(shared.hub.subscriber_count(), 1);

    left.create("Alone", "now").unwrap();
    assert!(!left.apply_external_changes());
}

#[test]
fn autosave_runs_on_its_interval() {
    let shared = Shared::new();
    let mut repo = shared.open();
    repo.create("A", "a").unwrap();
    let writes = shared.durable.write_count();

    shared.clock.advance(Duration::from_secs(10));
    assert_eq!(repo.autosave_tick(), AutosaveOutcome::NotDue);

    shared.clock.advance(Duration::from_secs(20));
    assert_eq!(
        repo.autosave_tick(),
        AutosaveOutcome::Saved(Durability::Durable)
    );
    assert_eq!(shared.durable.write_count(), writes + 1);

    assert_eq!(repo.autosave_tick(), AutosaveOutcome::NotDue);
}

#[test]
fn durable_outage_falls_back_and_recovers() {
    let shared = Shared::new();
    let mut repo = shared.open();
    shared.durable.set_simulate_write_error(true);

    let first = repo.create("During outage", "x").unwrap();
    assert_eq!(first.durability, Durability::Ephemeral);

    shared.durable.set_simulate_write_error(false);
    shared.clock.advance(Duration::from_millis(300));
    let second = repo.create("After outage", "y").unwrap();
    assert_eq!(second.durability, Durability::Durable);

    let reopened = shared.open();
    assert_eq!(reopened.len(), 2);
}

#[test]
fn backup_restores_into_a_fresh_repository() {
    let source = Shared::new();
    let mut repo = source.open();
    let note = repo.create("Shopping", "Buy milk").unwrap().value;
    assert_eq!(repo.len(), 1);

    let backup = export::run(&repo, source.clock.as_ref())
        .unwrap()
        .backup
        .unwrap();

    let target = Shared::new();
    let mut fresh = target.open();
    let result = import::run(&mut fresh, &backup.contents).unwrap();

    assert_eq!(result.import_report.unwrap().imported, 1);
    assert_eq!(fresh.len(), 1);
    let restored = &fresh.notes()[0];
    assert_eq!(restored.id, note.id);
    assert_eq!(restored.title, "Shopping");
    assert_eq!(restored.content, "Buy milk");
    assert_eq!(target.open().notes(), fresh.notes());
}
