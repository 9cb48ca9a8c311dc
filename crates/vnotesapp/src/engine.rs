//! # Persistence Engine
//!
//! The engine turns the in-memory note set into durable state. It owns the storage
//! tiers, the autosave schedule and the cross-context subscription.
//!
//! ## Writes
//!
//! Every write persists the **whole** set as one [`Envelope`] under the storage key.
//! [`TieredStore::write_verified`] reads each write back and compares it byte-for-byte;
//! a failed or mismatched durable write falls back to the ephemeral tier. The result is
//! reported as a [`Durability`]:
//!
//! | Durability   | Meaning                                                  |
//! |--------------|----------------------------------------------------------|
//! | `Durable`    | Saved and verified on the durable tier                   |
//! | `Ephemeral`  | Saved on the session tier only; lost when it ends        |
//! | `MemoryOnly` | No tier accepted the write; only the in-memory copy holds |
//!
//! ## Loads
//!
//! Every tier is read. Each payload is decoded (envelope or legacy array), its records
//! validated, and the payload with the newest `lastModified` wins. Legacy arrays carry
//! no timestamp and rank oldest. Invalid records are dropped, not repaired.
//!
//! A tier that failed to read, or whose payload does not decode, is counted in
//! [`LoadReport::unreadable`]. When storage held something but none of it could be
//! read, [`LoadReport::is_unreadable`] is true and callers must keep what they have.
//!
//! ## Stamps
//!
//! `lastModified` is strictly increasing per engine: each write is stamped
//! `max(now, last seen + 1ms)`, where "last seen" covers our own writes and every
//! stamp found in storage. A stepped-back wall clock or two writes in one millisecond
//! therefore cannot make an older payload win a later load.
//!
//! ## Autosave
//!
//! The host calls [`PersistenceEngine::autosave_tick`] from its event loop. The engine
//! decides whether the interval (30s by default) has elapsed on the monotonic clock,
//! skips the tick if a write is already in flight, and re-persists non-empty state.
//!
//! ## Cross-Context Sync
//!
//! With [`PersistenceEngine::with_change_hub`] the engine subscribes to its storage key
//! and publishes after every successful write. Queued events are drained by the
//! repository, which reloads and replaces its set wholesale.
//!
//! Writers outside this process never publish to our hub. [`PersistenceEngine::poll_storage`]
//! covers them: it compares the newest stored stamp with the last one seen and reports
//! a change when storage has moved on.

use crate::clock::Clock;
use crate::error::{Result, VnotesError};
use crate::model::{decode_payload, Envelope, Note, MAX_NOTES};
use crate::store::{Tier, TieredStore};
use crate::sync::{ChangeEvent, ChangeHub, Subscription};
use crate::validation::partition_records;
use chrono::{DateTime, Duration as StampStep, Utc};
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_STORAGE_KEY: &str = "vnotes-data";
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub storage_key: String,
    pub autosave_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
        }
    }
}

/// Where a write ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Durability {
    Durable,
    Ephemeral,
    MemoryOnly { reason: String },
}

impl Durability {
    pub fn from_tier(tier: Tier) -> Self {
        match tier {
            Tier::Durable => Durability::Durable,
            Tier::Ephemeral => Durability::Ephemeral,
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, Durability::Durable)
    }

    /// Saved on some tier, durable or not.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, Durability::MemoryOnly { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveOutcome {
    NotDue,
    Cancelled,
    SkippedInFlight,
    NothingToSave,
    Saved(Durability),
}

/// What [`PersistenceEngine::load`] found.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadReport {
    pub notes: Vec<Note>,
    /// Tier the winning payload came from; `None` if storage was empty.
    pub source: Option<Tier>,
    /// Records dropped as invalid, duplicate or over capacity.
    pub dropped: usize,
    /// Tiers that held a payload we could not read or decode.
    pub unreadable: usize,
}

impl LoadReport {
    /// Storage held data but none of it was readable. Not the same as empty storage.
    pub fn is_unreadable(&self) -> bool {
        self.source.is_none() && self.unreadable > 0
    }
}

struct Autosave {
    interval: Duration,
    next_due: Cell<Option<Instant>>,
}

impl Autosave {
    fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: Cell::new(Some(now + interval)),
        }
    }

    fn cancel(&self) {
        self.next_due.set(None);
    }
}

/// Marks a write as in flight until dropped.
pub(crate) struct WriteGuard<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

pub struct PersistenceEngine {
    store: TieredStore,
    key: String,
    clock: Rc<dyn Clock>,
    autosave: Autosave,
    write_in_flight: Cell<bool>,
    /// Newest `lastModified` written or seen in storage. Legacy arrays count as `MIN_UTC`.
    last_stamp: Cell<Option<DateTime<Utc>>>,
    hub: Option<ChangeHub>,
    subscription: Option<Subscription>,
    shut_down: bool,
}

impl PersistenceEngine {
    pub fn new(store: TieredStore, settings: EngineSettings, clock: Rc<dyn Clock>) -> Self {
        let autosave = Autosave::new(settings.autosave_interval, clock.monotonic());
        Self {
            store,
            key: settings.storage_key,
            clock,
            autosave,
            write_in_flight: Cell::new(false),
            last_stamp: Cell::new(None),
            hub: None,
            subscription: None,
            shut_down: false,
        }
    }

    /// Register for change notifications on our storage key.
    pub fn with_change_hub(mut self, hub: &ChangeHub) -> Self {
        self.subscription = Some(hub.subscribe(&self.key));
        self.hub = Some(hub.clone());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &TieredStore {
        &self.store
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn write_in_flight(&self) -> bool {
        self.write_in_flight.get()
    }

    pub(crate) fn begin_write(&self) -> Option<WriteGuard<'_>> {
        if self.write_in_flight.replace(true) {
            return None;
        }
        Some(WriteGuard {
            flag: &self.write_in_flight,
        })
    }

    pub fn snapshot(&self, notes: &[Note]) -> Envelope {
        Envelope::new(notes.to_vec(), self.next_stamp())
    }

    /// The stamp the next write will carry.
    fn next_stamp(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        match self.last_stamp.get() {
            Some(last) => now.max(last + StampStep::milliseconds(1)),
            None => now,
        }
    }

    fn observe_stamp(&self, stamp: DateTime<Utc>) {
        if self.last_stamp.get().map_or(true, |last| stamp > last) {
            self.last_stamp.set(Some(stamp));
        }
    }

    /// Serialize and write the set, verified, on the best tier that works.
    pub fn persist(&self, notes: &[Note]) -> Result<Tier> {
        if self.shut_down {
            return Err(VnotesError::storage_unavailable("persistence engine shut down"));
        }
        let _guard = self
            .begin_write()
            .ok_or_else(|| VnotesError::storage_unavailable("another write is in progress"))?;

        let envelope = self.snapshot(notes);
        let payload = serde_json::to_string(&envelope)?;
        let tier = self.store.write_verified(&self.key, &payload)?;
        self.observe_stamp(envelope.last_modified);
        debug!("persisted {} notes to {} tier", notes.len(), tier);

        if let Some(hub) = &self.hub {
            hub.publish(&self.key, self.subscription.as_ref().map(Subscription::id));
        }
        Ok(tier)
    }

    /// Like [`Self::persist`], but folds total failure into [`Durability::MemoryOnly`].
    pub fn persist_or_memory(&self, notes: &[Note]) -> Durability {
        match self.persist(notes) {
            Ok(tier) => Durability::from_tier(tier),
            Err(err) => {
                warn!("notes kept in memory only: {}", err);
                Durability::MemoryOnly {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Read the newest valid note set from storage.
    pub fn load(&self) -> LoadReport {
        let mut best: Option<(DateTime<Utc>, Tier, Vec<serde_json::Value>)> = None;
        let mut unreadable = 0;

        for (tier, raw) in self.store.read_all(&self.key) {
            let payload = match raw.and_then(|raw| decode_payload(&raw)) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!("ignoring unreadable {} payload: {}", tier, err);
                    unreadable += 1;
                    continue;
                }
            };
            let stamp = payload.last_modified.unwrap_or(DateTime::<Utc>::MIN_UTC);
            let newer = match &best {
                None => true,
                Some((best_stamp, _, _)) => stamp > *best_stamp,
            };
            if newer {
                best = Some((stamp, tier, payload.records));
            }
        }

        let Some((stamp, tier, records)) = best else {
            if unreadable > 0 {
                warn!("stored notes exist but none could be read");
            } else {
                debug!("no stored notes found, starting fresh");
            }
            return LoadReport {
                unreadable,
                ..LoadReport::default()
            };
        };
        self.observe_stamp(stamp);

        let (valid, invalid) = partition_records(&records);
        let (notes, duplicates, over_capacity) = dedupe_and_cap(valid);
        let dropped = invalid + duplicates + over_capacity;
        if dropped > 0 {
            warn!(
                "dropped {} stored records ({} invalid, {} duplicate ids, {} over capacity)",
                dropped, invalid, duplicates, over_capacity
            );
        }
        debug!("loaded {} notes from {} tier", notes.len(), tier);

        LoadReport {
            notes,
            source: Some(tier),
            dropped,
            unreadable,
        }
    }

    /// True if storage holds a payload newer than anything this engine has written or
    /// loaded, i.e. another writer (possibly another process) got there since.
    /// Unreadable payloads are ignored here; [`Self::load`] deals with them.
    pub fn poll_storage(&self) -> bool {
        let newest = self
            .store
            .read_all(&self.key)
            .into_iter()
            .filter_map(|(_, raw)| raw.and_then(|raw| decode_payload(&raw)).ok())
            .map(|payload| payload.last_modified.unwrap_or(DateTime::<Utc>::MIN_UTC))
            .max();
        match (newest, self.last_stamp.get()) {
            (Some(stored), Some(seen)) => stored > seen,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn has_external_changes(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(Subscription::has_pending)
    }

    pub fn take_external_changes(&self) -> Vec<ChangeEvent> {
        self.subscription
            .as_ref()
            .map(Subscription::drain)
            .unwrap_or_default()
    }

    /// One cooperative autosave tick. Call it as often as convenient.
    pub fn autosave_tick(&self, notes: &[Note]) -> AutosaveOutcome {
        let now = self.clock.monotonic();
        match self.autosave.next_due.get() {
            None => return AutosaveOutcome::Cancelled,
            Some(due) if now < due => return AutosaveOutcome::NotDue,
            Some(_) => {}
        }
        self.autosave.next_due.set(Some(now + self.autosave.interval));

        if self.write_in_flight() {
            debug!("autosave skipped: write in flight");
            return AutosaveOutcome::SkippedInFlight;
        }
        if notes.is_empty() {
            return AutosaveOutcome::NothingToSave;
        }
        AutosaveOutcome::Saved(self.persist_or_memory(notes))
    }

    /// Cancel autosave and deregister from the change hub. Later writes are refused.
    pub fn shutdown(&mut self) {
        self.autosave.cancel();
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.hub = None;
        self.shut_down = true;
    }
}

/// Keep the first note per id and at most [`MAX_NOTES`] notes.
fn dedupe_and_cap(notes: Vec<Note>) -> (Vec<Note>, usize, usize) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(notes.len().min(MAX_NOTES));
    let mut duplicates = 0;
    let mut over_capacity = 0;
    for note in notes {
        if !seen.insert(note.id.clone()) {
            duplicates += 1;
        } else if kept.len() >= MAX_NOTES {
            over_capacity += 1;
        } else {
            kept.push(note);
        }
    }
    (kept, duplicates, over_capacity)
}
