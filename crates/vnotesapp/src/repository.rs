//! # Note Repository
//!
//! The in-memory, ordered note set (newest first) and the only place it is mutated.
//!
//! ## Mutation Contract
//!
//! Each mutating call runs as one unit:
//!
//! 1. **Rate gate**: at most one mutating call per 300ms (monotonic clock). This catches
//!    accidental double submissions; it is not a lock.
//! 2. **Validation**: bounds, capacity, existence. Failures return a local error and
//!    change nothing.
//! 3. **Mutation** of the in-memory set.
//! 4. **Persistence** of the whole set through the [`PersistenceEngine`].
//!
//! The result is an [`Outcome`] carrying the [`Durability`] of step 4. A mutation whose
//! persistence failed on every tier still stands in memory, but the caller is told so
//! explicitly (`MemoryOnly`); it is never reported as a plain success.
//!
//! ## External Changes
//!
//! Changes written by another context arrive as queued events on the engine's
//! subscription, or are spotted by [`PersistenceEngine::poll_storage`] when the writer
//! is another process. [`NoteRepository::apply_external_changes`] reloads and replaces
//! the set wholesale. Because every method takes `&mut self`, that reload can only
//! happen between mutations, never in the middle of one.
//!
//! A reload that finds storage present but unreadable keeps the in-memory set. The next
//! write would otherwise replace every stored note with an empty list.

use crate::clock::Clock;
use crate::engine::{AutosaveOutcome, Durability, LoadReport, PersistenceEngine};
use crate::error::{Result, VnotesError};
use crate::model::{generate_id, Note, MAX_NOTES};
use crate::validation::validate_input;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(300);

/// How many fresh ids to try before giving up on a collision streak.
const MAX_ID_ATTEMPTS: usize = 8;

/// The result of a mutation together with where it was saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub durability: Durability,
}

/// Minimum-interval check between mutating calls.
#[derive(Debug, Clone)]
pub struct RateGate {
    min_interval: Duration,
    last: Option<Instant>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Pass if enough time has elapsed since the last pass, and record this one.
    /// A rejected call does not move the window.
    pub fn check(&mut self, now: Instant) -> Result<()> {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.min_interval {
                return Err(VnotesError::RateLimited);
            }
        }
        self.last = Some(now);
        Ok(())
    }
}

/// Counts from [`NoteRepository::merge`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    pub imported: usize,
    /// Candidates whose id already exists locally (the local note wins).
    pub duplicates: usize,
    /// Candidates left out because the set was full.
    pub over_capacity: usize,
}

type IdSource = Box<dyn FnMut(DateTime<Utc>) -> String>;

pub struct NoteRepository {
    notes: Vec<Note>,
    engine: PersistenceEngine,
    gate: RateGate,
    clock: Rc<dyn Clock>,
    id_source: IdSource,
}

impl NoteRepository {
    /// Build a repository and load whatever the engine finds in storage.
    pub fn open(engine: PersistenceEngine, clock: Rc<dyn Clock>, rate_limit: Duration) -> Self {
        let LoadReport { notes, .. } = engine.load();
        info!("repository opened with {} notes", notes.len());
        Self {
            notes,
            engine,
            gate: RateGate::new(rate_limit),
            clock,
            id_source: Box::new(generate_id),
        }
    }

    /// Replace the id generator, e.g. to make collisions reproducible.
    pub fn with_id_source(mut self, source: impl FnMut(DateTime<Utc>) -> String + 'static) -> Self {
        self.id_source = Box::new(source);
        self
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn engine(&self) -> &PersistenceEngine {
        &self.engine
    }

    pub fn create(&mut self, title: &str, content: &str) -> Result<Outcome<Note>> {
        self.gate.check(self.clock.monotonic())?;
        let (title, content) = (title.trim(), content.trim());
        validate_input(title, content)?;
        if self.notes.len() >= MAX_NOTES {
            return Err(VnotesError::CapacityExceeded { max: MAX_NOTES });
        }

        let now = self.clock.now();
        let id = self.unique_id(now)?;
        let note = Note::new(id, title.to_string(), content.to_string(), now);
        self.notes.insert(0, note.clone());
        debug!("note created: {}", note.id);

        Ok(self.commit(note))
    }

    pub fn update(&mut self, id: &str, title: &str, content: &str) -> Result<Outcome<Note>> {
        self.gate.check(self.clock.monotonic())?;
        let (title, content) = (title.trim(), content.trim());
        validate_input(title, content)?;
        let position = self.position(id)?;

        let now = self.clock.now();
        let note = &mut self.notes[position];
        note.title = title.to_string();
        note.content = content.to_string();
        note.updated_at = note.updated_at.max(now);
        let note = note.clone();
        debug!("note updated: {}", note.id);

        Ok(self.commit(note))
    }

    /// Remove one note by id, returning it.
    pub fn delete(&mut self, id: &str) -> Result<Outcome<Note>> {
        self.gate.check(self.clock.monotonic())?;
        let position = self.position(id)?;
        let removed = self.notes.remove(position);
        debug!("note deleted, {} remaining", self.notes.len());

        Ok(self.commit(removed))
    }

    /// Remove every note, returning how many were removed.
    pub fn clear(&mut self) -> Result<Outcome<usize>> {
        self.gate.check(self.clock.monotonic())?;
        let removed = self.notes.len();
        self.notes.clear();
        debug!("cleared {} notes", removed);

        Ok(self.commit(removed))
    }

    /// Append candidates whose ids are new. Existing notes always win on id collision.
    /// The merged set is persisted once, as a unit.
    pub fn merge(&mut self, candidates: Vec<Note>) -> Outcome<MergeReport> {
        let mut known: HashSet<String> = self.notes.iter().map(|n| n.id.clone()).collect();
        let mut report = MergeReport::default();

        for candidate in candidates {
            if known.contains(&candidate.id) {
                report.duplicates += 1;
            } else if self.notes.len() >= MAX_NOTES {
                report.over_capacity += 1;
            } else {
                known.insert(candidate.id.clone());
                self.notes.push(candidate);
                report.imported += 1;
            }
        }
        debug!("merge: {:?}", report);

        self.commit(report)
    }

    /// Replace the in-memory set with what storage holds. If storage holds data that
    /// cannot be read, the current set is kept.
    pub fn reload(&mut self) -> LoadReport {
        let report = self.engine.load();
        if report.is_unreadable() {
            warn!(
                "stored notes unreadable on {} tier(s); keeping {} notes in memory",
                report.unreadable,
                self.notes.len()
            );
        } else {
            self.notes = report.notes.clone();
        }
        report
    }

    /// Apply changes made by other contexts or processes. Returns true if the set was
    /// reloaded.
    pub fn apply_external_changes(&mut self) -> bool {
        let events = self.engine.take_external_changes();
        let foreign = self.engine.poll_storage();
        if events.is_empty() && !foreign {
            return false;
        }
        let report = self.reload();
        if report.is_unreadable() {
            return false;
        }
        info!(
            "reloaded {} notes after {} queued change(s){}",
            report.notes.len(),
            events.len(),
            if foreign { " and a newer stored payload" } else { "" }
        );
        true
    }

    pub fn autosave_tick(&self) -> AutosaveOutcome {
        self.engine.autosave_tick(&self.notes)
    }

    /// Persist the current set now, outside any mutation.
    pub fn save(&self) -> Durability {
        self.engine.persist_or_memory(&self.notes)
    }

    /// Final save before the host goes away. Consumes the repository so nothing can
    /// write afterwards. Returns `None` if there was nothing to save.
    pub fn teardown(mut self) -> Option<Durability> {
        self.apply_external_changes();
        let durability = if self.notes.is_empty() {
            None
        } else {
            Some(self.save())
        };
        self.engine.shutdown();
        durability
    }

    fn commit<T>(&self, value: T) -> Outcome<T> {
        Outcome {
            value,
            durability: self.engine.persist_or_memory(&self.notes),
        }
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| VnotesError::NotFound(id.to_string()))
    }

    fn unique_id(&mut self, now: DateTime<Utc>) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = (self.id_source)(now);
            if !id.is_empty() && self.get(&id).is_none() {
                return Ok(id);
            }
            debug!("id collision on {}, regenerating", id);
        }
        Err(VnotesError::IdCollision {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}
