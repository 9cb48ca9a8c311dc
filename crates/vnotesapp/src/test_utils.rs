use crate::clock::ManualClock;
use crate::commands::MessageLevel;
use crate::engine::{EngineSettings, PersistenceEngine};
use crate::model::Note;
use crate::repository::{NoteRepository, DEFAULT_RATE_LIMIT};
use crate::store::{MemBackend, TieredStore};
use crate::sync::ChangeHub;
use crate::view::NoteView;
use chrono::{TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// A repository on in-memory tiers with a hand-driven clock.
pub struct TestEnv {
    pub clock: Rc<ManualClock>,
    pub durable: Rc<MemBackend>,
    pub ephemeral: Rc<MemBackend>,
    pub hub: ChangeHub,
    pub repo: NoteRepository,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        ));
        let durable = Rc::new(MemBackend::new());
        let ephemeral = Rc::new(MemBackend::new());
        let hub = ChangeHub::new();
        let repo = open(&clock, &durable, &ephemeral, &hub);
        Self {
            clock,
            durable,
            ephemeral,
            hub,
            repo,
        }
    }

    /// Another context on the same storage and change hub, like a second tab.
    pub fn open_context(&self) -> NoteRepository {
        open(&self.clock, &self.durable, &self.ephemeral, &self.hub)
    }

    /// Step past the rate gate.
    pub fn tick(&self) {
        self.clock.advance(Duration::from_millis(300));
    }
}

fn open(
    clock: &Rc<ManualClock>,
    durable: &Rc<MemBackend>,
    ephemeral: &Rc<MemBackend>,
    hub: &ChangeHub,
) -> NoteRepository {
    let store = TieredStore::select(
        Some(Box::new(Rc::clone(durable))),
        Some(Box::new(Rc::clone(ephemeral))),
    );
    let engine =
        PersistenceEngine::new(store, EngineSettings::default(), clock.clone()).with_change_hub(hub);
    NoteRepository::open(engine, clock.clone(), DEFAULT_RATE_LIMIT)
}

/// A view that records every call and answers `confirm` with a fixed reply.
#[derive(Default)]
pub struct RecordingView {
    pub notifications: RefCell<Vec<(String, MessageLevel)>>,
    pub renders: RefCell<Vec<Vec<Note>>>,
    pub questions: RefCell<Vec<String>>,
    pub answer: Cell<bool>,
}

impl RecordingView {
    pub fn answering(answer: bool) -> Self {
        let view = Self::default();
        view.answer.set(answer);
        view
    }

    pub fn levels(&self) -> Vec<MessageLevel> {
        self.notifications.borrow().iter().map(|(_, l)| *l).collect()
    }

    pub fn last_render(&self) -> Option<Vec<Note>> {
        self.renders.borrow().last().cloned()
    }
}

impl NoteView for RecordingView {
    fn notify(&self, message: &str, level: MessageLevel) {
        self.notifications
            .borrow_mut()
            .push((message.to_string(), level));
    }

    fn render_list(&self, notes: &[Note]) {
        self.renders.borrow_mut().push(notes.to_vec());
    }

    fn confirm(&self, question: &str) -> bool {
        self.questions.borrow_mut().push(question.to_string());
        self.answer.get()
    }
}
