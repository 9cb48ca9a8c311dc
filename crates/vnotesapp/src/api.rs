//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It serves as the single
//! entry point for all vnotes operations, regardless of the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Syncs first**: changes from other contexts are applied before each operation,
//!   and again after a confirmation prompt, so a reload never lands in the middle of a
//!   mutation and a slow answer cannot overwrite someone else's write
//! - **Dispatches** to the appropriate command function
//! - **Drives the view**: forwards command messages to [`NoteView::notify`], calls
//!   [`NoteView::render_list`] after anything that changed the list, and asks
//!   [`NoteView::confirm`] before delete and clear
//! - **Reports errors** as error notifications while still returning them
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Formatting**: the view decides how notes and messages look
//!
//! ## Generic Over NoteView
//!
//! `NotesApi<V: NoteView>` is generic over its presentation:
//! - Production: `NotesApi<TerminalView>` in the `vnotes` binary
//! - Testing: `NotesApi<RecordingView>`, which records every call

use crate::clock::Clock;
use crate::commands::{self, CmdMessage, CmdResult, MessageLevel};
use crate::engine::Durability;
use crate::error::{Result, VnotesError};
use crate::repository::NoteRepository;
use crate::view::NoteView;
use std::rc::Rc;
use tracing::{debug, warn};

/// The main API facade for vnotes operations.
pub struct NotesApi<V: NoteView> {
    repo: NoteRepository,
    view: V,
    clock: Rc<dyn Clock>,
}

impl<V: NoteView> NotesApi<V> {
    pub fn new(repo: NoteRepository, view: V, clock: Rc<dyn Clock>) -> Self {
        Self { repo, view, clock }
    }

    pub fn repository(&self) -> &NoteRepository {
        &self.repo
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Render the current list.
    pub fn list(&mut self) -> CmdResult {
        self.sync();
        let result = commands::list(&self.repo);
        self.view.render_list(self.repo.notes());
        self.forward(&result.messages);
        result
    }

    pub fn create(&mut self, title: &str, content: &str) -> Result<CmdResult> {
        self.sync();
        let result = commands::create::run(&mut self.repo, title, content);
        self.finish(result)
    }

    pub fn update(&mut self, id: &str, title: &str, content: &str) -> Result<CmdResult> {
        self.sync();
        let result = commands::update::run(&mut self.repo, id, title, content);
        self.finish(result)
    }

    pub fn delete(&mut self, id: &str) -> Result<CmdResult> {
        self.sync();
        let Some(note) = self.repo.get(id) else {
            return self.finish(Err(VnotesError::NotFound(id.to_string())));
        };
        let question = format!("Delete \"{}\"?", note.title);
        if !self.view.confirm(&question) {
            return Ok(self.cancelled());
        }
        self.sync();
        let result = commands::delete::run(&mut self.repo, id);
        self.finish(result)
    }

    pub fn clear(&mut self) -> Result<CmdResult> {
        self.sync();
        if !self.repo.is_empty()
            && !self
                .view
                .confirm(&format!("Delete all {} notes?", self.repo.len()))
        {
            return Ok(self.cancelled());
        }
        self.sync();
        let result = commands::delete::clear(&mut self.repo);
        self.finish(result)
    }

    pub fn export(&mut self) -> Result<CmdResult> {
        self.sync();
        let result = commands::export::run(&self.repo, self.clock.as_ref());
        self.finish(result)
    }

    pub fn import(&mut self, raw: &str) -> Result<CmdResult> {
        self.sync();
        let result = commands::import::run(&mut self.repo, raw);
        self.finish(result)
    }

    /// The host's periodic tick: external changes, then autosave.
    pub fn poll(&mut self) -> CmdResult {
        let result = commands::sync::poll(&mut self.repo);
        self.present(&result);
        result
    }

    /// Final save before the host goes away.
    pub fn teardown(self) -> Option<Durability> {
        let durability = self.repo.teardown();
        if let Some(Durability::MemoryOnly { reason }) = &durability {
            self.view.notify(
                &format!("Notes could not be saved before exit: {}", reason),
                MessageLevel::Error,
            );
        }
        durability
    }

    fn sync(&mut self) {
        let result = commands::sync::apply_external(&mut self.repo);
        self.present(&result);
    }

    fn finish(&self, result: Result<CmdResult>) -> Result<CmdResult> {
        match result {
            Ok(result) => {
                self.present(&result);
                Ok(result)
            }
            Err(err) => {
                if err.is_local() {
                    debug!("operation rejected: {}", err);
                } else {
                    warn!("operation failed: {}", err);
                }
                self.view.notify(&err.to_string(), MessageLevel::Error);
                Err(err)
            }
        }
    }

    fn present(&self, result: &CmdResult) {
        self.forward(&result.messages);
        if result.list_changed {
            self.view.render_list(self.repo.notes());
        }
    }

    fn forward(&self, messages: &[CmdMessage]) {
        for message in messages {
            self.view.notify(&message.content, message.level);
        }
    }

    fn cancelled(&self) -> CmdResult {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info("Cancelled"));
        self.forward(&result.messages);
        result
    }
}
