//! # Command Layer
//!
//! This module contains the **core business logic** of vnotes. Each command lives in its
//! own submodule and implements plain Rust functions over the [`NoteRepository`].
//!
//! ## Role and Responsibilities
//!
//! Commands are where the real work happens:
//! - Call into the repository and turn its typed outcomes into user-facing messages
//! - Map [`Durability`] to a success or a "not durably saved" warning
//! - Build export payloads and interpret import payloads
//! - Are completely UI-agnostic
//!
//! ## What Commands Do NOT Do
//!
//! - **Any I/O**: no stdout, stderr, or files. Export returns the bytes and a filename.
//! - **Argument parsing**: that's the client's job
//! - **User interaction**: no prompts. The facade asks [`crate::view::NoteView::confirm`]
//!   before destructive commands run.
//!
//! ## Structured Returns
//!
//! Commands return [`CmdResult`], not strings:
//! - `affected_notes`: notes created, updated or removed by the command
//! - `messages`: structured messages with levels (info, success, warning, error)
//! - `list_changed`: whether the visible list should be re-rendered
//! - `backup`: the export payload (for `export`)
//! - `import_report`: the counts (for `import`)
//!
//! ## Command Modules
//!
//! - [`create`]: Create a note
//! - [`update`]: Edit title and content of a note
//! - [`delete`]: Delete one note, or clear them all
//! - [`export`]: Serialize the set into a backup
//! - [`import`]: Merge a backup into the set
//! - [`sync`]: Cross-context reloads and the autosave tick

use crate::engine::Durability;
use crate::model::Note;
use crate::repository::NoteRepository;
use serde::Serialize;

pub mod create;
pub mod delete;
pub mod export;
pub mod import;
pub mod sync;
pub mod update;

pub use export::Backup;
pub use import::ImportReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_notes: Vec<Note>,
    pub messages: Vec<CmdMessage>,
    pub list_changed: bool,
    pub backup: Option<Backup>,
    pub import_report: Option<ImportReport>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_notes(mut self, notes: Vec<Note>) -> Self {
        self.affected_notes = notes;
        self
    }

    pub fn changed(mut self) -> Self {
        self.list_changed = true;
        self
    }

    /// Report a mutation: `done` on success, with a warning when it did not reach
    /// durable storage.
    pub fn report_saved(&mut self, done: impl Into<String>, durability: &Durability) {
        match durability {
            Durability::Durable => self.add_message(CmdMessage::success(done)),
            Durability::Ephemeral => {
                self.add_message(CmdMessage::success(done));
                self.add_message(CmdMessage::warning(
                    "Saved to session storage only; changes are not durably saved",
                ));
            }
            Durability::MemoryOnly { reason } => self.add_message(CmdMessage::warning(format!(
                "{} in memory only; changes could not be saved ({})",
                done.into(),
                reason
            ))),
        }
    }
}

/// List every note, newest first.
pub fn list(repo: &NoteRepository) -> CmdResult {
    let mut result = CmdResult::default().with_affected_notes(repo.notes().to_vec());
    if repo.is_empty() {
        result.add_message(CmdMessage::info("No notes yet"));
    }
    result
}
