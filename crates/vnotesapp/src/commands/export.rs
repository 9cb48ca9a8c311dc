//! Backups.
//!
//! An export is the current set wrapped as `{notes, exportDate, version}` and
//! pretty-printed. The command is pure: it returns the bytes and a suggested filename,
//! and the client decides where to write them.

use crate::clock::Clock;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::ExportEnvelope;
use crate::repository::NoteRepository;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub filename: String,
    pub contents: String,
}

/// `notes_backup_<YYYY-MM-DD>.json`
pub fn backup_filename(at: DateTime<Utc>) -> String {
    format!("notes_backup_{}.json", at.format("%Y-%m-%d"))
}

pub fn run(repo: &NoteRepository, clock: &dyn Clock) -> Result<CmdResult> {
    let now = clock.now();
    let envelope = ExportEnvelope::new(repo.notes(), now);
    let contents = serde_json::to_string_pretty(&envelope)?;

    let mut result = CmdResult::default();
    if repo.is_empty() {
        result.add_message(CmdMessage::info("No notes to export; the backup is empty"));
    }
    result.backup = Some(Backup {
        filename: backup_filename(now),
        contents,
    });
    Ok(result)
}
