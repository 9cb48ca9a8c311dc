use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::NoteRepository;

pub fn run(repo: &mut NoteRepository, id: &str) -> Result<CmdResult> {
    let outcome = repo.delete(id)?;

    let mut result = CmdResult::default().changed();
    result.report_saved(
        format!("Note deleted: {}", outcome.value.title),
        &outcome.durability,
    );
    Ok(result.with_affected_notes(vec![outcome.value]))
}

/// Remove every note.
pub fn clear(repo: &mut NoteRepository) -> Result<CmdResult> {
    if repo.is_empty() {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info("No notes to clear"));
        return Ok(result);
    }

    let removed = repo.notes().to_vec();
    let outcome = repo.clear()?;

    let mut result = CmdResult::default().changed();
    result.report_saved(
        format!("Cleared {} notes", outcome.value),
        &outcome.durability,
    );
    Ok(result.with_affected_notes(removed))
}
