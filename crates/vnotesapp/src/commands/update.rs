use crate::commands::CmdResult;
use crate::error::Result;
use crate::repository::NoteRepository;

pub fn run(repo: &mut NoteRepository, id: &str, title: &str, content: &str) -> Result<CmdResult> {
    let outcome = repo.update(id, title, content)?;

    let mut result = CmdResult::default().changed();
    result.report_saved(
        format!("Note updated: {}", outcome.value.title),
        &outcome.durability,
    );
    Ok(result.with_affected_notes(vec![outcome.value]))
}
