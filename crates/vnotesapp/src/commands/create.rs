use crate::commands::CmdResult;
use crate::error::Result;
use crate::repository::NoteRepository;

pub fn run(repo: &mut NoteRepository, title: &str, content: &str) -> Result<CmdResult> {
    let outcome = repo.create(title, content)?;

    let mut result = CmdResult::default().changed();
    result.report_saved(
        format!("Note created: {}", outcome.value.title),
        &outcome.durability,
    );
    Ok(result.with_affected_notes(vec![outcome.value]))
}
