use crate::commands::{CmdMessage, CmdResult};
use crate::engine::{AutosaveOutcome, Durability};
use crate::repository::NoteRepository;

/// Reload if another context has written since the last check.
pub fn apply_external(repo: &mut NoteRepository) -> CmdResult {
    if !repo.apply_external_changes() {
        return CmdResult::default();
    }
    let mut result = CmdResult::default()
        .changed()
        .with_affected_notes(repo.notes().to_vec());
    result.add_message(CmdMessage::info("Notes updated from another window"));
    result
}

/// One host tick: pick up external changes, then give autosave a chance to run.
pub fn poll(repo: &mut NoteRepository) -> CmdResult {
    let mut result = apply_external(repo);
    match repo.autosave_tick() {
        AutosaveOutcome::Saved(Durability::Durable) => {}
        AutosaveOutcome::Saved(Durability::Ephemeral) => result.add_message(CmdMessage::warning(
            "Autosave used session storage only; changes are not durably saved",
        )),
        AutosaveOutcome::Saved(Durability::MemoryOnly { reason }) => result.add_message(
            CmdMessage::warning(format!("Autosave failed: {}", reason)),
        ),
        _ => {}
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, MessageLevel};
    use crate::test_utils::TestEnv;
    use std::time::Duration;

    #[test]
    fn picks_up_writes_from_another_context() {
        let mut env = TestEnv::new();
        let mut other = env.open_context();
        create::run(&mut other, "From the other tab", "hello").unwrap();

        let result = apply_external(&mut env.repo);

        assert!(result.list_changed);
        assert_eq!(env.repo.len(), 1);
        assert_eq!(env.repo.notes()[0].title, "From the other tab");
        assert_eq!(result.messages[0].level, MessageLevel::Info);
    }

    #[test]
    fn quiet_when_nothing_changed() {
        let mut env = TestEnv::new();
        let result = poll(&mut env.repo);
        assert!(!result.list_changed);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn autosave_failure_is_surfaced() {
        let mut env = TestEnv::new();
        create::run(&mut env.repo, "A", "a").unwrap();
        env.durable.set_simulate_write_error(true);
        env.ephemeral.set_simulate_write_error(true);
        env.clock.advance(Duration::from_secs(31));

        let result = poll(&mut env.repo);

        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
    }
}
