//! Two independently initialized contexts on one data directory, the way two `vnotes`
//! processes share `vnotes-data.json`. They share no change hub, only the file.

use std::path::Path;
use tempfile::TempDir;
use vnotesapp::config::VnotesConfig;
use vnotesapp::init::{initialize, VnotesContext};

fn open(dir: &Path) -> VnotesContext {
    let config = VnotesConfig {
        rate_limit_ms: 0,
        ..Default::default()
    };
    initialize(config, Some(dir.to_path_buf())).unwrap()
}

fn titles(ctx: &VnotesContext) -> Vec<String> {
    ctx.repo.notes().iter().map(|n| n.title.clone()).collect()
}

#[test]
fn teardown_keeps_notes_written_by_another_process() {
    let dir = TempDir::new().unwrap();
    let mut first = open(dir.path());
    first.repo.create("First", "one").unwrap();

    let mut second = open(dir.path());
    second.repo.create("Second", "two").unwrap();
    second.repo.teardown();

    first.repo.teardown();

    assert_eq!(titles(&open(dir.path())), vec!["Second", "First"]);
}

#[test]
fn mutation_after_a_foreign_write_builds_on_it() {
    let dir = TempDir::new().unwrap();
    let mut first = open(dir.path());
    let mut second = open(dir.path());

    second.repo.create("From the other process", "hi").unwrap();
    assert!(first.repo.apply_external_changes());
    assert!(!first.repo.apply_external_changes());
    first.repo.create("Local", "mine").unwrap();

    assert_eq!(
        titles(&open(dir.path())),
        vec!["Local", "From the other process"]
    );
}

#[test]
fn garbled_file_does_not_wipe_notes_in_memory() {
    let dir = TempDir::new().unwrap();
    let mut ctx = open(dir.path());
    ctx.repo.create("Precious", "do not lose").unwrap();

    std::fs::write(dir.path().join("vnotes-data.json"), "{truncated").unwrap();
    let report = ctx.repo.reload();

    assert!(report.is_unreadable());
    assert_eq!(titles(&ctx), vec!["Precious"]);
}
