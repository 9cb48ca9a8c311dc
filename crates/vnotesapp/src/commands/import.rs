//! Restoring backups.
//!
//! The payload is decoded first; a payload that is neither an envelope nor a bare array
//! aborts the whole import before anything is touched. Each record is then validated on
//! its own and the survivors are merged by id, local notes winning. The merged set is
//! persisted once.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::decode_payload;
use crate::repository::NoteRepository;
use crate::validation::partition_records;
use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    /// Records that failed validation.
    pub skipped: usize,
    /// Valid records whose id already exists locally.
    pub duplicates: usize,
    /// Valid, new records left out because the set was full.
    pub over_capacity: usize,
}

pub fn run(repo: &mut NoteRepository, raw: &str) -> Result<CmdResult> {
    let payload = decode_payload(raw)?;
    let (valid, skipped) = partition_records(&payload.records);
    let outcome = repo.merge(valid);

    let report = ImportReport {
        imported: outcome.value.imported,
        skipped,
        duplicates: outcome.value.duplicates,
        over_capacity: outcome.value.over_capacity,
    };

    let mut result = CmdResult::default();
    result.list_changed = report.imported > 0;
    result.report_saved(
        format!("Imported {} notes", report.imported),
        &outcome.durability,
    );
    if report.skipped > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Skipped {} invalid notes",
            report.skipped
        )));
    }
    if report.duplicates > 0 {
        result.add_message(CmdMessage::info(format!(
            "{} notes already existed and were kept as they are",
            report.duplicates
        )));
    }
    if report.over_capacity > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} notes not imported: maximum {} notes allowed",
            report.over_capacity,
            crate::model::MAX_NOTES
        )));
    }
    result.import_report = Some(report);
    Ok(result)
}
