//! The presentation seam.
//!
//! The library never prints. Whatever hosts it (the terminal client, a test) implements
//! [`NoteView`] and the [`crate::api::NotesApi`] facade calls it at the right moments.

use crate::commands::MessageLevel;
use crate::model::Note;

pub trait NoteView {
    /// Fire-and-forget user notification.
    fn notify(&self, message: &str, level: MessageLevel);

    /// Called after every successful mutation or reload with the full, ordered set.
    fn render_list(&self, notes: &[Note]);

    /// Synchronous yes/no gate asked before destructive operations.
    fn confirm(&self, question: &str) -> bool;
}
