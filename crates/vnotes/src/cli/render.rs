//! # Rendering
//!
//! [`TerminalView`] is the terminal implementation of [`NoteView`]. Formatting lives in
//! plain functions returning `String` so it can be tested without a terminal.
//!
//! ## List Layout
//!
//! ```text
//!  1. Shopping                                    1702634400123abcdef012  Updated 5 minutes ago
//!     Buy milk and eggs
//! ```
//!
//! Titles and the content preview are truncated by display width (`unicode-width`), so
//! wide characters do not break the columns. Times are relative (`timeago`), using
//! `updatedAt`, labelled "Created" until the note is first edited.

use super::styles;
use chrono::{DateTime, Utc};
use console::Term;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use vnotesapp::commands::MessageLevel;
use vnotesapp::model::Note;
use vnotesapp::view::NoteView;

pub const LINE_WIDTH: usize = 100;
pub const COL_INDEX: usize = 4;
pub const COL_TITLE: usize = 40;
pub const PREVIEW_WIDTH: usize = LINE_WIDTH - COL_INDEX;
pub const ELLIPSIS: &str = "…";

pub struct TerminalView {
    assume_yes: bool,
    out: Term,
    err: Term,
}

impl TerminalView {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            out: Term::stdout(),
            err: Term::stderr(),
        }
    }
}

impl NoteView for TerminalView {
    fn notify(&self, message: &str, level: MessageLevel) {
        let line = format_message(message, level);
        let term = match level {
            MessageLevel::Warning | MessageLevel::Error => &self.err,
            MessageLevel::Info | MessageLevel::Success => &self.out,
        };
        let _ = term.write_line(&line);
    }

    fn render_list(&self, notes: &[Note]) {
        let _ = self.out.write_str(&format_list(notes, Utc::now()));
    }

    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !self.err.is_term() {
            return false;
        }
        if self.err.write_str(&format!("{} [y/N] ", question)).is_err() {
            return false;
        }
        matches!(
            self.err.read_line().map(|answer| answer.trim().to_lowercase()),
            Ok(answer) if answer == "y" || answer == "yes"
        )
    }
}

pub fn format_message(message: &str, level: MessageLevel) -> String {
    let prefix = match level {
        MessageLevel::Error => "Error: ",
        MessageLevel::Warning => "Warning: ",
        MessageLevel::Info | MessageLevel::Success => "",
    };
    styles::for_level(level)
        .apply_to(format!("{}{}", prefix, message))
        .to_string()
}

pub fn format_list(notes: &[Note], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for (i, note) in notes.iter().enumerate() {
        let index = format!("{:>2}.", i + 1);
        let title = pad_to_width(&truncate_to_width(&note.title, COL_TITLE), COL_TITLE);
        out.push_str(&format!(
            "{:<width$}{} {}  {}\n",
            index,
            styles::title().apply_to(title),
            styles::id().apply_to(&note.id),
            styles::time().apply_to(format!(
                "{} {}",
                if note.is_edited() { "Updated" } else { "Created" },
                format_time_ago(note.updated_at, now)
            )),
            width = COL_INDEX,
        ));
        out.push_str(&format!(
            "{}{}\n",
            " ".repeat(COL_INDEX),
            styles::muted().apply_to(preview(&note.content))
        ));
    }
    out
}

/// First line of the content, fitted to the preview column.
fn preview(content: &str) -> String {
    let first = content.lines().next().unwrap_or_default();
    let mut line = truncate_to_width(first, PREVIEW_WIDTH);
    if content.lines().nth(1).is_some() && !line.ends_with(ELLIPSIS) {
        line.push_str(ELLIPSIS);
    }
    line
}

pub fn format_time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at).to_std().unwrap_or_default();
    timeago::Formatter::new().convert(elapsed)
}

/// Cut `text` to at most `max` display columns, marking the cut with an ellipsis.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(ELLIPSIS.width());
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ELLIPSIS);
    out
}

fn pad_to_width(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn note(id: &str, title: &str, content: &str, at: DateTime<Utc>) -> Note {
        Note::new(id.into(), title.into(), content.into(), at)
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Shopping", 10), "Shopping");
    }

    #[test]
    fn long_text_is_cut_with_an_ellipsis() {
        let cut = truncate_to_width("abcdefghij", 5);
        assert_eq!(cut, "abcd…");
        assert_eq!(cut.width(), 5);
    }

    #[test]
    fn wide_characters_count_double() {
        let cut = truncate_to_width("日本語のメモ", 7);
        assert!(cut.width() <= 7);
        assert_eq!(cut, "日本語…");
    }

    #[test]
    fn relative_times() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_time_ago(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_time_ago(now - Duration::hours(3), now), "3 hours ago");
    }

    #[test]
    fn list_shows_every_note_in_order() {
        console::set_colors_enabled(false);
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let notes = vec![
            note("b", "Second", "newer", now),
            note("a", "First", "line one\nline two", now - Duration::days(2)),
        ];

        let out = format_list(&notes, now);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(" 1. Second"));
        assert!(lines[0].contains(" b  "));
        assert!(lines[2].starts_with(" 2. First"));
        assert!(lines[2].ends_with("Created 2 days ago"));
        assert_eq!(lines[3], "    line one…");
    }

    #[test]
    fn edited_notes_say_updated() {
        console::set_colors_enabled(false);
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let mut edited = note("a", "Groceries", "eggs", now - Duration::days(1));
        edited.updated_at = now - Duration::hours(3);

        let out = format_list(&[edited], now);

        assert!(out.lines().next().unwrap().ends_with("Updated 3 hours ago"));
    }

    #[test]
    fn messages_carry_their_level() {
        console::set_colors_enabled(false);
        assert_eq!(
            format_message("Title is required", MessageLevel::Error),
            "Error: Title is required"
        );
        assert_eq!(format_message("Note created: A", MessageLevel::Success), "Note created: A");
    }
}
