//! Styles for the vnotes CLI.
//!
//! Code asks for a style by what the text *is* (a title, a timestamp, a warning), never
//! by color. Changing the look means changing this file only.
//!
//! `console` drops the ANSI codes on its own when the output is not a terminal, so
//! piped output and tests see plain text.

use console::Style;
use vnotesapp::commands::MessageLevel;

pub fn title() -> Style {
    Style::new().bold()
}

pub fn id() -> Style {
    Style::new().color256(136)
}

pub fn time() -> Style {
    Style::new().color256(244).italic()
}

pub fn muted() -> Style {
    Style::new().color256(244)
}

pub fn for_level(level: MessageLevel) -> Style {
    match level {
        MessageLevel::Info => Style::new().cyan(),
        MessageLevel::Success => Style::new().green(),
        MessageLevel::Warning => Style::new().yellow().bold(),
        MessageLevel::Error => Style::new().red().bold(),
    }
}
