//! # CLI Behavior
//!
//! This is **one possible UI client** for vnotes, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and output
//! formatting.
//!
//! ## Naked Execution (`vnotes`)
//!
//! Running `vnotes` with no arguments defaults to `vnotes list`.
//!
//! ## Destructive Commands
//!
//! `delete` and `clear` ask for confirmation on the terminal. `--yes` answers for you;
//! without a terminal and without `--yes` the answer is no.
//!
//! ## Module Structure
//!
//! - `commands`: context setup, dispatch, and the export/import file handling
//! - `render`: `TerminalView`, list and message formatting
//! - `setup`: argument parsing via clap
//! - `styles`: terminal styles

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
