//! # vnotes CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this file only
//! invokes `cli::run()` and turns its result into a process exit status.
//!
//! ## Workspace Structure
//!
//! - `crates/vnotesapp/`: the UI-agnostic library (storage, repository, commands)
//! - `crates/vnotes/`: this terminal client, depending on `vnotesapp`
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/vnotes/src/cli/)                         │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - TerminalView: the NoteView for a terminal (render.rs)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/vnotesapp/src/api.rs)                    │
//! │  - Syncs, dispatches, calls back into the view              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each invocation is one short session: load, run one command, save once more on
//! teardown, exit. Errors from an operation have already been shown by the view by the
//! time `run` returns; only setup failures are printed here.

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
