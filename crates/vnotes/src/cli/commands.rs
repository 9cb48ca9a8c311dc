//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Decides the process exit status
//! - Handles argument parsing
//! - Reads and writes backup files
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments into typed commands via clap
//! 2. **Logging**: install the `tracing` subscriber (stderr, `VNOTES_LOG`, `--verbose`)
//! 3. **Context Setup**: load config, build the repository, wrap it in `NotesApi`
//! 4. **Dispatch**: one API call per invocation
//! 5. **Teardown**: always give the repository its final save

use super::render::TerminalView;
use super::setup::{Cli, Commands};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vnotesapp::api::NotesApi;
use vnotesapp::config::VnotesConfig;
use vnotesapp::error::Result;
use vnotesapp::init::initialize;

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = VnotesConfig::load_default()?;
    let ctx = initialize(config, cli.data.clone())?;
    if !ctx.is_durable() {
        debug!(
            "durable store at {} unavailable, using session storage",
            ctx.data_dir.display()
        );
    }

    let mut api = NotesApi::new(ctx.repo, TerminalView::new(cli.assume_yes()), ctx.clock);
    let outcome = dispatch(&mut api, cli.action());
    api.teardown();

    match outcome {
        Ok(true) => Ok(ExitCode::SUCCESS),
        // Already reported through the view.
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(e) => Err(e),
    }
}

/// Run one command. `Ok(false)` means the operation failed and the view has said so;
/// `Err` is a failure outside the API (reading or writing a backup file).
fn dispatch(api: &mut NotesApi<TerminalView>, command: &Commands) -> Result<bool> {
    let result = match command {
        Commands::List => {
            api.list();
            return Ok(true);
        }
        Commands::Create { title, content } => api.create(title, content),
        Commands::Update { id, title, content } => api.update(id, title, content),
        Commands::Delete { id, .. } => api.delete(id),
        Commands::Clear { .. } => api.clear(),
        Commands::Export { output } => match api.export() {
            Ok(result) => {
                if let Some(backup) = &result.backup {
                    let path = write_backup(output.as_deref(), &backup.filename, &backup.contents)?;
                    println!("Exported {} notes to {}", api.repository().len(), path.display());
                }
                Ok(result)
            }
            Err(e) => Err(e),
        },
        Commands::Import { file } => {
            let raw = fs::read_to_string(file)?;
            api.import(&raw)
        }
    };
    Ok(result.is_ok())
}

fn write_backup(dir: Option<&Path>, filename: &str, contents: &str) -> Result<PathBuf> {
    let dir = dir.unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(filename);
    fs::write(&path, contents)?;
    Ok(path)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("VNOTES_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
