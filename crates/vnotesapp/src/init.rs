//! # Wiring
//!
//! [`initialize`] assembles a ready repository from configuration:
//!
//! 1. **Data directory**: an explicit override (the client's `--data`), else
//!    `data_dir` from config, else the OS data directory via `directories`.
//! 2. **Tiers**: an [`FsBackend`] rooted at the data directory is the durable tier; a
//!    [`MemBackend`] that lives as long as the process is the ephemeral tier. Both are
//!    probed; see [`TieredStore::select`].
//! 3. **Engine and repository**: built with the configured storage key, autosave
//!    interval and rate limit, then loaded from storage.
//!
//! A missing data directory is not an error: it is created on first write. A data
//! directory that cannot be written to fails its probe and the session falls back to
//! the ephemeral tier.

use crate::clock::{Clock, SystemClock};
use crate::config::{project_dirs, VnotesConfig};
use crate::engine::PersistenceEngine;
use crate::error::{Result, VnotesError};
use crate::repository::NoteRepository;
use crate::store::{FsBackend, MemBackend, Tier, TieredStore};
use crate::sync::ChangeHub;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

pub struct VnotesContext {
    pub repo: NoteRepository,
    pub clock: Rc<dyn Clock>,
    pub config: VnotesConfig,
    pub data_dir: PathBuf,
}

impl VnotesContext {
    /// True if notes will survive this process.
    pub fn is_durable(&self) -> bool {
        self.repo.engine().store().tiers().first() == Some(&Tier::Durable)
    }
}

/// Resolve where the durable store lives.
pub fn resolve_data_dir(config: &VnotesConfig, data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override.or_else(|| config.data_dir.clone()) {
        return Ok(path);
    }
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| VnotesError::Config("could not determine a data directory".to_string()))
}

pub fn initialize(config: VnotesConfig, data_override: Option<PathBuf>) -> Result<VnotesContext> {
    let data_dir = resolve_data_dir(&config, data_override)?;
    debug!("data directory: {}", data_dir.display());

    let store = TieredStore::select(
        Some(Box::new(FsBackend::new(data_dir.clone()))),
        Some(Box::new(MemBackend::new())),
    );
    let clock: Rc<dyn Clock> = Rc::new(SystemClock);
    let engine = PersistenceEngine::new(store, config.engine_settings(), Rc::clone(&clock))
        .with_change_hub(&ChangeHub::new());
    let repo = NoteRepository::open(engine, Rc::clone(&clock), config.rate_limit());

    Ok(VnotesContext {
        repo,
        clock,
        config,
        data_dir,
    })
}
