use super::backend::StorageBackend;
use crate::error::{Result, VnotesError};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// In-memory key-value store.
///
/// Serves as the ephemeral (session-scoped) tier in production and as the backend for
/// most tests. Uses `RefCell` for interior mutability since vnotes is single-threaded,
/// so the `StorageBackend` trait can take `&self` everywhere.
///
/// The `simulate_*` switches inject the failures the persistence engine has to survive.
#[derive(Default)]
pub struct MemBackend {
    entries: RefCell<HashMap<String, String>>,
    simulate_write_error: Cell<bool>,
    simulate_unavailable: Cell<bool>,
    simulate_corrupt_reads: Cell<bool>,
    write_count: Cell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail, e.g. a full quota.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Make every operation fail, e.g. storage disabled by the host.
    pub fn set_simulate_unavailable(&self, simulate: bool) {
        self.simulate_unavailable.set(simulate);
    }

    /// Return something other than what was stored, so write-verify fails.
    pub fn set_simulate_corrupt_reads(&self, simulate: bool) {
        self.simulate_corrupt_reads.set(simulate);
    }

    /// Number of successful writes, probe writes included.
    pub fn write_count(&self) -> usize {
        self.write_count.get()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check_available(&self) -> Result<()> {
        if self.simulate_unavailable.get() {
            return Err(VnotesError::storage_unavailable("memory store disabled"));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        let value = self.entries.borrow().get(key).cloned();
        if self.simulate_corrupt_reads.get() {
            return Ok(value.map(|v| format!("{}\u{fffd}", v)));
        }
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        if self.simulate_write_error.get() {
            return Err(VnotesError::storage_unavailable("Simulated write error"));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.write_count.set(self.write_count.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
