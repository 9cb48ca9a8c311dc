use crate::error::Result;
use std::rc::Rc;

/// Key used by [`StorageBackend::probe`]. Never collides with a real storage key.
pub const PROBE_KEY: &str = "__vnotes_probe__";

/// Abstract interface for raw key-value storage.
///
/// A backend only knows how to move strings in and out of a store. Deciding which
/// backend to use, verifying writes, and the envelope format all live above it, in
/// [`super::tiered::TieredStore`] and [`crate::engine::PersistenceEngine`].
pub trait StorageBackend {
    /// Short name used in logs ("filesystem", "memory").
    fn name(&self) -> &'static str;

    /// Read the value stored under `key`.
    /// Returns Ok(None) if nothing is stored there.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`.
    /// MUST be atomic: readers see either the old value or the new one, never a mix.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Check the store is usable by running a write/read/remove cycle.
    fn probe(&self) -> bool {
        let token = "probe";
        let round_trip = self
            .write(PROBE_KEY, token)
            .and_then(|_| self.read(PROBE_KEY));
        let ok = matches!(round_trip, Ok(Some(ref value)) if value == token);
        ok && self.remove(PROBE_KEY).is_ok()
    }
}

/// Lets several contexts share one store, the way browser tabs share local storage.
impl<T: StorageBackend + ?Sized> StorageBackend for Rc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn probe(&self) -> bool {
        (**self).probe()
    }
}
