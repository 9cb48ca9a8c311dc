//! Storage tier selection and verified writes.
//!
//! A [`TieredStore`] holds up to two backends, ordered by preference:
//!
//! 1. **Durable**: survives restarts (the filesystem store).
//! 2. **Ephemeral**: lives for the session only (the memory store).
//!
//! Each backend is probed once at selection time and dropped if the probe fails. If no
//! backend survives, every write fails with `StorageUnavailable`.
//!
//! Writes go to the most preferred tier first. After each write the value is read back
//! and compared byte-for-byte with what was sent; a mismatch counts as a failed write.
//! A failed tier is skipped in favour of the next one, and the caller learns which tier
//! actually holds the data.

use super::backend::StorageBackend;
use crate::error::{Result, VnotesError};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Durable,
    Ephemeral,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Durable => write!(f, "durable"),
            Tier::Ephemeral => write!(f, "ephemeral"),
        }
    }
}

pub struct TieredStore {
    tiers: Vec<(Tier, Box<dyn StorageBackend>)>,
}

impl TieredStore {
    /// Probe the candidates and keep the ones that work, durable first.
    pub fn select(
        durable: Option<Box<dyn StorageBackend>>,
        ephemeral: Option<Box<dyn StorageBackend>>,
    ) -> Self {
        let mut tiers = Vec::new();
        for (tier, candidate) in [(Tier::Durable, durable), (Tier::Ephemeral, ephemeral)] {
            let Some(backend) = candidate else {
                continue;
            };
            if backend.probe() {
                debug!("{} tier available ({})", tier, backend.name());
                tiers.push((tier, backend));
            } else {
                warn!("{} tier unavailable ({}): probe failed", tier, backend.name());
            }
        }
        if tiers.is_empty() {
            warn!("no writable storage; notes will be kept in memory only");
        }
        Self { tiers }
    }

    /// A store with no backends at all. Every write fails.
    pub fn unavailable() -> Self {
        Self { tiers: Vec::new() }
    }

    pub fn is_available(&self) -> bool {
        !self.tiers.is_empty()
    }

    /// Tiers that passed their probe, in preference order.
    pub fn tiers(&self) -> Vec<Tier> {
        self.tiers.iter().map(|(tier, _)| *tier).collect()
    }

    /// Write `payload` under `key` on the first tier that accepts and verifies it.
    pub fn write_verified(&self, key: &str, payload: &str) -> Result<Tier> {
        let mut last_err = None;
        for (tier, backend) in &self.tiers {
            match write_and_verify(*tier, backend.as_ref(), key, payload) {
                Ok(()) => {
                    debug!("wrote {} bytes to {} tier", payload.len(), tier);
                    return Ok(*tier);
                }
                Err(err) => {
                    warn!("{} tier write failed ({}): {}", tier, backend.name(), err);
                    last_err = Some(err);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| VnotesError::storage_unavailable("no writable storage tier")))
    }

    /// Read `key` from every tier. Tiers that hold nothing are left out; a tier whose
    /// read failed is kept with its error so callers can tell it from an empty one.
    pub fn read_all(&self, key: &str) -> Vec<(Tier, Result<String>)> {
        let mut found = Vec::new();
        for (tier, backend) in &self.tiers {
            match backend.read(key) {
                Ok(Some(payload)) => found.push((*tier, Ok(payload))),
                Ok(None) => {}
                Err(err) => {
                    warn!("{} tier read failed ({}): {}", tier, backend.name(), err);
                    found.push((*tier, Err(err)));
                }
            }
        }
        found
    }
}

fn write_and_verify(
    tier: Tier,
    backend: &dyn StorageBackend,
    key: &str,
    payload: &str,
) -> Result<()> {
    backend.write(key, payload)?;
    match backend.read(key)? {
        Some(stored) if stored == payload => Ok(()),
        _ => Err(VnotesError::PersistenceVerifyFailed { tier }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use std::rc::Rc;

    fn shared() -> (Rc<MemBackend>, Rc<MemBackend>) {
        (Rc::new(MemBackend::new()), Rc::new(MemBackend::new()))
    }

    fn tiered(durable: &Rc<MemBackend>, ephemeral: &Rc<MemBackend>) -> TieredStore {
        TieredStore::select(
            Some(Box::new(Rc::clone(durable))),
            Some(Box::new(Rc::clone(ephemeral))),
        )
    }

    #[test]
    fn prefers_durable_tier() {
        let (durable, ephemeral) = shared();
        let store = tiered(&durable, &ephemeral);

        assert_eq!(store.tiers(), vec![Tier::Durable, Tier::Ephemeral]);
        assert_eq!(store.write_verified("k", "v").unwrap(), Tier::Durable);
        assert_eq!(durable.read("k").unwrap(), Some("v".to_string()));
        assert_eq!(ephemeral.read("k").unwrap(), None);
    }

    #[test]
    fn drops_durable_tier_that_fails_probe() {
        let (durable, ephemeral) = shared();
        durable.set_simulate_unavailable(true);
        let store = tiered(&durable, &ephemeral);

        assert_eq!(store.tiers(), vec![Tier::Ephemeral]);
        assert_eq!(store.write_verified("k", "v").unwrap(), Tier::Ephemeral);
    }

    #[test]
    fn falls_back_when_durable_write_fails() {
        let (durable, ephemeral) = shared();
        let store = tiered(&durable, &ephemeral);
        durable.set_simulate_write_error(true);

        assert_eq!(store.write_verified("k", "v").unwrap(), Tier::Ephemeral);
        assert_eq!(ephemeral.read("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn falls_back_when_readback_mismatches() {
        let (durable, ephemeral) = shared();
        let store = tiered(&durable, &ephemeral);
        durable.set_simulate_corrupt_reads(true);

        assert_eq!(store.write_verified("k", "v").unwrap(), Tier::Ephemeral);
    }

    #[test]
    fn surfaces_verify_failure_when_every_tier_mismatches() {
        let (durable, ephemeral) = shared();
        let store = tiered(&durable, &ephemeral);
        durable.set_simulate_corrupt_reads(true);
        ephemeral.set_simulate_corrupt_reads(true);

        let err = store.write_verified("k", "v").unwrap_err();
        assert!(matches!(
            err,
            VnotesError::PersistenceVerifyFailed {
                tier: Tier::Ephemeral
            }
        ));
    }

    #[test]
    fn no_tiers_means_storage_unavailable() {
        let store = TieredStore::unavailable();
        assert!(!store.is_available());
        let err = store.write_verified("k", "v").unwrap_err();
        assert!(matches!(err, VnotesError::StorageUnavailable(_)));
    }

    #[test]
    fn read_all_collects_every_tier() {
        let (durable, ephemeral) = shared();
        let store = tiered(&durable, &ephemeral);
        durable.write("k", "old").unwrap();
        ephemeral.write("k", "new").unwrap();

        let found: Vec<(Tier, String)> = store
            .read_all("k")
            .into_iter()
            .map(|(tier, raw)| (tier, raw.unwrap()))
            .collect();
        assert_eq!(
            found,
            vec![
                (Tier::Durable, "old".to_string()),
                (Tier::Ephemeral, "new".to_string())
            ]
        );
    }

    #[test]
    fn read_all_keeps_failed_tiers() {
        let (durable, ephemeral) = shared();
        let store = tiered(&durable, &ephemeral);
        ephemeral.write("k", "session").unwrap();
        durable.set_simulate_unavailable(true);

        let found = store.read_all("k");

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, Tier::Durable);
        assert!(matches!(found[0].1, Err(VnotesError::StorageUnavailable(_))));
        assert_eq!(found[1].1.as_ref().unwrap(), "session");
    }
}
