//! # Storage Layer
//!
//! Raw key-value storage for vnotes. The whole note set lives under a single key as one
//! serialized envelope, so backends only need `read`/`write`/`remove` on strings.
//!
//! ## Backends
//!
//! - [`fs_backend::FsBackend`]: the durable store, one file per key, atomic writes
//!   (write to a temp file, then rename).
//! - [`mem_backend::MemBackend`]: the ephemeral store, lost when the process exits. Also
//!   the workhorse of the test suite, with switches to simulate failures.
//!
//! ## Tiers
//!
//! [`tiered::TieredStore`] probes the backends, orders them durable-first, and performs
//! verified writes with fallback. Callers learn which [`Tier`] actually holds their data
//! and warn the user when it is not the durable one.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! └── vnotes-data.json    # The envelope (key = configured storage key)
//! ```

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod tiered;

pub use backend::StorageBackend;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
pub use tiered::{Tier, TieredStore};
