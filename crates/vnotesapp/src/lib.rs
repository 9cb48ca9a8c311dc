//! # vnotes Architecture
//!
//! vnotes is a **UI-agnostic note library** with careful persistence: verified writes,
//! fallback to a session-scoped store, periodic autosave, and propagation of changes
//! between contexts that share storage. The terminal client in the `vnotes` crate is
//! one host of it; any UI that implements [`view::NoteView`] is another.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (the vnotes binary, or any NoteView implementation) │
//! │  - Parses input, renders notes, asks for confirmation       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Syncs, dispatches, drives the view                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Outcomes → messages; export and import payloads          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository (repository.rs)                                 │
//! │  - Ordered note set, rate gate, capacity, durability        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence Engine (engine.rs) + ChangeHub (sync.rs)       │
//! │  - Envelopes, newest-wins loads, autosave, notifications    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - StorageBackend trait; FsBackend, MemBackend; tiers       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr, never exits the process,
//! and never reads the terminal. Storage goes through [`store::StorageBackend`] and
//! time through [`clock::Clock`], so every layer runs in tests on in-memory backends
//! with a hand-driven clock.
//!
//! ## Single-Threaded by Construction
//!
//! Everything here is `Rc`/`RefCell` based and `!Send`. Each operation runs to
//! completion before the next starts; notifications from other contexts are queued
//! and applied between operations. Autosave is a cooperative tick the host calls.
//!
//! ## Module Overview
//!
//! - [`model`]: `Note`, envelopes, payload decoding, id generation
//! - [`validation`]: input and record validation
//! - [`store`]: storage backends and tier selection
//! - [`engine`]: the persistence engine
//! - [`sync`]: cross-context change notifications
//! - [`repository`]: the note set and its mutations
//! - [`commands`]: business logic returning [`commands::CmdResult`]
//! - [`view`] / [`api`]: the presentation seam and the facade that drives it
//! - [`config`] / [`init`]: configuration and wiring

pub mod api;
pub mod clock;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod init;
pub mod model;
pub mod repository;
pub mod store;
pub mod sync;
pub mod validation;
pub mod view;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Result, VnotesError};
