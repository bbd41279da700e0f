//! # persist-hooks-memory
//!
//! In-process [`PersistenceSession`](persist_hooks_core::traits::PersistenceSession)
//! backed by a plain entry list. It tracks entity states, runs an optional
//! validator, and simulates commits. Useful for tests and for embedding the
//! dispatcher without a database.

pub mod memory;

pub use memory::session::{MemorySession, Validator};
