//! Core type definitions used across the persist-hooks workspace.

pub mod id;
pub mod state;

pub use id::SessionId;
pub use state::PersistenceState;
