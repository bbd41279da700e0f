//! In-memory session implementation.

pub mod session;
