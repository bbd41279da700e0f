//! Traits defined in `persist-hooks-core` and implemented by persistence layers.

pub mod entity;
pub mod session;

pub use entity::{Entity, EntityRef, entity_ref};
pub use session::{PersistenceSession, SessionView, TrackedEntry};
