//! Persistence state flags.
//!
//! A tracked entity is in exactly one state at a time, but hooks declare
//! interest in a *set* of states. Matching is containment: a hook's interest
//! set must fully contain the entity's state flags, so a hook interested only
//! in `MODIFIED` does not fire for an entity whose state is
//! `ADDED | MODIFIED`.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::AppError;

bitflags! {
    /// Bit-flag set of entity persistence states.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PersistenceState: u8 {
        /// The entity is not tracked by the session.
        const DETACHED = 1;
        /// The entity is tracked and has no pending changes.
        const UNCHANGED = 1 << 1;
        /// The entity is new and will be inserted.
        const ADDED = 1 << 2;
        /// The entity will be deleted.
        const DELETED = 1 << 3;
        /// The entity has pending changes to existing data.
        const MODIFIED = 1 << 4;
    }
}

impl PersistenceState {
    /// States that never take part in a save operation.
    pub const INERT: Self = Self::UNCHANGED.union(Self::DETACHED);

    /// Returns `true` when an interest set declared by a hook accepts `state`.
    ///
    /// This is bitwise containment (`self & state == state`), never equality
    /// and never mere intersection.
    pub fn accepts(self, state: PersistenceState) -> bool {
        self.contains(state)
    }

    /// Returns `true` for states a save operation must snapshot.
    pub fn is_pending_change(self) -> bool {
        !self.is_empty() && !self.intersects(Self::INERT)
    }
}

impl fmt::Display for PersistenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

impl FromStr for PersistenceState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        bitflags::parser::from_str(s).map_err(|e| {
            AppError::configuration(format!("Invalid persistence state '{s}': {e}"))
        })
    }
}
