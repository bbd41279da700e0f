//! Persistence collaborator contract.
//!
//! The dispatcher owns no change tracking, validation, or SQL. A persistence
//! layer exposes those through [`PersistenceSession`] and hands the session to
//! the dispatcher for the duration of one save call.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::traits::entity::EntityRef;
use crate::types::{PersistenceState, SessionId};

/// One entry reported by a session's change tracker.
#[derive(Debug, Clone)]
pub struct TrackedEntry {
    /// The tracked entity.
    pub entity: EntityRef,
    /// The entity's state as reported by the tracker.
    pub state: PersistenceState,
}

impl TrackedEntry {
    /// Create a new tracked entry.
    pub fn new(entity: EntityRef, state: PersistenceState) -> Self {
        Self { entity, state }
    }
}

/// Read-only view of a session, handed to hooks through their context.
///
/// A hook runs while the dispatcher holds the lock on the hooked entity.
/// Locking that same entity again from a tracked entry never completes.
pub trait SessionView: Send + Sync {
    /// Identity of this session.
    fn session_id(&self) -> SessionId;

    /// Entities with pending changes (neither `UNCHANGED` nor `DETACHED`).
    fn changed_entries(&self) -> Vec<TrackedEntry>;

    /// Whether the session validates entities on save.
    fn is_validation_enabled(&self) -> bool;
}

/// A persistence session (unit of work) whose save operation is hooked.
///
/// Callers must not issue concurrent saves against one session; the
/// dispatcher takes `&mut` access for the whole save and does no locking of
/// its own.
#[async_trait]
pub trait PersistenceSession: SessionView {
    /// Whether any tracked entity with pending changes currently fails validation.
    async fn has_validation_errors(&self) -> bool;

    /// Moves a tracked entity to `state` in the change tracker.
    ///
    /// Called before commit for every entity whose state a pre-action hook
    /// reassigned.
    fn set_entry_state(&mut self, entity: &EntityRef, state: PersistenceState) -> AppResult<()>;

    /// Runs the underlying commit and returns the number of affected records.
    async fn commit(&mut self) -> AppResult<u64>;
}
