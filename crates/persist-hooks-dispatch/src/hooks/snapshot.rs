//! Per-entity change snapshots for one save operation.

use persist_hooks_core::traits::{EntityRef, TrackedEntry};
use persist_hooks_core::types::PersistenceState;

use super::definitions::{DispatchContext, HookMetadata};

/// The state of one changed entity for the duration of one save operation.
///
/// `pre_save_state` is fixed at capture. `current_state` starts equal to it
/// and follows whatever pre-action hooks assign.
#[derive(Debug, Clone)]
pub struct EntityChangeSnapshot {
    entity: EntityRef,
    pre_save_state: PersistenceState,
    current_state: PersistenceState,
}

impl EntityChangeSnapshot {
    /// Captures a snapshot of an entity in the given state.
    pub fn new(entity: EntityRef, state: PersistenceState) -> Self {
        Self {
            entity,
            pre_save_state: state,
            current_state: state,
        }
    }

    /// Builds the snapshot set for a save from the tracker's report.
    ///
    /// Entries whose state is empty or includes `UNCHANGED` or `DETACHED`
    /// are skipped.
    pub fn capture(entries: Vec<TrackedEntry>) -> Vec<Self> {
        entries
            .into_iter()
            .filter(|entry| entry.state.is_pending_change())
            .map(|entry| Self::new(entry.entity, entry.state))
            .collect()
    }

    /// The tracked entity.
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    /// State of the entity when the save began.
    pub fn pre_save_state(&self) -> PersistenceState {
        self.pre_save_state
    }

    /// State used for hook selection.
    pub fn current_state(&self) -> PersistenceState {
        self.current_state
    }

    pub(crate) fn set_current_state(&mut self, state: PersistenceState) {
        self.current_state = state;
    }

    /// Returns `true` when a hook reassigned the state.
    pub fn is_redirected(&self) -> bool {
        self.current_state != self.pre_save_state
    }

    /// Builds the metadata handed to hooks for this snapshot.
    pub fn metadata<'s>(&self, context: DispatchContext<'s>) -> HookMetadata<'s> {
        HookMetadata::with_current_state(self.pre_save_state, self.current_state, context)
    }
}
