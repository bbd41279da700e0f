//! In-memory persistence session.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use persist_hooks_core::error::AppError;
use persist_hooks_core::result::AppResult;
use persist_hooks_core::traits::{Entity, EntityRef, PersistenceSession, SessionView, TrackedEntry};
use persist_hooks_core::types::{PersistenceState, SessionId};

/// Returns `true` when an entity is valid.
pub type Validator = Arc<dyn Fn(&dyn Entity) -> bool + Send + Sync>;

/// Session whose change tracker is a list of `(entity, state)` pairs.
///
/// Cloning yields an independent tracker that shares the entity handles.
#[derive(Clone)]
pub struct MemorySession {
    /// Identity handed to hooks.
    session_id: SessionId,
    /// Tracked entities in tracking order.
    entries: Vec<(EntityRef, PersistenceState)>,
    /// Whether validation runs on save.
    validation_enabled: bool,
    /// Entity validator. No validator means every entity is valid.
    validator: Option<Validator>,
    /// Error message for the next commit attempt.
    fail_next: Option<String>,
    /// Number of successful commits.
    commit_count: u64,
}

impl MemorySession {
    /// Create an empty session with validation enabled.
    pub fn new() -> Self {
        Self {
            session_id: SessionId::new(),
            entries: Vec::new(),
            validation_enabled: true,
            validator: None,
            fail_next: None,
            commit_count: 0,
        }
    }

    /// Enables or disables validation on save.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validation_enabled = enabled;
        self
    }

    /// Installs the validator run against entities with pending changes.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&dyn Entity) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Starts tracking `entity` in `state`.
    pub fn track(&mut self, entity: EntityRef, state: PersistenceState) -> &mut Self {
        self.entries.push((entity, state));
        self
    }

    /// Makes the next commit fail with a commit error carrying `message`.
    pub fn fail_next_commit(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u64 {
        self.commit_count
    }

    /// Tracked state of the entry at `index`.
    pub fn state_of(&self, index: usize) -> Option<PersistenceState> {
        self.entries.get(index).map(|(_, state)| *state)
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn pending(&self) -> impl Iterator<Item = &(EntityRef, PersistenceState)> {
        self.entries
            .iter()
            .filter(|(_, state)| state.is_pending_change())
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySession")
            .field("session_id", &self.session_id)
            .field("entries", &self.entries.len())
            .field("validation_enabled", &self.validation_enabled)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("fail_next", &self.fail_next)
            .field("commit_count", &self.commit_count)
            .finish()
    }
}

impl SessionView for MemorySession {
    fn session_id(&self) -> SessionId {
        self.session_id
    }

    fn changed_entries(&self) -> Vec<TrackedEntry> {
        self.pending()
            .map(|(entity, state)| TrackedEntry::new(Arc::clone(entity), *state))
            .collect()
    }

    fn is_validation_enabled(&self) -> bool {
        self.validation_enabled
    }
}

#[async_trait]
impl PersistenceSession for MemorySession {
    async fn has_validation_errors(&self) -> bool {
        let Some(validator) = &self.validator else {
            return false;
        };

        for (handle, _) in self.pending() {
            let guard = handle.lock().await;
            let entity: &dyn Entity = &*guard;
            if !validator(entity) {
                debug!(entity = %entity.type_name(), "Entity failed validation");
                return true;
            }
        }
        false
    }

    fn set_entry_state(&mut self, entity: &EntityRef, state: PersistenceState) -> AppResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|(tracked, _)| Arc::ptr_eq(tracked, entity))
            .ok_or_else(|| AppError::internal("Entity is not tracked by this session"))?;

        debug!(session_id = %self.session_id, from = %entry.1, to = %state, "Entry state changed");
        entry.1 = state;
        Ok(())
    }

    async fn commit(&mut self) -> AppResult<u64> {
        if self.validation_enabled && self.has_validation_errors().await {
            return Err(AppError::validation("Tracked entities failed validation"));
        }

        if let Some(message) = self.fail_next.take() {
            warn!(session_id = %self.session_id, error = %message, "Simulated commit failure");
            return Err(AppError::commit(message));
        }

        let affected = self.pending().count() as u64;

        self.entries
            .retain(|(_, state)| !state.contains(PersistenceState::DELETED));
        for (_, state) in &mut self.entries {
            if state.intersects(PersistenceState::ADDED | PersistenceState::MODIFIED) {
                *state = PersistenceState::UNCHANGED;
            }
        }
        self.commit_count += 1;

        debug!(session_id = %self.session_id, affected, "Committed in-memory session");
        Ok(affected)
    }
}
