//! Hook dispatcher. Wraps one save operation of a persistence session.
//!
//! A save runs these steps, strictly in sequence:
//!
//! 1. Capture a snapshot of every entity with pending changes.
//! 2. Run pre-action hooks that do not require validation.
//! 3. Ask the session, once, whether validation is enabled and failing.
//! 4. Run pre-action hooks that require validation, unless step 3 found errors.
//!    States reassigned by pre-action hooks are then applied to the session.
//! 5. Commit. On failure, run exception observers and re-raise the error.
//! 6. Run post-action hooks.
//! 7. Return the commit's affected-record count.
//!
//! A hook error is never caught: it aborts the rest of the save and is
//! returned to the caller as-is. A `current_state` assigned by a hook is
//! carried into every later pass, including the post pass.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use persist_hooks_core::config::dispatch::DispatchConfig;
use persist_hooks_core::result::AppResult;
use persist_hooks_core::traits::{Entity, PersistenceSession, SessionView};
use persist_hooks_core::types::SessionId;

use super::definitions::{DispatchContext, DispatchPass, DispatchPhase};
use super::exception::ExceptionHookRunner;
use super::registry::HookRegistry;
use super::selector;
use super::snapshot::EntityChangeSnapshot;

/// Stages of one save operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveStage {
    /// No save in progress.
    Idle,
    /// Snapshots taken from the change tracker.
    SnapshotsCaptured,
    /// Pre-action hooks not requiring validation have run.
    PreNoValidationRun,
    /// Validation outcome computed.
    ValidationChecked,
    /// Pre-action hooks requiring validation have run.
    PreValidationGatedRun,
    /// Validation-gated hooks skipped because validation failed.
    SkippedDueToValidationErrors,
    /// Underlying commit in progress.
    Committing,
    /// Post-action hooks have run.
    PostActionRun,
    /// Commit failed and exception hooks have run.
    ExceptionHandled,
}

impl SaveStage {
    /// Returns the string name of this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SnapshotsCaptured => "snapshots_captured",
            Self::PreNoValidationRun => "pre_no_validation_run",
            Self::ValidationChecked => "validation_checked",
            Self::PreValidationGatedRun => "pre_validation_gated_run",
            Self::SkippedDueToValidationErrors => "skipped_due_to_validation_errors",
            Self::Committing => "committing",
            Self::PostActionRun => "post_action_run",
            Self::ExceptionHandled => "exception_handled",
        }
    }
}

impl fmt::Display for SaveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dispatches registered hooks around a session's save operation.
#[derive(Debug)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Runner for exception observers.
    exception_runner: ExceptionHookRunner,
    /// Dispatch settings.
    config: DispatchConfig,
}

impl HookDispatcher {
    /// Creates a dispatcher with default settings.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self::with_config(registry, DispatchConfig::default())
    }

    /// Creates a dispatcher with the given settings.
    pub fn with_config(registry: Arc<HookRegistry>, config: DispatchConfig) -> Self {
        Self {
            exception_runner: ExceptionHookRunner::new(Arc::clone(&registry)),
            registry,
            config,
        }
    }

    /// Saves the session's pending changes, running hooks around the commit.
    ///
    /// Returns the commit's affected-record count unchanged. Returns, without
    /// rewrapping, the first hook error or the commit error. If an exception
    /// observer fails, its error is returned instead of the commit error.
    pub async fn save_changes<S>(&self, session: &mut S) -> AppResult<u64>
    where
        S: PersistenceSession,
    {
        let session_id = session.session_id();
        let result = self.run_save(session, session_id).await;
        self.enter(session_id, SaveStage::Idle);
        result
    }

    async fn run_save<S>(&self, session: &mut S, session_id: SessionId) -> AppResult<u64>
    where
        S: PersistenceSession,
    {
        let mut snapshots = EntityChangeSnapshot::capture(session.changed_entries());
        self.enter(session_id, SaveStage::SnapshotsCaptured);
        debug!(
            session = %session_id,
            entity_count = snapshots.len(),
            "Captured change snapshots"
        );

        // Runs before validation so hooks can repair data that would fail it.
        self.run_pass(&mut snapshots, DispatchPass::PreNoValidation, &*session)
            .await?;
        self.enter(session_id, SaveStage::PreNoValidationRun);

        let has_validation_errors =
            session.is_validation_enabled() && session.has_validation_errors().await;
        self.enter(session_id, SaveStage::ValidationChecked);

        if has_validation_errors {
            warn!(
                session = %session_id,
                "Validation errors present, skipping validation-gated hooks"
            );
            self.enter(session_id, SaveStage::SkippedDueToValidationErrors);
        } else {
            self.run_pass(&mut snapshots, DispatchPass::PreValidationGated, &*session)
                .await?;
            self.enter(session_id, SaveStage::PreValidationGatedRun);
        }

        for snapshot in snapshots.iter().filter(|s| s.is_redirected()) {
            debug!(
                session = %session_id,
                from = %snapshot.pre_save_state(),
                state = %snapshot.current_state(),
                "Applying reassigned state to change tracker"
            );
            session.set_entry_state(snapshot.entity(), snapshot.current_state())?;
        }

        self.enter(session_id, SaveStage::Committing);
        let affected = match session.commit().await {
            Ok(affected) => affected,
            Err(commit_error) => {
                error!(session = %session_id, error = %commit_error, "Commit failed");

                let context = DispatchContext::new(&*session, DispatchPhase::Failure);
                let observed = self.exception_runner.run(&commit_error, &context).await;
                self.enter(session_id, SaveStage::ExceptionHandled);

                if let Err(hook_error) = observed {
                    error!(
                        session = %session_id,
                        original = %commit_error,
                        error = %hook_error,
                        "Exception hook failed, original commit error is masked"
                    );
                    return Err(hook_error);
                }
                return Err(commit_error);
            }
        };

        self.run_pass(&mut snapshots, DispatchPass::Post, &*session)
            .await?;
        self.enter(session_id, SaveStage::PostActionRun);

        info!(
            session = %session_id,
            affected = affected,
            entity_count = snapshots.len(),
            "Save completed"
        );

        Ok(affected)
    }

    /// Runs one entity-scoped pass and returns the number of hook invocations.
    ///
    /// Selection for a snapshot happens once, at the start of that snapshot's
    /// turn in the pass, against its current state at that moment.
    async fn run_pass(
        &self,
        snapshots: &mut [EntityChangeSnapshot],
        pass: DispatchPass,
        session: &dyn SessionView,
    ) -> AppResult<usize> {
        let session_id = session.session_id();
        if self.config.short_circuit_empty && !self.registry.has_capability(pass.capability()) {
            debug!(session = %session_id, phase = %pass, "No hooks for pass, skipping");
            return Ok(0);
        }

        let candidates = self.registry.all_with_capability(pass.capability());
        let context = DispatchContext::new(session, pass.into());
        let mut invoked = 0;

        for snapshot in snapshots.iter_mut() {
            let selected = selector::select(candidates.iter().copied(), snapshot, pass);
            if selected.is_empty() {
                continue;
            }

            let mut metadata = snapshot.metadata(context);
            let handle = Arc::clone(snapshot.entity());
            let mut guard = handle.lock().await;
            let entity: &mut dyn Entity = &mut *guard;

            for registration in selected {
                let hook = registration.hook();
                if self.config.trace_hooks {
                    debug!(
                        session = %session_id,
                        phase = %pass,
                        hook = %hook.name(),
                        order = ?registration.order(),
                        entity = %entity.type_name(),
                        state = %metadata.current_state(),
                        "Invoking hook"
                    );
                }

                hook.invoke(entity, &mut metadata).await.inspect_err(|e| {
                    error!(
                        session = %session_id,
                        phase = %pass,
                        hook = %hook.name(),
                        error = %e,
                        "Hook failed, aborting save"
                    );
                })?;

                snapshot.set_current_state(metadata.current_state());
                invoked += 1;
            }
        }

        debug!(session = %session_id, phase = %pass, invoked, "Pass complete");
        Ok(invoked)
    }

    fn enter(&self, session_id: SessionId, stage: SaveStage) {
        debug!(session = %session_id, stage = %stage, "Save stage");
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}
