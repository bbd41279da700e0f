//! Hook capabilities, dispatch passes, and the typed hook variants.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use persist_hooks_core::error::AppError;
use persist_hooks_core::result::AppResult;
use persist_hooks_core::traits::{Entity, SessionView};
use persist_hooks_core::types::{PersistenceState, SessionId};

/// The capability a hook declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookCapability {
    /// Runs against each changed entity before commit.
    PreAction,
    /// Runs against each changed entity after a successful commit.
    PostAction,
    /// Observes commit failures. Not entity-scoped.
    ExceptionObserver,
}

impl HookCapability {
    /// Returns the string name of this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreAction => "pre_action",
            Self::PostAction => "post_action",
            Self::ExceptionObserver => "exception_observer",
        }
    }
}

impl fmt::Display for HookCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entity-scoped pass over the snapshots of one save operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPass {
    /// Pre-action hooks that do not require validation. Runs before validation.
    PreNoValidation,
    /// Pre-action hooks that require validation. Skipped on validation errors.
    PreValidationGated,
    /// Post-action hooks. Runs after a successful commit.
    Post,
}

impl DispatchPass {
    /// Returns the capability a hook needs to be considered for this pass.
    pub fn capability(&self) -> HookCapability {
        match self {
            Self::PreNoValidation | Self::PreValidationGated => HookCapability::PreAction,
            Self::Post => HookCapability::PostAction,
        }
    }

    /// Returns the string name of this pass.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreNoValidation => "pre_no_validation",
            Self::PreValidationGated => "pre_validation_gated",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for DispatchPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The phase of a save operation a hook is invoked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    /// Before validation is evaluated.
    PreNoValidation,
    /// After validation passed, before commit.
    PreValidationGated,
    /// After a successful commit.
    Post,
    /// After the commit failed.
    Failure,
}

impl From<DispatchPass> for DispatchPhase {
    fn from(pass: DispatchPass) -> Self {
        match pass {
            DispatchPass::PreNoValidation => Self::PreNoValidation,
            DispatchPass::PreValidationGated => Self::PreValidationGated,
            DispatchPass::Post => Self::Post,
        }
    }
}

/// Per-save context handed to every hook invocation.
///
/// Gives read access to the session being saved so a hook can inspect the
/// surrounding operation. It offers no way to start another save.
#[derive(Clone, Copy)]
pub struct DispatchContext<'s> {
    /// The session being saved.
    session: &'s dyn SessionView,
    /// The phase the hook runs in.
    phase: DispatchPhase,
    /// When this phase started.
    started_at: DateTime<Utc>,
}

impl<'s> DispatchContext<'s> {
    /// Creates a context for the given session and phase.
    pub fn new(session: &'s dyn SessionView, phase: DispatchPhase) -> Self {
        Self {
            session,
            phase,
            started_at: Utc::now(),
        }
    }

    /// Returns the session being saved.
    pub fn session(&self) -> &'s dyn SessionView {
        self.session
    }

    /// Returns the session identity.
    pub fn session_id(&self) -> SessionId {
        self.session.session_id()
    }

    /// Returns the phase.
    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    /// Returns when this phase started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl fmt::Debug for DispatchContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("session_id", &self.session_id())
            .field("phase", &self.phase)
            .field("started_at", &self.started_at)
            .finish()
    }
}

/// Metadata passed alongside the entity to pre- and post-action hooks.
///
/// `current_state` starts equal to `pre_save_state`. A pre-action hook may
/// reassign it to redirect state-based selection in later passes. A
/// reassigned state is also applied to the session's change tracker before
/// commit.
#[derive(Debug, Clone)]
pub struct HookMetadata<'s> {
    pre_save_state: PersistenceState,
    current_state: PersistenceState,
    context: DispatchContext<'s>,
}

impl<'s> HookMetadata<'s> {
    /// Creates metadata whose current state equals the pre-save state.
    pub fn new(pre_save_state: PersistenceState, context: DispatchContext<'s>) -> Self {
        Self::with_current_state(pre_save_state, pre_save_state, context)
    }

    pub(crate) fn with_current_state(
        pre_save_state: PersistenceState,
        current_state: PersistenceState,
        context: DispatchContext<'s>,
    ) -> Self {
        Self {
            pre_save_state,
            current_state,
            context,
        }
    }

    /// State of the entity when the save began.
    pub fn pre_save_state(&self) -> PersistenceState {
        self.pre_save_state
    }

    /// State used for hook selection from now on.
    pub fn current_state(&self) -> PersistenceState {
        self.current_state
    }

    /// Redirects hook selection for later passes of this save.
    pub fn set_current_state(&mut self, state: PersistenceState) {
        self.current_state = state;
    }

    /// The surrounding save context.
    pub fn context(&self) -> &DispatchContext<'s> {
        &self.context
    }
}

/// A hook that runs against changed entities before commit.
#[async_trait]
pub trait PreActionHook: Send + Sync + fmt::Debug {
    /// Name used in log fields.
    fn name(&self) -> &str;

    /// States this hook applies to. Matched by containment.
    fn interest_states(&self) -> PersistenceState;

    /// `true` to run only when the save has no validation errors, in the
    /// validation-gated pass; `false` to run unconditionally before validation.
    fn requires_validation(&self) -> bool;

    /// Invokes the hook. Returning an error aborts the save.
    async fn hook(
        &self,
        entity: &mut dyn Entity,
        metadata: &mut HookMetadata<'_>,
    ) -> AppResult<()>;
}

/// A hook that runs against changed entities after a successful commit.
#[async_trait]
pub trait PostActionHook: Send + Sync + fmt::Debug {
    /// Name used in log fields.
    fn name(&self) -> &str;

    /// States this hook applies to. Matched by containment.
    fn interest_states(&self) -> PersistenceState;

    /// Invokes the hook. Returning an error fails the save even though the
    /// commit already succeeded.
    async fn hook(
        &self,
        entity: &mut dyn Entity,
        metadata: &mut HookMetadata<'_>,
    ) -> AppResult<()>;
}

/// A hook that observes commit failures.
#[async_trait]
pub trait ExceptionHook: Send + Sync + fmt::Debug {
    /// Name used in log fields.
    fn name(&self) -> &str;

    /// Called with the commit error. The error is re-raised to the caller
    /// afterwards regardless of what this returns; returning an error here
    /// replaces it.
    async fn on_exception(&self, error: &AppError, context: &DispatchContext<'_>) -> AppResult<()>;
}

/// A registered hook, tagged by capability.
#[derive(Debug, Clone)]
pub enum Hook {
    /// Pre-action hook.
    PreAction(Arc<dyn PreActionHook>),
    /// Post-action hook.
    PostAction(Arc<dyn PostActionHook>),
    /// Exception observer.
    ExceptionObserver(Arc<dyn ExceptionHook>),
}

impl Hook {
    /// Wraps a pre-action hook.
    pub fn pre_action(hook: impl PreActionHook + 'static) -> Self {
        Self::PreAction(Arc::new(hook))
    }

    /// Wraps a post-action hook.
    pub fn post_action(hook: impl PostActionHook + 'static) -> Self {
        Self::PostAction(Arc::new(hook))
    }

    /// Wraps an exception observer.
    pub fn exception_observer(hook: impl ExceptionHook + 'static) -> Self {
        Self::ExceptionObserver(Arc::new(hook))
    }

    /// Returns the capability tag.
    pub fn capability(&self) -> HookCapability {
        match self {
            Self::PreAction(_) => HookCapability::PreAction,
            Self::PostAction(_) => HookCapability::PostAction,
            Self::ExceptionObserver(_) => HookCapability::ExceptionObserver,
        }
    }

    /// Returns the hook name.
    pub fn name(&self) -> &str {
        match self {
            Self::PreAction(h) => h.name(),
            Self::PostAction(h) => h.name(),
            Self::ExceptionObserver(h) => h.name(),
        }
    }

    /// Returns the interest states, or `None` for exception observers.
    pub fn interest_states(&self) -> Option<PersistenceState> {
        match self {
            Self::PreAction(h) => Some(h.interest_states()),
            Self::PostAction(h) => Some(h.interest_states()),
            Self::ExceptionObserver(_) => None,
        }
    }

    /// Returns the exception observer, if this is one.
    pub fn as_exception_observer(&self) -> Option<&Arc<dyn ExceptionHook>> {
        match self {
            Self::ExceptionObserver(h) => Some(h),
            _ => None,
        }
    }

    /// Invokes an entity-scoped hook.
    ///
    /// Exception observers are not entity-scoped; invoking one is an
    /// internal error.
    pub(crate) async fn invoke(
        &self,
        entity: &mut dyn Entity,
        metadata: &mut HookMetadata<'_>,
    ) -> AppResult<()> {
        match self {
            Self::PreAction(h) => h.hook(entity, metadata).await,
            Self::PostAction(h) => h.hook(entity, metadata).await,
            Self::ExceptionObserver(h) => Err(AppError::internal(format!(
                "Exception hook '{}' cannot run against an entity",
                h.name()
            ))),
        }
    }
}
