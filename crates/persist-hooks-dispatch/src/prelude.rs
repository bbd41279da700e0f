//! Prelude for hook authors.

pub use async_trait::async_trait;

pub use persist_hooks_core::error::{AppError, ErrorKind};
pub use persist_hooks_core::result::AppResult;
pub use persist_hooks_core::traits::{Entity, EntityRef, SessionView, entity_ref};
pub use persist_hooks_core::types::PersistenceState;

pub use crate::hooks::definitions::{
    DispatchContext, DispatchPhase, ExceptionHook, Hook, HookMetadata, PostActionHook,
    PreActionHook,
};
pub use crate::hooks::dispatcher::HookDispatcher;
pub use crate::hooks::registry::HookRegistry;
pub use crate::typed::{FnExceptionHook, PostEntityHook, PreEntityHook};
