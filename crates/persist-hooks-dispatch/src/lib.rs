//! # persist-hooks-dispatch
//!
//! Runs registered hooks around the save operation of a persistence session:
//!
//! - Hook registry with optional explicit ordering
//! - Per-entity snapshots with a redirectable current state
//! - State-containment and pass-based hook selection
//! - Save dispatcher with pre-validation, validation-gated, and post passes
//! - Exception observers for commit failures
//! - Closure-backed hooks bound to one entity type

pub mod hooks;
pub mod prelude;
pub mod typed;

pub use hooks::definitions::{
    DispatchContext, DispatchPass, DispatchPhase, ExceptionHook, Hook, HookCapability,
    HookMetadata, PostActionHook, PreActionHook,
};
pub use hooks::dispatcher::{HookDispatcher, SaveStage};
pub use hooks::exception::ExceptionHookRunner;
pub use hooks::registry::{HookRegistration, HookRegistry};
pub use hooks::snapshot::EntityChangeSnapshot;
pub use typed::{FnExceptionHook, PostEntityHook, PreEntityHook};
