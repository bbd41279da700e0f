//! Hook system: registry, selector, dispatcher, and exception runner.

pub mod definitions;
pub mod dispatcher;
pub mod exception;
pub mod registry;
pub mod selector;
pub mod snapshot;

pub use definitions::{
    DispatchContext, DispatchPass, DispatchPhase, ExceptionHook, Hook, HookCapability,
    HookMetadata, PostActionHook, PreActionHook,
};
pub use dispatcher::{HookDispatcher, SaveStage};
pub use exception::ExceptionHookRunner;
pub use registry::{HookRegistration, HookRegistry};
pub use snapshot::EntityChangeSnapshot;
