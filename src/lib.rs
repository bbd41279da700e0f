//! # persist-hooks
//!
//! Lifecycle hooks around the save operation of a persistence session.
//!
//! Register pre-action, post-action, and exception hooks in a
//! [`HookRegistry`], build a [`HookDispatcher`] over it, and route every save
//! through [`HookDispatcher::save_changes`]. Any type implementing
//! [`PersistenceSession`] can be saved; [`MemorySession`] is the in-process
//! implementation.

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub use persist_hooks_core::config::{
    HooksConfig, dispatch::DispatchConfig, logging::LoggingConfig,
};
pub use persist_hooks_core::error::{AppError, ErrorKind};
pub use persist_hooks_core::result::AppResult;
pub use persist_hooks_core::traits::{
    Entity, EntityRef, PersistenceSession, SessionView, TrackedEntry, entity_ref,
};
pub use persist_hooks_core::types::{PersistenceState, SessionId};
pub use persist_hooks_dispatch::{
    DispatchContext, DispatchPass, DispatchPhase, EntityChangeSnapshot, ExceptionHook,
    ExceptionHookRunner, FnExceptionHook, Hook, HookCapability, HookDispatcher, HookMetadata,
    HookRegistration, HookRegistry, PostActionHook, PostEntityHook, PreActionHook, PreEntityHook,
    SaveStage, prelude,
};
pub use persist_hooks_memory::MemorySession;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    installed.map_err(|e| AppError::internal(format!("Failed to install subscriber: {e}")))?;

    info!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}
