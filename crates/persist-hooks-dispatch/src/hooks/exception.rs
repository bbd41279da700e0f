//! Exception hook runner. Invoked when the commit fails.

use std::sync::Arc;

use tracing::debug;

use persist_hooks_core::error::AppError;
use persist_hooks_core::result::AppResult;

use super::definitions::{DispatchContext, HookCapability};
use super::registry::HookRegistry;

/// Runs every exception observer, in registration order, for a commit failure.
///
/// Exception observers are not entity-scoped, so no state filtering and no
/// explicit ordering apply. The runner never suppresses the commit error; the
/// caller re-raises it. If an observer itself fails, the remaining observers
/// are skipped and that failure is returned, which masks the commit error.
#[derive(Debug, Clone)]
pub struct ExceptionHookRunner {
    registry: Arc<HookRegistry>,
}

impl ExceptionHookRunner {
    /// Creates a runner over the given registry.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Notifies every exception observer of `error`.
    pub async fn run(&self, error: &AppError, context: &DispatchContext<'_>) -> AppResult<()> {
        let observers: Vec<_> = self
            .registry
            .all_with_capability(HookCapability::ExceptionObserver)
            .into_iter()
            .filter_map(|r| r.hook().as_exception_observer())
            .collect();

        if observers.is_empty() {
            return Ok(());
        }

        debug!(
            session = %context.session_id(),
            observer_count = observers.len(),
            "Running exception hooks"
        );

        for observer in observers {
            debug!(hook = %observer.name(), "Invoking exception hook");
            observer.on_exception(error, context).await?;
        }

        Ok(())
    }
}
