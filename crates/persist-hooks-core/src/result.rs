//! Convenience result type alias for persist-hooks.

use crate::error::AppError;

/// A specialized `Result` type for hook dispatch and persistence operations.
///
/// Hook callbacks, collaborator commits, and the dispatcher all return this
/// so that faults flow through `?` without conversion.
pub type AppResult<T> = Result<T, AppError>;
