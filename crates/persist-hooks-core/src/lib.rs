//! # persist-hooks-core
//!
//! Core crate for persist-hooks. Contains the persistence state flags,
//! typed identifiers, configuration schemas, the collaborator traits a
//! persistence layer implements, and the unified error system.
//!
//! This crate has **no** internal dependencies on other persist-hooks crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::{PersistenceState, SessionId};
