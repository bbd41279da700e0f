//! Configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file merged with `PERSIST_HOOKS__*` environment variables.
//! Every field has a default, so an empty source yields a usable config.

pub mod dispatch;
pub mod logging;

use serde::{Deserialize, Serialize};

use self::dispatch::DispatchConfig;
use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Hook dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HooksConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional. Environment variables prefixed with
    /// `PERSIST_HOOKS` override file values, e.g.
    /// `PERSIST_HOOKS__DISPATCH__TRACE_HOOKS=true`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("PERSIST_HOOKS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
