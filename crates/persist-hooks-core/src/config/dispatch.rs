//! Hook dispatch configuration.

use serde::{Deserialize, Serialize};

/// Hook dispatcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Skip a pass entirely when no hook of the capability it needs is registered.
    #[serde(default = "default_true")]
    pub short_circuit_empty: bool,
    /// Emit a `debug` event for every individual hook invocation.
    #[serde(default)]
    pub trace_hooks: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            short_circuit_empty: default_true(),
            trace_hooks: false,
        }
    }
}

fn default_true() -> bool {
    true
}
