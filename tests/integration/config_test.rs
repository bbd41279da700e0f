//! Integration tests for configuration loading and logging setup.

use std::sync::Arc;

use persist_hooks::{
    DispatchConfig, HookDispatcher, HookRegistry, HooksConfig, LoggingConfig, MemorySession,
    PersistenceState, SessionId,
};

use super::helpers::{self, Article, CallLog};

#[test]
fn test_load_from_toml_file() {
    let path = std::env::temp_dir().join(format!("persist-hooks-{}.toml", SessionId::new()));
    std::fs::write(
        &path,
        "[dispatch]\ntrace_hooks = true\n\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n",
    )
    .unwrap();

    let config = HooksConfig::load(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(config.dispatch.trace_hooks);
    assert!(config.dispatch.short_circuit_empty);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_malformed_file_is_configuration_error() {
    let path = std::env::temp_dir().join(format!("persist-hooks-{}.toml", SessionId::new()));
    std::fs::write(&path, "[dispatch]\ntrace_hooks = \"sometimes\"\n").unwrap();

    let err = HooksConfig::load(path.to_str().unwrap()).unwrap_err();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(err.kind, persist_hooks::ErrorKind::Configuration);
}

#[test]
fn test_init_logging_installs_once() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: "json".to_string(),
    };
    let _ = persist_hooks::init_logging(&config);
    assert!(persist_hooks::init_logging(&config).is_err());
}

#[tokio::test]
async fn test_dispatch_settings_do_not_change_outcome() {
    for dispatch in [
        DispatchConfig::default(),
        DispatchConfig {
            short_circuit_empty: false,
            trace_hooks: true,
        },
    ] {
        let log = CallLog::new();
        let mut registry = HookRegistry::new();
        registry.register(
            helpers::logging_pre_hook("touch", PersistenceState::MODIFIED, log.clone()),
            None,
        );

        let mut session = MemorySession::new();
        helpers::track(&mut session, Article::titled("A"), PersistenceState::MODIFIED);
        helpers::track(&mut session, Article::titled("B"), PersistenceState::ADDED);

        let affected = HookDispatcher::with_config(Arc::new(registry), dispatch)
            .save_changes(&mut session)
            .await
            .unwrap();

        assert_eq!(affected, 2);
        assert_eq!(log.entries(), vec!["touch"]);
    }
}
