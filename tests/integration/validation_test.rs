//! Integration tests for validation-gated hooks.

use persist_hooks::{ErrorKind, HookRegistry, MemorySession, PersistenceState, PreEntityHook};

use super::helpers::{self, Article, CallLog};

fn gated_and_ungated(log: &CallLog) -> HookRegistry {
    let mut registry = HookRegistry::new();
    registry.register(
        helpers::logging_pre_hook("ungated", PersistenceState::ADDED, log.clone()),
        None,
    );
    registry.register(
        helpers::logging_pre_hook("gated", PersistenceState::ADDED, log.clone())
            .requiring_validation(),
        None,
    );
    registry
}

#[tokio::test]
async fn test_failing_validation_skips_gated_hooks() {
    let log = CallLog::new();

    let mut session = MemorySession::new().with_validator(helpers::titled_articles_only);
    helpers::track(&mut session, Article::default(), PersistenceState::ADDED);

    let err = helpers::dispatcher(gated_and_ungated(&log))
        .save_changes(&mut session)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(log.entries(), vec!["ungated"]);
    assert_eq!(session.commit_count(), 0);
}

#[tokio::test]
async fn test_passing_validation_runs_both_passes() {
    let log = CallLog::new();

    let mut session = MemorySession::new().with_validator(helpers::titled_articles_only);
    helpers::track(&mut session, Article::titled("Valid"), PersistenceState::ADDED);

    let affected = helpers::dispatcher(gated_and_ungated(&log))
        .save_changes(&mut session)
        .await
        .unwrap();

    assert_eq!(affected, 1);
    assert_eq!(log.entries(), vec!["ungated", "gated"]);
}

#[tokio::test]
async fn test_disabled_validation_never_gates() {
    let log = CallLog::new();

    let mut session = MemorySession::new()
        .with_validation(false)
        .with_validator(helpers::titled_articles_only);
    helpers::track(&mut session, Article::default(), PersistenceState::ADDED);

    let affected = helpers::dispatcher(gated_and_ungated(&log))
        .save_changes(&mut session)
        .await
        .unwrap();

    assert_eq!(affected, 1);
    assert_eq!(log.entries(), vec!["ungated", "gated"]);
}

#[tokio::test]
async fn test_ungated_hook_repairs_data_before_validation() {
    let log = CallLog::new();

    let mut registry = gated_and_ungated(&log);
    registry.register(
        PreEntityHook::on_insert("default_title", |article: &mut Article, _| {
            if article.title.is_empty() {
                article.title = "Untitled".to_string();
            }
            Ok(())
        }),
        Some(0),
    );

    let mut session = MemorySession::new().with_validator(helpers::titled_articles_only);
    let handle = helpers::track(&mut session, Article::default(), PersistenceState::ADDED);

    let affected = helpers::dispatcher(registry)
        .save_changes(&mut session)
        .await
        .unwrap();

    assert_eq!(affected, 1);
    assert_eq!(helpers::read(&handle).await.title, "Untitled");
    assert_eq!(log.entries(), vec!["ungated", "gated"]);
}
