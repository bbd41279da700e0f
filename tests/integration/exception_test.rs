//! Integration tests for commit failures and exception observers.

use persist_hooks::{
    AppError, AppResult, DispatchContext, DispatchPhase, ErrorKind, FnExceptionHook,
    HookRegistry, MemorySession, PersistenceState, PostEntityHook, SessionView,
};

use super::helpers::{self, Article, CallLog};

fn observer(
    name: &'static str,
    log: CallLog,
) -> FnExceptionHook<
    impl Fn(&AppError, &DispatchContext<'_>) -> AppResult<()> + Send + Sync + 'static,
> {
    FnExceptionHook::new(name, move |error: &AppError, context: &DispatchContext<'_>| {
        assert_eq!(context.phase(), DispatchPhase::Failure);
        log.push(format!("{name}:{}", error.message));
        Ok(())
    })
}

#[tokio::test]
async fn test_observers_run_in_registration_order_then_error_reraised() {
    let log = CallLog::new();
    let post_log = log.clone();

    let mut registry = HookRegistry::new();
    registry.register(observer("metrics", log.clone()), Some(5));
    registry.register(observer("pager", log.clone()), Some(1));
    registry.register(
        PostEntityHook::on_insert("never", move |_: &mut Article, _| {
            post_log.push("post");
            Ok(())
        }),
        None,
    );

    let mut session = MemorySession::new();
    helpers::track(&mut session, Article::titled("Lost"), PersistenceState::ADDED);
    session.fail_next_commit("unique constraint violated");

    let err = helpers::dispatcher(registry)
        .save_changes(&mut session)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Commit);
    assert_eq!(err.message, "unique constraint violated");
    assert_eq!(
        log.entries(),
        vec![
            "metrics:unique constraint violated",
            "pager:unique constraint violated",
        ]
    );
    assert_eq!(session.commit_count(), 0);
}

#[tokio::test]
async fn test_commit_error_without_observers() {
    let mut session = MemorySession::new();
    helpers::track(&mut session, Article::titled("Lost"), PersistenceState::MODIFIED);
    session.fail_next_commit("timeout");

    let err = helpers::dispatcher(HookRegistry::new())
        .save_changes(&mut session)
        .await
        .unwrap_err();

    assert!(err.is_commit());
    assert_eq!(err.message, "timeout");
}

#[tokio::test]
async fn test_observers_see_session_identity() {
    let ids = CallLog::new();
    let seen = ids.clone();

    let mut registry = HookRegistry::new();
    registry.register(
        FnExceptionHook::new("capture", move |_: &AppError, context: &DispatchContext<'_>| {
            seen.push(context.session_id().to_string());
            seen.push(context.session().changed_entries().len().to_string());
            Ok(())
        }),
        None,
    );

    let mut session = MemorySession::new();
    helpers::track(&mut session, Article::titled("Lost"), PersistenceState::ADDED);
    session.fail_next_commit("io");
    let expected = session.session_id().to_string();

    helpers::dispatcher(registry)
        .save_changes(&mut session)
        .await
        .unwrap_err();

    assert_eq!(ids.entries(), vec![expected, "1".to_string()]);
}

#[tokio::test]
async fn test_failing_observer_masks_commit_error() {
    let log = CallLog::new();

    let mut registry = HookRegistry::new();
    registry.register(
        FnExceptionHook::new("broken", |_, _| Err(AppError::internal("alert sink offline"))),
        None,
    );
    registry.register(observer("after_broken", log.clone()), None);

    let mut session = MemorySession::new();
    helpers::track(&mut session, Article::titled("Lost"), PersistenceState::ADDED);
    session.fail_next_commit("deadlock detected");

    let err = helpers::dispatcher(registry)
        .save_changes(&mut session)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.message, "alert sink offline");
    assert!(log.entries().is_empty());
}
