//! Shared test helpers for integration tests.

use std::sync::{Arc, Mutex};

use persist_hooks::{
    AppResult, Entity, EntityRef, HookDispatcher, HookMetadata, HookRegistry, MemorySession,
    PersistenceSession, PersistenceState, PreEntityHook, SessionId, SessionView, TrackedEntry,
    entity_ref,
};

/// Blog article entity used across the tests.
#[derive(Debug, Default, Clone)]
pub struct Article {
    /// Headline. Empty headlines fail validation.
    pub title: String,
    /// Soft-delete marker.
    pub is_deleted: bool,
    /// Slug derived from the title by a pre-action hook.
    pub slug: Option<String>,
}

impl Article {
    /// Create an article with the given title.
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }
}

/// Comment entity; a second type for type-filtering checks.
#[derive(Debug, Default)]
pub struct Comment {
    /// Comment body.
    pub body: String,
}

/// Shared, ordered record of hook activity.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    /// Snapshot of all entries in insertion order.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// A pre-action hook on articles that appends `label` to `log`.
pub fn logging_pre_hook(
    label: &'static str,
    states: PersistenceState,
    log: CallLog,
) -> PreEntityHook<
    Article,
    impl Fn(&mut Article, &mut HookMetadata<'_>) -> AppResult<()> + Send + Sync + 'static,
> {
    PreEntityHook::new(label, states, move |_: &mut Article, _: &mut HookMetadata<'_>| {
        log.push(label);
        Ok(())
    })
}

/// Validator rejecting articles with an empty title.
pub fn titled_articles_only(entity: &dyn Entity) -> bool {
    entity
        .downcast_ref::<Article>()
        .is_none_or(|article| !article.title.is_empty())
}

/// Track a new article in `session` and return its handle.
pub fn track(session: &mut MemorySession, article: Article, state: PersistenceState) -> EntityRef {
    let handle = entity_ref(article);
    session.track(Arc::clone(&handle), state);
    handle
}

/// Read a clone of the article behind `handle`.
pub async fn read(handle: &EntityRef) -> Article {
    let guard = handle.lock().await;
    let entity: &dyn Entity = &*guard;
    entity
        .downcast_ref::<Article>()
        .cloned()
        .expect("handle should hold an article")
}

/// Build a dispatcher over `registry` with default settings.
pub fn dispatcher(registry: HookRegistry) -> HookDispatcher {
    HookDispatcher::new(Arc::new(registry))
}

/// Session wrapper that records its commit calls into a [`CallLog`].
#[derive(Debug)]
pub struct RecordingSession {
    /// Wrapped session.
    pub inner: MemorySession,
    /// Receives a `"commit"` entry per commit attempt.
    pub log: CallLog,
}

impl SessionView for RecordingSession {
    fn session_id(&self) -> SessionId {
        self.inner.session_id()
    }

    fn changed_entries(&self) -> Vec<TrackedEntry> {
        self.inner.changed_entries()
    }

    fn is_validation_enabled(&self) -> bool {
        self.inner.is_validation_enabled()
    }
}

#[async_trait::async_trait]
impl PersistenceSession for RecordingSession {
    async fn has_validation_errors(&self) -> bool {
        self.inner.has_validation_errors().await
    }

    fn set_entry_state(&mut self, entity: &EntityRef, state: PersistenceState) -> AppResult<()> {
        self.inner.set_entry_state(entity, state)
    }

    async fn commit(&mut self) -> AppResult<u64> {
        self.log.push("commit");
        self.inner.commit().await
    }
}
