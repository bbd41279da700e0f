//! Closure-backed hooks bound to one entity type.
//!
//! Most hooks target a single entity type in a single state, e.g. "stamp
//! `created_at` on every inserted `Invoice`". These adapters downcast the
//! opaque entity to `E` and skip entities of any other type.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use persist_hooks_core::error::AppError;
use persist_hooks_core::result::AppResult;
use persist_hooks_core::traits::Entity;
use persist_hooks_core::types::PersistenceState;

use crate::hooks::definitions::{
    DispatchContext, ExceptionHook, Hook, HookMetadata, PostActionHook, PreActionHook,
};

/// A pre-action hook for entities of type `E`.
pub struct PreEntityHook<E, F> {
    name: String,
    states: PersistenceState,
    requires_validation: bool,
    handler: F,
    _entity: PhantomData<fn() -> E>,
}

impl<E, F> PreEntityHook<E, F>
where
    E: Entity,
    F: Fn(&mut E, &mut HookMetadata<'_>) -> AppResult<()> + Send + Sync + 'static,
{
    /// Creates a hook for `E` entities in any of `states`.
    ///
    /// Runs before validation unless [`requiring_validation`](Self::requiring_validation)
    /// is applied.
    pub fn new(name: impl Into<String>, states: PersistenceState, handler: F) -> Self {
        Self {
            name: name.into(),
            states,
            requires_validation: false,
            handler,
            _entity: PhantomData,
        }
    }

    /// Creates a hook for inserted `E` entities.
    pub fn on_insert(name: impl Into<String>, handler: F) -> Self {
        Self::new(name, PersistenceState::ADDED, handler)
    }

    /// Creates a hook for updated `E` entities.
    pub fn on_update(name: impl Into<String>, handler: F) -> Self {
        Self::new(name, PersistenceState::MODIFIED, handler)
    }

    /// Creates a hook for deleted `E` entities.
    pub fn on_delete(name: impl Into<String>, handler: F) -> Self {
        Self::new(name, PersistenceState::DELETED, handler)
    }

    /// Moves the hook to the validation-gated pass.
    pub fn requiring_validation(mut self) -> Self {
        self.requires_validation = true;
        self
    }
}

impl<E, F> fmt::Debug for PreEntityHook<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreEntityHook")
            .field("name", &self.name)
            .field("states", &self.states)
            .field("requires_validation", &self.requires_validation)
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}

#[async_trait]
impl<E, F> PreActionHook for PreEntityHook<E, F>
where
    E: Entity,
    F: Fn(&mut E, &mut HookMetadata<'_>) -> AppResult<()> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn interest_states(&self) -> PersistenceState {
        self.states
    }

    fn requires_validation(&self) -> bool {
        self.requires_validation
    }

    async fn hook(
        &self,
        entity: &mut dyn Entity,
        metadata: &mut HookMetadata<'_>,
    ) -> AppResult<()> {
        match entity.downcast_mut::<E>() {
            Some(entity) => (self.handler)(entity, metadata),
            None => Ok(()),
        }
    }
}

impl<E, F> From<PreEntityHook<E, F>> for Hook
where
    E: Entity,
    F: Fn(&mut E, &mut HookMetadata<'_>) -> AppResult<()> + Send + Sync + 'static,
{
    fn from(hook: PreEntityHook<E, F>) -> Self {
        Hook::PreAction(Arc::new(hook))
    }
}

/// A post-action hook for entities of type `E`.
pub struct PostEntityHook<E, F> {
    name: String,
    states: PersistenceState,
    handler: F,
    _entity: PhantomData<fn() -> E>,
}

impl<E, F> PostEntityHook<E, F>
where
    E: Entity,
    F: Fn(&mut E, &mut HookMetadata<'_>) -> AppResult<()> + Send + Sync + 'static,
{
    /// Creates a hook for `E` entities in any of `states`.
    pub fn new(name: impl Into<String>, states: PersistenceState, handler: F) -> Self {
        Self {
            name: name.into(),
            states,
            handler,
            _entity: PhantomData,
        }
    }

    /// Creates a hook for inserted `E` entities.
    pub fn on_insert(name: impl Into<String>, handler: F) -> Self {
        Self::new(name, PersistenceState::ADDED, handler)
    }

    /// Creates a hook for updated `E` entities.
    pub fn on_update(name: impl Into<String>, handler: F) -> Self {
        Self::new(name, PersistenceState::MODIFIED, handler)
    }

    /// Creates a hook for deleted `E` entities.
    pub fn on_delete(name: impl Into<String>, handler: F) -> Self {
        Self::new(name, PersistenceState::DELETED, handler)
    }
}

impl<E, F> fmt::Debug for PostEntityHook<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostEntityHook")
            .field("name", &self.name)
            .field("states", &self.states)
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}

#[async_trait]
impl<E, F> PostActionHook for PostEntityHook<E, F>
where
    E: Entity,
    F: Fn(&mut E, &mut HookMetadata<'_>) -> AppResult<()> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn interest_states(&self) -> PersistenceState {
        self.states
    }

    async fn hook(
        &self,
        entity: &mut dyn Entity,
        metadata: &mut HookMetadata<'_>,
    ) -> AppResult<()> {
        match entity.downcast_mut::<E>() {
            Some(entity) => (self.handler)(entity, metadata),
            None => Ok(()),
        }
    }
}

impl<E, F> From<PostEntityHook<E, F>> for Hook
where
    E: Entity,
    F: Fn(&mut E, &mut HookMetadata<'_>) -> AppResult<()> + Send + Sync + 'static,
{
    fn from(hook: PostEntityHook<E, F>) -> Self {
        Hook::PostAction(Arc::new(hook))
    }
}

/// A closure-based exception observer.
pub struct FnExceptionHook<F> {
    name: String,
    handler: F,
}

impl<F> FnExceptionHook<F>
where
    F: Fn(&AppError, &DispatchContext<'_>) -> AppResult<()> + Send + Sync + 'static,
{
    /// Creates a new exception observer.
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> fmt::Debug for FnExceptionHook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExceptionHook")
            .field("name", &self.name)
            .field("handler", &"<closure>")
            .finish()
    }
}

#[async_trait]
impl<F> ExceptionHook for FnExceptionHook<F>
where
    F: Fn(&AppError, &DispatchContext<'_>) -> AppResult<()> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_exception(
        &self,
        error: &AppError,
        context: &DispatchContext<'_>,
    ) -> AppResult<()> {
        (self.handler)(error, context)
    }
}

impl<F> From<FnExceptionHook<F>> for Hook
where
    F: Fn(&AppError, &DispatchContext<'_>) -> AppResult<()> + Send + Sync + 'static,
{
    fn from(hook: FnExceptionHook<F>) -> Self {
        Hook::ExceptionObserver(Arc::new(hook))
    }
}
