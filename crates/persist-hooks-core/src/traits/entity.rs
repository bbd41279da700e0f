//! Opaque entity handles.
//!
//! The dispatcher never looks inside an entity. It only locks the shared
//! handle and passes `&mut dyn Entity` to hooks, which downcast to the
//! concrete type they care about.
//!
//! Reborrow a lock guard as `&mut dyn Entity` before calling trait methods on
//! it; the blanket impl would otherwise resolve them on the guard itself.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

/// An entity tracked by a persistence session.
///
/// Implemented for every `'static` type that is `Send + Sync + Debug`.
pub trait Entity: Any + Send + Sync + fmt::Debug + 'static {
    /// Type name used in log fields.
    fn entity_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete entity type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete entity type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> Entity for T
where
    T: Any + Send + Sync + fmt::Debug,
{
    fn entity_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn Entity {
    /// Type name of the concrete entity.
    pub fn type_name(&self) -> &'static str {
        self.entity_name()
    }

    /// Returns `true` if the entity is of type `T`.
    pub fn is<T: Entity>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to a shared reference of the concrete type.
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts to a mutable reference of the concrete type.
    pub fn downcast_mut<T: Entity>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Shared handle to an entity, owned by the change tracker.
pub type EntityRef = Arc<Mutex<dyn Entity>>;

/// Wraps a concrete entity into an [`EntityRef`].
pub fn entity_ref<T: Entity>(entity: T) -> EntityRef {
    Arc::new(Mutex::new(entity))
}
