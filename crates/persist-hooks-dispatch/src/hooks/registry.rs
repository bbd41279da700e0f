//! Hook registry. Hooks are registered during setup with an optional order.

use tracing::info;

use super::definitions::{Hook, HookCapability};

/// A hook paired with its optional explicit order.
#[derive(Debug, Clone)]
pub struct HookRegistration {
    /// The hook.
    hook: Hook,
    /// Explicit order (lower = earlier). `None` runs after every ordered hook.
    order: Option<i32>,
}

impl HookRegistration {
    /// Returns the hook.
    pub fn hook(&self) -> &Hook {
        &self.hook
    }

    /// Returns the explicit order, if any.
    pub fn order(&self) -> Option<i32> {
        self.order
    }

    /// Returns the hook's capability.
    pub fn capability(&self) -> HookCapability {
        self.hook.capability()
    }
}

/// Registry of hooks in registration order.
///
/// Built during application setup and then shared, immutable, with the
/// dispatcher. Registering the same hook twice yields two independent
/// registrations.
#[derive(Debug, Default)]
pub struct HookRegistry {
    registrations: Vec<HookRegistration>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from an initial list of unordered hooks.
    pub fn with_hooks(hooks: impl IntoIterator<Item = Hook>) -> Self {
        let mut registry = Self::new();
        for hook in hooks {
            registry.register(hook, None);
        }
        registry
    }

    /// Registers a hook. Never fails.
    pub fn register(&mut self, hook: impl Into<Hook>, order: Option<i32>) -> &mut Self {
        let hook = hook.into();

        info!(
            hook = %hook.name(),
            capability = %hook.capability(),
            order = ?order,
            "Hook registered"
        );

        self.registrations.push(HookRegistration { hook, order });
        self
    }

    /// Returns registrations with the given capability, in registration order.
    pub fn all_with_capability(&self, capability: HookCapability) -> Vec<&HookRegistration> {
        self.registrations
            .iter()
            .filter(|r| r.capability() == capability)
            .collect()
    }

    /// Returns whether any hook with the given capability is registered.
    pub fn has_capability(&self, capability: HookCapability) -> bool {
        self.registrations
            .iter()
            .any(|r| r.capability() == capability)
    }

    /// Returns all registrations in registration order.
    pub fn registrations(&self) -> &[HookRegistration] {
        &self.registrations
    }

    /// Returns the number of registrations.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl From<Vec<Hook>> for HookRegistry {
    fn from(hooks: Vec<Hook>) -> Self {
        Self::with_hooks(hooks)
    }
}
