use std::collections::HashMap;
use std::sync::Arc;

use crate::component::descriptor::{ComponentDescriptor, ViewDescriptor};

/// Name -> component descriptor table, cheap to clone and shared by both actors.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    by_name: Arc<HashMap<String, Arc<dyn ComponentDescriptor>>>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .finish()
    }
}

impl ComponentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `View` and `RootView` components.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register(ViewDescriptor::new("View"));
        reg.register(ViewDescriptor::new("RootView"));
        reg
    }

    /// Add or replace a component under its own name.
    pub fn register(&mut self, descriptor: impl ComponentDescriptor + 'static) {
        self.register_arc(Arc::new(descriptor));
    }

    /// Add or replace an already shared component.
    pub fn register_arc(&mut self, descriptor: Arc<dyn ComponentDescriptor>) {
        let name = descriptor.name().to_owned();
        if Arc::make_mut(&mut self.by_name)
            .insert(name.clone(), descriptor)
            .is_some()
        {
            tracing::debug!(component = %name, "component re-registered");
        }
    }

    /// Look up a component.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ComponentDescriptor>> {
        self.by_name.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether no component is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/component/registry.rs"]
mod tests;
