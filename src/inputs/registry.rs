//! Input component registry

use std::sync::Arc;

use super::components::install_builtins;
use super::InputComponent;
use crate::errors::{FormError, FormResult};
use crate::observability::Event;
use crate::registry::{Registry, RegistrySnapshot};

/// Maps element identifiers and aliases to input components.
///
/// `new()` installs the built-in set and captures it as the `reset()`
/// target. Registering an existing identifier or alias replaces it.
#[derive(Debug, Clone)]
pub struct InputRegistry {
    inner: Registry<dyn InputComponent>,
}

impl Default for InputRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InputRegistry {
    /// Registry with the built-in components installed.
    pub fn new() -> Self {
        let mut inner = Registry::empty();
        install_builtins(&mut inner);
        inner.seal_defaults();
        Self { inner }
    }

    /// Registry with nothing installed.
    pub fn empty() -> Self {
        Self {
            inner: Registry::empty(),
        }
    }

    pub fn register<I, S, C>(&mut self, id: &str, aliases: I, component: C)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        C: InputComponent + 'static,
    {
        self.register_arc(id, aliases, Arc::new(component));
    }

    pub fn register_arc<I, S>(&mut self, id: &str, aliases: I, component: Arc<dyn InputComponent>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let overrides = self.inner.contains(id);
        self.inner.register(id, aliases, component);
        tracing::debug!(
            event = %Event::InputRegistered,
            id,
            overrides,
            "input component registered"
        );
    }

    /// Component for an identifier or alias.
    pub fn lookup(&self, id: &str) -> FormResult<Arc<dyn InputComponent>> {
        self.inner
            .get(id)
            .ok_or_else(|| FormError::UnknownInputKind(id.to_string()))
    }

    /// Canonical identifier for an identifier or alias.
    pub fn resolve<'a>(&'a self, id: &'a str) -> Option<&'a str> {
        self.inner.resolve(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.contains(id)
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.inner.identifiers()
    }

    pub fn snapshot(&self) -> RegistrySnapshot<dyn InputComponent> {
        self.inner.snapshot()
    }

    pub fn restore(&mut self, snapshot: RegistrySnapshot<dyn InputComponent>) {
        self.inner.restore(snapshot);
    }

    /// Restores the built-in set, discarding every runtime registration.
    pub fn reset(&mut self) {
        self.inner.reset();
        tracing::debug!(event = %Event::InputRegistryReset, "input registry reset");
    }
}
