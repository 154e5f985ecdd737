//! Identifier-keyed capability registry
//!
//! Shared core of the input component and layout renderer registries:
//! identifiers map to capabilities, aliases map to identifiers, and the
//! set installed at construction is captured as a snapshot so that
//! `reset()` restores it exactly.
//!
//! Registries are plain values owned by the engine that uses them. Hosts
//! that want process-wide registration wrap one in their own
//! synchronization; lookups need no locking once registration settles.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Captured registry contents
pub struct RegistrySnapshot<C: ?Sized> {
    entries: HashMap<String, Arc<C>>,
    aliases: HashMap<String, String>,
}

impl<C: ?Sized> Clone for RegistrySnapshot<C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            aliases: self.aliases.clone(),
        }
    }
}

impl<C: ?Sized> fmt::Debug for RegistrySnapshot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.entries.keys().collect();
        ids.sort();
        f.debug_struct("RegistrySnapshot")
            .field("entries", &ids)
            .field("aliases", &self.aliases.len())
            .finish()
    }
}

/// Mapping from identifier (or alias) to capability
pub struct Registry<C: ?Sized> {
    current: RegistrySnapshot<C>,
    defaults: Arc<RegistrySnapshot<C>>,
}

impl<C: ?Sized> Clone for Registry<C> {
    fn clone(&self) -> Self {
        Self {
            current: self.current.clone(),
            defaults: Arc::clone(&self.defaults),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("current", &self.current)
            .finish()
    }
}

impl<C: ?Sized> Default for Registry<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C: ?Sized> Registry<C> {
    /// A registry with nothing installed; `reset()` returns to empty.
    pub fn empty() -> Self {
        let current = RegistrySnapshot {
            entries: HashMap::new(),
            aliases: HashMap::new(),
        };
        Self {
            defaults: Arc::new(current.clone()),
            current,
        }
    }

    /// Captures the current contents as the `reset()` target.
    pub fn seal_defaults(&mut self) {
        self.defaults = Arc::new(self.current.clone());
    }

    /// Inserts or overwrites. Last registration wins for both the
    /// identifier and every alias.
    pub fn register<I, S>(&mut self, id: &str, aliases: I, capability: Arc<C>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current.aliases.remove(id);
        self.current.entries.insert(id.to_string(), capability);
        for alias in aliases {
            let alias = alias.into();
            if alias != id {
                self.current.aliases.insert(alias, id.to_string());
            }
        }
    }

    /// Canonical identifier for an identifier or alias.
    pub fn resolve<'a>(&'a self, id_or_alias: &'a str) -> Option<&'a str> {
        if self.current.entries.contains_key(id_or_alias) {
            return Some(id_or_alias);
        }
        self.current
            .aliases
            .get(id_or_alias)
            .filter(|id| self.current.entries.contains_key(id.as_str()))
            .map(String::as_str)
    }

    pub fn get(&self, id_or_alias: &str) -> Option<Arc<C>> {
        self.resolve(id_or_alias)
            .and_then(|id| self.current.entries.get(id))
            .cloned()
    }

    pub fn contains(&self, id_or_alias: &str) -> bool {
        self.resolve(id_or_alias).is_some()
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.current.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn snapshot(&self) -> RegistrySnapshot<C> {
        self.current.clone()
    }

    pub fn restore(&mut self, snapshot: RegistrySnapshot<C>) {
        self.current = snapshot;
    }

    /// Restores the defaults captured at construction.
    pub fn reset(&mut self) {
        self.current = (*self.defaults).clone();
    }
}
