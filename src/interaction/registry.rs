//! Name -> definition registry.

use super::definition::InteractionDefinition;
use std::collections::HashMap;
use std::sync::Arc;

/// Registered interactions keyed by name.
///
/// Definitions are shared (`Arc`) so the handler can call into one without
/// holding its state lock.
pub struct InteractionRegistry<E, B = ()> {
    definitions: HashMap<String, Arc<InteractionDefinition<E, B>>>,
}

impl<E, B> Default for InteractionRegistry<E, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, B> InteractionRegistry<E, B> {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Register `definition` under `name`, returning the one it replaced.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        definition: InteractionDefinition<E, B>,
    ) -> Option<Arc<InteractionDefinition<E, B>>> {
        self.definitions.insert(name.into(), Arc::new(definition))
    }

    /// Remove `name` unconditionally. Callers that care about the active
    /// interaction go through `InteractionHandler::remove_interaction`.
    pub fn remove(&mut self, name: &str) -> Option<Arc<InteractionDefinition<E, B>>> {
        self.definitions.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<InteractionDefinition<E, B>>> {
        self.definitions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
