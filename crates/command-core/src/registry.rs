//! Registry of available commands.

use crate::error::RegistryError;
use crate::types::CommandDescriptor;
use std::collections::{BTreeMap, BTreeSet};

/// Registry of commands keyed by lowercase name.
///
/// Filled during startup, then shared behind an `Arc` for dispatch.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandDescriptor>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// Register a command. Rejects a name that is already taken.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        let name = descriptor.name().to_string();
        if self.commands.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.commands.insert(name, descriptor);
        Ok(())
    }

    /// Register several commands, stopping at the first conflict.
    pub fn register_all(
        &mut self,
        descriptors: impl IntoIterator<Item = CommandDescriptor>,
    ) -> Result<(), RegistryError> {
        descriptors.into_iter().try_for_each(|d| self.register(d))
    }

    /// Look up a command by name (case-insensitive).
    pub fn lookup(&self, name: &str) -> Result<&CommandDescriptor, RegistryError> {
        let key = name.trim().to_lowercase();
        self.commands
            .get(&key)
            .ok_or(RegistryError::NotFound(key))
    }

    /// Commands in a category, ordered by name.
    pub fn list_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a CommandDescriptor> + Clone + 'a {
        self.commands
            .values()
            .filter(move |d| d.category.eq_ignore_ascii_case(category))
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.commands
            .values()
            .map(|d| d.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
