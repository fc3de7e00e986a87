//! Command registry.

use std::collections::HashMap;

use crate::command::CommandHandler;
use crate::error::RegistryError;
use crate::types::CommandDefinition;

/// Registry of commands for lookup and definition export.
///
/// Populated once at startup and read-only afterwards.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a command.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name or when the command's options type cannot
    /// be carried in a state token.
    pub fn register<C: CommandHandler + 'static>(&mut self, command: C) -> Result<(), RegistryError> {
        let name = command.name().to_string();
        if self.commands.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        command
            .check_schema()
            .map_err(|source| RegistryError::Schema {
                command: name.clone(),
                source,
            })?;
        tracing::debug!(command = %name, "registered command");
        self.commands.insert(name, Box::new(command));
        Ok(())
    }

    /// Get a command by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn CommandHandler> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Export all definitions for registration, sorted by name.
    #[must_use]
    pub fn definitions(&self) -> Vec<CommandDefinition> {
        let mut defs: Vec<_> = self
            .commands
            .values()
            .map(|c| c.definition().clone())
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.commands.keys().collect();
        names.sort();
        f.debug_struct("CommandRegistry")
            .field("commands", &names)
            .finish()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
