//! Command registry — the effective command table of one editor.
//!
//! Starts from the built-ins in their fixed order. Each host spec either
//! overrides a built-in in place (keeping its slot, and its handler unless
//! the override brings one) or is appended as a custom command. Lookups by
//! name return the last matching entry, so a later custom command shadows
//! an earlier one with the same name.

use n_input::parse_chords;
use tracing::debug;

use crate::builtin::{built_in_commands, is_built_in};
use crate::command::{BuiltInOverride, CommandDescriptor, CommandSource, CommandSpec};
use crate::error::{Error, Result};

/// Ordered command table.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: Vec<CommandDescriptor>,
}

impl Registry {
    /// Built-ins merged with `specs`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidShortcut`] for an unparsable shortcut string and
    /// [`Error::MissingHandler`] for a custom command without a handler.
    pub fn build(specs: Vec<CommandSpec>) -> Result<Self> {
        let mut registry = Self {
            commands: built_in_commands(),
        };
        for spec in specs {
            registry.merge(classify(spec)?);
        }
        Ok(registry)
    }

    /// Apply one classified spec.
    pub fn merge(&mut self, source: CommandSource) {
        match source {
            CommandSource::BuiltIn { name, overrides } => {
                match self.commands.iter_mut().find(|c| c.name == name) {
                    Some(slot) => {
                        debug!(command = %name, "overriding built-in");
                        overrides.apply_to(slot);
                    }
                    None => debug!(command = %name, "override for a missing built-in ignored"),
                }
            }
            CommandSource::Custom(descriptor) => {
                debug!(command = %descriptor.name, "adding custom command");
                self.commands.push(descriptor);
            }
        }
    }

    /// The last command named `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().rev().find(|c| c.name == name)
    }

    /// Commands in table order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Sort a spec into a built-in override or a custom command.
///
/// # Errors
///
/// See [`Registry::build`].
pub fn classify(spec: CommandSpec) -> Result<CommandSource> {
    let shortcut = spec
        .shortcut
        .map(|strings| {
            parse_chords(strings).map_err(|source| Error::InvalidShortcut {
                command: spec.name.clone(),
                source,
            })
        })
        .transpose()?;

    if is_built_in(&spec.name) {
        return Ok(CommandSource::BuiltIn {
            name: spec.name,
            overrides: BuiltInOverride {
                handler: spec.handler,
                shortcut,
                shortcut_prevent_default: spec.shortcut_prevent_default,
                enable: spec.enable,
            },
        });
    }

    let Some(handler) = spec.handler else {
        return Err(Error::MissingHandler(spec.name));
    };
    Ok(CommandSource::Custom(CommandDescriptor {
        name: spec.name,
        handler,
        shortcut: shortcut.unwrap_or_default(),
        shortcut_prevent_default: spec.shortcut_prevent_default.unwrap_or(false),
        enable: spec.enable,
    }))
}
