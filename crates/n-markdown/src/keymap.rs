//! Keymap — shortcut chords bound to command names.
//!
//! Built from the registry at bootstrap: every chord of every descriptor
//! binds to that descriptor's name. Binding a chord twice keeps the later
//! binding, matching table order. Torn down (cleared) when the editor is
//! reconfigured or disposed.

use std::collections::HashMap;

use n_input::{Chord, KeyEvent};

use crate::registry::Registry;

/// What a chord fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub command: String,
    /// Suppress the host's default key behavior.
    pub prevent_default: bool,
}

/// Chord → command lookup.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: HashMap<Chord, Binding>,
}

impl Keymap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every shortcut of every command in `registry`.
    #[must_use]
    pub fn from_registry(registry: &Registry) -> Self {
        let mut keymap = Self::new();
        for command in registry.iter() {
            for chord in &command.shortcut {
                keymap.bind(*chord, &command.name, command.shortcut_prevent_default);
            }
        }
        keymap
    }

    /// Bind `chord`, replacing any earlier binding.
    pub fn bind(&mut self, chord: Chord, command: &str, prevent_default: bool) {
        self.bindings.insert(
            chord,
            Binding {
                command: command.to_owned(),
                prevent_default,
            },
        );
    }

    pub fn unbind(&mut self, chord: &Chord) -> Option<Binding> {
        self.bindings.remove(chord)
    }

    /// The binding a key event fires, if any. Releases fire nothing.
    #[must_use]
    pub fn lookup(&self, event: &KeyEvent) -> Option<&Binding> {
        if !event.is_press() {
            return None;
        }
        self.bindings.get(&Chord::new(event.code, event.modifiers))
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandSpec, Outcome};
    use n_input::{KeyCode, KeyEventKind, Modifiers};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode, modifiers: Modifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn built_in_shortcuts_are_bound() {
        let keymap = Keymap::from_registry(&Registry::build(Vec::new()).unwrap());
        let bold = keymap.lookup(&key(KeyCode::Char('b'), Modifiers::CTRL)).unwrap();
        assert_eq!(bold.command, "bold");
        assert!(!bold.prevent_default);
        let strike = keymap
            .lookup(&key(KeyCode::F(5), Modifiers::ALT | Modifiers::SHIFT))
            .unwrap();
        assert_eq!(strike.command, "strike-through");
        // 2 bold + 2 italic + 3 strike-through.
        assert_eq!(keymap.len(), 7);
    }

    #[test]
    fn shifted_letters_match() {
        let keymap = Keymap::from_registry(&Registry::build(Vec::new()).unwrap());
        let ev = key(KeyCode::Char('X'), Modifiers::SUPER | Modifiers::SHIFT);
        assert_eq!(keymap.lookup(&ev).unwrap().command, "strike-through");
    }

    #[test]
    fn releases_and_unbound_keys_miss() {
        let keymap = Keymap::from_registry(&Registry::build(Vec::new()).unwrap());
        let mut ev = key(KeyCode::Char('b'), Modifiers::CTRL);
        ev.kind = KeyEventKind::Release;
        assert!(keymap.lookup(&ev).is_none());
        assert!(keymap.lookup(&key(KeyCode::Char('q'), Modifiers::CTRL)).is_none());
    }

    #[test]
    fn later_command_takes_the_chord() {
        let registry = Registry::build(vec![
            CommandSpec::new("mine")
                .handler(|_| Outcome::Done)
                .shortcut(["ctrl+b"])
                .prevent_default(true),
        ])
        .unwrap();
        let keymap = Keymap::from_registry(&registry);
        let hit = keymap.lookup(&key(KeyCode::Char('b'), Modifiers::CTRL)).unwrap();
        assert_eq!(hit.command, "mine");
        assert!(hit.prevent_default);
    }

    #[test]
    fn clear_and_unbind() {
        let mut keymap = Keymap::from_registry(&Registry::build(Vec::new()).unwrap());
        let chord: Chord = "command+b".parse().unwrap();
        assert!(keymap.unbind(&chord).is_some());
        assert!(keymap.lookup(&key(KeyCode::Char('b'), Modifiers::SUPER)).is_none());
        keymap.clear();
        assert!(keymap.is_empty());
    }
}
