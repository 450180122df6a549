//! The built-in command table.
//!
//! Names are a stable contract: hosts bind buttons and shortcut overrides
//! to them. Order matters only for shortcut binding.

use n_input::{Chord, KeyCode, Modifiers};

use crate::command::{CommandDescriptor, handler};
use crate::handlers;

/// Built-in command names, in table order.
pub const BUILT_IN_NAMES: [&str; 21] = [
    "bold",
    "italic",
    "strike-through",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "unordered-list",
    "ordered-list",
    "next-line",
    "indent",
    "outdent",
    "code-block",
    "code-inline",
    "code",
    "link",
    "image",
    "block-quotes",
    "link-paste",
];

/// Is `name` one of the built-ins?
#[must_use]
pub fn is_built_in(name: &str) -> bool {
    BUILT_IN_NAMES.contains(&name)
}

/// `command+<key>` and `ctrl+<key>` with extra modifiers.
fn meta_chords(key: char, extra: Modifiers) -> Vec<Chord> {
    [Modifiers::SUPER, Modifiers::CTRL]
        .into_iter()
        .map(|meta| Chord::new(KeyCode::Char(key), meta | extra))
        .collect()
}

/// A fresh copy of the built-in table.
#[must_use]
pub fn built_in_commands() -> Vec<CommandDescriptor> {
    let mut strike = meta_chords('x', Modifiers::SHIFT);
    strike.push(Chord::new(KeyCode::F(5), Modifiers::ALT | Modifiers::SHIFT));

    let mut commands = vec![
        CommandDescriptor::new("bold", handler(handlers::bold))
            .with_shortcut(meta_chords('b', Modifiers::empty())),
        CommandDescriptor::new("italic", handler(handlers::italic))
            .with_shortcut(meta_chords('i', Modifiers::empty())),
        CommandDescriptor::new("strike-through", handler(handlers::strike_through))
            .with_shortcut(strike),
    ];
    for level in 1..=6u8 {
        commands.push(CommandDescriptor::new(
            format!("h{level}"),
            handler(move |ctx| handlers::headline(ctx, level)),
        ));
    }
    commands.extend([
        CommandDescriptor::new("unordered-list", handler(handlers::unordered_list)),
        CommandDescriptor::new("ordered-list", handler(handlers::ordered_list)),
        // Enter and Tab reach these through extensions, so no shortcuts.
        CommandDescriptor::new("next-line", handler(handlers::next_line)),
        CommandDescriptor::new("indent", handler(handlers::indent)),
        CommandDescriptor::new("outdent", handler(handlers::outdent)),
        CommandDescriptor::new("code-block", handler(handlers::code_block)),
        CommandDescriptor::new("code-inline", handler(handlers::code_inline)),
        CommandDescriptor::new("code", handler(handlers::code)),
        CommandDescriptor::new("link", handler(handlers::link)),
        CommandDescriptor::new("image", handler(handlers::image)),
        CommandDescriptor::new("block-quotes", handler(handlers::block_quotes)),
        CommandDescriptor::new("link-paste", handler(handlers::link_paste)),
    ]);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_matches_names() {
        let names: Vec<String> = built_in_commands().into_iter().map(|c| c.name).collect();
        assert_eq!(names, BUILT_IN_NAMES.map(str::to_owned).to_vec());
    }

    #[test]
    fn default_shortcuts() {
        let table = built_in_commands();
        let shortcut = |name: &str| -> Vec<String> {
            table
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.shortcut.iter().map(ToString::to_string).collect())
                .unwrap_or_default()
        };
        assert_eq!(shortcut("bold"), vec!["command+b", "ctrl+b"]);
        assert_eq!(shortcut("italic"), vec!["command+i", "ctrl+i"]);
        assert_eq!(
            shortcut("strike-through"),
            vec!["command+shift+x", "ctrl+shift+x", "alt+shift+f5"]
        );
        assert!(shortcut("h1").is_empty());
        assert!(shortcut("next-line").is_empty());
        assert!(shortcut("indent").is_empty());
    }

    #[test]
    fn nothing_disabled_by_default() {
        assert!(built_in_commands().iter().all(CommandDescriptor::is_enabled));
    }

    #[test]
    fn built_in_names() {
        assert!(is_built_in("h6"));
        assert!(is_built_in("link-paste"));
        assert!(is_built_in("outdent"));
        assert!(!is_built_in("mention"));
    }
}
