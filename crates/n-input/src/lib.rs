// SPDX-License-Identifier: MIT
//
// n-input — keyboard events and shortcut chords for n-mark.
//
// The markdown layer never talks to a real widget toolkit. Hosts translate
// their own key and paste events into the types here, and shortcut tables
// are written as plain strings (`"ctrl+b"`, `"command+shift+x"`) that parse
// into [`Chord`]s.

pub mod chord;
pub mod key;

pub use chord::{Chord, ChordError, meta_combination, parse_chords};
pub use key::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
