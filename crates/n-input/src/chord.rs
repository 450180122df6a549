// SPDX-License-Identifier: MIT
//
// Shortcut chords.
//
// A chord is one key plus a set of modifiers, written the way web
// shortcut libraries write them: `ctrl+b`, `command+shift+x`,
// `alt+shift+f5`, `shift+tab`. Parsing is case-insensitive and accepts the
// usual aliases (`cmd`/`meta`/`super` for the command key, `control`,
// `option`, `return`, `esc`, `del`, ...).
//
// Cross-platform shortcuts are expressed as several chords bound to the
// same command. [`meta_combination`] builds the common pair
// `command+<keys>` / `ctrl+<keys>`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::key::{KeyCode, KeyEvent, MODIFIER_NAMES, Modifiers};

/// Why a shortcut string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    /// The string was empty or contained an empty segment (`"ctrl++"`).
    #[error("empty shortcut segment in {0:?}")]
    Empty(String),
    /// A segment names no known key or modifier.
    #[error("unknown key {key:?} in shortcut {chord:?}")]
    UnknownKey { chord: String, key: String },
    /// The chord only lists modifiers.
    #[error("shortcut {0:?} has no key, only modifiers")]
    MissingKey(String),
    /// More than one non-modifier key in a single chord.
    #[error("shortcut {0:?} names more than one key")]
    DuplicateKey(String),
}

/// A key plus modifiers that fires a bound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    /// The key, case-folded.
    pub code: KeyCode,
    /// Required modifiers, normalized to [`Modifiers::MATCHED`].
    pub modifiers: Modifiers,
}

impl Chord {
    /// Build a chord directly.
    #[must_use]
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            code: code.folded(),
            modifiers: modifiers.normalized(),
        }
    }

    /// A chord with no modifiers.
    #[must_use]
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// Does this key event fire the chord?
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.is(self.code, self.modifiers)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in MODIFIER_NAMES {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", self.code)
    }
}

impl FromStr for Chord {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chord = s.trim();
        if chord.is_empty() {
            return Err(ChordError::Empty(s.to_owned()));
        }

        let mut modifiers = Modifiers::empty();
        let mut code = None;

        for segment in chord.split('+') {
            let segment = segment.trim().to_lowercase();
            if segment.is_empty() {
                return Err(ChordError::Empty(s.to_owned()));
            }
            if let Some(flag) = parse_modifier(&segment) {
                modifiers |= flag;
                continue;
            }
            let Some(key) = parse_key(&segment) else {
                return Err(ChordError::UnknownKey {
                    chord: s.to_owned(),
                    key: segment,
                });
            };
            if code.replace(key).is_some() {
                return Err(ChordError::DuplicateKey(s.to_owned()));
            }
        }

        code.map(|code| Self::new(code, modifiers))
            .ok_or_else(|| ChordError::MissingKey(s.to_owned()))
    }
}

/// Parse several shortcut strings at once, failing on the first bad one.
///
/// # Errors
///
/// Returns the [`ChordError`] of the first string that does not parse.
pub fn parse_chords<I, S>(shortcuts: I) -> Result<Vec<Chord>, ChordError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    shortcuts.into_iter().map(|s| s.as_ref().parse()).collect()
}

/// `command+<keys>` and `ctrl+<keys>`: the same shortcut on macOS and
/// everywhere else.
#[must_use]
pub fn meta_combination(keys: &[&str]) -> Vec<String> {
    let joined = keys.join("+");
    vec![format!("command+{joined}"), format!("ctrl+{joined}")]
}

fn parse_modifier(name: &str) -> Option<Modifiers> {
    match name {
        "shift" => Some(Modifiers::SHIFT),
        "alt" | "option" => Some(Modifiers::ALT),
        "ctrl" | "control" | "mod" => Some(Modifiers::CTRL),
        "command" | "cmd" | "meta" | "super" => Some(Modifiers::SUPER),
        _ => None,
    }
}

fn parse_key(name: &str) -> Option<KeyCode> {
    let code = match name {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "esc" | "escape" => KeyCode::Escape,
        "del" | "delete" => KeyCode::Delete,
        "ins" | "insert" => KeyCode::Insert,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        "plus" => KeyCode::Char('+'),
        _ => return parse_function_key(name).or_else(|| single_char(name)),
    };
    Some(code)
}

fn parse_function_key(name: &str) -> Option<KeyCode> {
    let n: u8 = name.strip_prefix('f')?.parse().ok()?;
    (1..=35).contains(&n).then_some(KeyCode::F(n))
}

fn single_char(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    let ch = chars.next()?;
    chars.next().is_none().then_some(KeyCode::Char(ch))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
