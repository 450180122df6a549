// SPDX-License-Identifier: MIT
//
// Input event types.
//
// The host forwards keyboard and paste events from its text surface in
// this shape. Everything downstream (shortcut matching, extension hooks,
// the default behaviors of the in-memory text area) reads these types and
// nothing else, so a host only has to translate its own widget events
// once, at the boundary.
//
// Key identity is kept separate from modifiers: `Char('b')` with `CTRL`
// is Ctrl+B. Shifted letters may arrive either as `Char('B')` + `SHIFT`
// or `Char('b')` + `SHIFT` depending on the host; chord matching folds
// case so both forms behave the same.

use std::fmt;

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// An input event coming from the host text surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event (press, repeat, or release).
    Key(KeyEvent),
    /// Text pasted into the surface, as read from the paste event itself.
    Paste(String),
}

/// A keyboard event with key identity, modifiers, and press state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys (Shift, Alt, Ctrl, Super).
    pub modifiers: Modifiers,
    /// Press, repeat, or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A key press with the given modifiers.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }

    /// A key press without modifiers.
    #[must_use]
    pub const fn press(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// True for presses and auto-repeats. Releases never trigger anything.
    #[inline]
    #[must_use]
    pub const fn is_press(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }

    /// True when `code` is pressed with exactly the given modifiers
    /// (ignoring hyper/meta bits that hosts rarely report consistently).
    #[must_use]
    pub fn is(&self, code: KeyCode, modifiers: Modifiers) -> bool {
        self.is_press()
            && self.code.folded() == code.folded()
            && self.modifiers.normalized() == modifiers
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in MODIFIER_NAMES {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", self.code)
    }
}

/// Key press / repeat / release distinction.
///
/// Hosts that cannot tell the difference report everything as
/// [`Press`](KeyEventKind::Press).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventKind {
    /// Initial key press (or a host where state is unknown).
    #[default]
    Press,
    /// Key held down long enough to trigger auto-repeat.
    Repeat,
    /// Key released.
    Release,
}

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters use
/// [`Char`](KeyCode::Char). Function keys F1–F35 use [`F`](KeyCode::F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character (printable).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F35.
    F(u8),
}

impl KeyCode {
    /// Case-folded form used for comparisons: `Char('X')` and `Char('x')`
    /// name the same physical key.
    #[must_use]
    pub fn folded(self) -> Self {
        match self {
            Self::Char(ch) => Self::Char(ch.to_lowercase().next().unwrap_or(ch)),
            other => other,
        }
    }

    /// Canonical lowercase name, as written in shortcut strings.
    #[must_use]
    pub fn name(self) -> String {
        match self.folded() {
            Self::Char(' ') => "space".to_owned(),
            Self::Char('+') => "plus".to_owned(),
            Self::Char(ch) => ch.to_string(),
            Self::Enter => "enter".to_owned(),
            Self::Tab => "tab".to_owned(),
            Self::Backspace => "backspace".to_owned(),
            Self::Escape => "escape".to_owned(),
            Self::Delete => "delete".to_owned(),
            Self::Insert => "insert".to_owned(),
            Self::Up => "up".to_owned(),
            Self::Down => "down".to_owned(),
            Self::Left => "left".to_owned(),
            Self::Right => "right".to_owned(),
            Self::Home => "home".to_owned(),
            Self::End => "end".to_owned(),
            Self::PageUp => "pageup".to_owned(),
            Self::PageDown => "pagedown".to_owned(),
            Self::F(n) => format!("f{n}"),
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// `SUPER` is the platform "command" key (⌘ on macOS, ⊞ elsewhere).
    /// `HYPER` and `META` exist for hosts that report them but are
    /// ignored when matching shortcuts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
        const HYPER = 0b0001_0000;
        const META  = 0b0010_0000;
    }
}

impl Modifiers {
    /// The modifiers that take part in shortcut matching.
    pub const MATCHED: Self = Self::SHIFT
        .union(Self::ALT)
        .union(Self::CTRL)
        .union(Self::SUPER);

    /// Drop the bits that never take part in matching.
    #[inline]
    #[must_use]
    pub const fn normalized(self) -> Self {
        self.intersection(Self::MATCHED)
    }
}

/// Display order for modifiers, matching how shortcut strings are written.
pub(crate) const MODIFIER_NAMES: [(Modifiers, &str); 4] = [
    (Modifiers::SUPER, "command"),
    (Modifiers::CTRL, "ctrl"),
    (Modifiers::ALT, "alt"),
    (Modifiers::SHIFT, "shift"),
];

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn press_has_no_modifiers() {
        let ev = KeyEvent::press(KeyCode::Enter);
        assert_eq!(ev.modifiers, Modifiers::empty());
        assert_eq!(ev.kind, KeyEventKind::Press);
    }

    #[test]
    fn is_folds_case() {
        let ev = KeyEvent::new(KeyCode::Char('X'), Modifiers::CTRL | Modifiers::SHIFT);
        assert!(ev.is(KeyCode::Char('x'), Modifiers::CTRL | Modifiers::SHIFT));
    }

    #[test]
    fn is_requires_exact_modifiers() {
        let ev = KeyEvent::new(KeyCode::Char('b'), Modifiers::CTRL | Modifiers::SHIFT);
        assert!(!ev.is(KeyCode::Char('b'), Modifiers::CTRL));
    }

    #[test]
    fn is_ignores_hyper_and_meta() {
        let ev = KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT | Modifiers::META);
        assert!(ev.is(KeyCode::Tab, Modifiers::SHIFT));
    }

    #[test]
    fn release_never_matches() {
        let mut ev = KeyEvent::press(KeyCode::Enter);
        ev.kind = KeyEventKind::Release;
        assert!(!ev.is(KeyCode::Enter, Modifiers::empty()));
    }

    #[test]
    fn repeat_counts_as_press() {
        let mut ev = KeyEvent::press(KeyCode::Backspace);
        ev.kind = KeyEventKind::Repeat;
        assert!(ev.is_press());
    }

    #[test]
    fn key_names() {
        assert_eq!(KeyCode::Char(' ').name(), "space");
        assert_eq!(KeyCode::Char('+').name(), "plus");
        assert_eq!(KeyCode::Char('Q').name(), "q");
        assert_eq!(KeyCode::F(5).name(), "f5");
        assert_eq!(KeyCode::PageDown.name(), "pagedown");
    }

    #[test]
    fn display_event() {
        let ev = KeyEvent::new(KeyCode::Char('x'), Modifiers::SHIFT | Modifiers::SUPER);
        assert_eq!(ev.to_string(), "command+shift+x");
    }
}
