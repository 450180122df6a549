//! Host text surface — the contract the cursor model edits through.
//!
//! A [`Surface`] is whatever the host renders as a text input: a string
//! value, a selection range with a direction, a focus operation, and a
//! change notification that fires whenever the value is written
//! programmatically (so controlled bindings in the host re-sync).
//!
//! [`TextArea`] is the in-memory implementation used by tests and the CLI.
//! It stores the value in a [`ropey::Rope`] and also plays the host's part
//! for events nobody prevented: typing, Enter, Tab, Backspace, paste.
//!
//! # Notation
//!
//! [`TextArea::from_notation`] and [`TextArea::to_notation`] read and write
//! a value with its selection inline: `<` marks the selection start and `>`
//! the end, so `"**<some>** string"` selects `some` and `"item<>"` is a
//! caret after `item`. The notation cannot express a value that itself
//! contains `<` or `>`.

use std::fmt;

use n_input::{Event, KeyCode, KeyEvent, Modifiers};
use ropey::Rope;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Surface contract
// ---------------------------------------------------------------------------

/// Direction of a selection, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionDirection {
    Forward,
    Backward,
    #[default]
    None,
}

/// The editable surface a [`Cursor`](crate::cursor::Cursor) operates on.
///
/// All offsets are char offsets into [`value`](Self::value).
pub trait Surface {
    /// The full current value.
    fn value(&self) -> String;

    /// Replace the value and fire the change notification.
    ///
    /// The selection afterwards is unspecified; callers set it explicitly.
    fn set_value(&mut self, value: &str);

    /// Start of the selection (or the caret).
    fn selection_start(&self) -> usize;

    /// End of the selection (equal to the start for a caret).
    fn selection_end(&self) -> usize;

    fn selection_direction(&self) -> SelectionDirection;

    /// Set the selection. Out-of-range offsets are clamped by the surface.
    fn set_selection_range(&mut self, start: usize, end: usize, direction: SelectionDirection);

    /// Give the surface input focus.
    fn focus(&mut self);
}

// ---------------------------------------------------------------------------
// TextArea
// ---------------------------------------------------------------------------

type ChangeListener = Box<dyn FnMut(&str)>;

/// An in-memory multi-line text input.
pub struct TextArea {
    rope: Rope,
    start: usize,
    end: usize,
    direction: SelectionDirection,
    focused: bool,
    revision: u64,
    listeners: Vec<ChangeListener>,
}

impl TextArea {
    // -- Construction -------------------------------------------------------

    /// An empty text area with the caret at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// A text area holding `text` with the caret at the end.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let len = rope.len_chars();
        Self {
            rope,
            start: len,
            end: len,
            direction: SelectionDirection::None,
            focused: false,
            revision: 0,
            listeners: Vec::new(),
        }
    }

    /// Parse the `<`/`>` selection notation.
    ///
    /// A value with neither mark puts the caret at the end.
    ///
    /// # Errors
    ///
    /// [`Error::Notation`] when only one mark is present, a mark repeats,
    /// or `>` comes before `<`.
    pub fn from_notation(notation: &str) -> Result<Self> {
        let mut text = String::with_capacity(notation.len());
        let mut start = None;
        let mut end = None;
        let mut len = 0;
        for ch in notation.chars() {
            match ch {
                '<' if start.is_some() => {
                    return Err(Error::Notation(format!("repeated '<' in {notation:?}")));
                }
                '>' if end.is_some() => {
                    return Err(Error::Notation(format!("repeated '>' in {notation:?}")));
                }
                '<' => start = Some(len),
                '>' if start.is_none() => {
                    return Err(Error::Notation(format!("'>' before '<' in {notation:?}")));
                }
                '>' => end = Some(len),
                _ => {
                    text.push(ch);
                    len += 1;
                }
            }
        }

        let mut area = Self::from_text(&text);
        match (start, end) {
            (Some(start), Some(end)) => {
                area.set_selection_range(start, end, SelectionDirection::Forward);
            }
            (None, None) => {}
            _ => {
                return Err(Error::Notation(format!(
                    "unterminated selection in {notation:?}"
                )));
            }
        }
        Ok(area)
    }

    /// The value with the selection written inline as `<`…`>`.
    #[must_use]
    pub fn to_notation(&self) -> String {
        let mut out = String::with_capacity(self.rope.len_bytes() + 2);
        for (i, ch) in self.rope.chars().enumerate() {
            if i == self.start {
                out.push('<');
            }
            if i == self.end {
                out.push('>');
            }
            out.push(ch);
        }
        let len = self.rope.len_chars();
        if self.start == len {
            out.push('<');
        }
        if self.end == len {
            out.push('>');
        }
        out
    }

    // -- Accessors ----------------------------------------------------------

    /// The underlying rope.
    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Length of the value in chars.
    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Bumped on every change to the value, programmatic or typed.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Register a listener for programmatic value changes.
    pub fn on_change(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // -- Default input behaviors -------------------------------------------

    /// Replace the selection with `text` (or insert at the caret) and put
    /// the caret after it. This is what typing and pasting do.
    pub fn insert_text(&mut self, text: &str) {
        let (start, end) = (self.start, self.end);
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        let caret = start + text.chars().count();
        self.collapse(caret);
        self.revision += 1;
    }

    /// Delete the selection, or the char before the caret.
    pub fn backspace(&mut self) {
        if self.start != self.end {
            self.insert_text("");
        } else if self.start > 0 {
            self.rope.remove(self.start - 1..self.start);
            self.collapse(self.start - 1);
            self.revision += 1;
        }
    }

    /// Apply the host's default behavior for an event nobody prevented.
    ///
    /// Returns `true` when the event did something.
    pub fn apply_default(&mut self, event: &Event) -> bool {
        match event {
            Event::Paste(text) => {
                self.insert_text(text);
                true
            }
            Event::Key(key) if key.is_press() => self.apply_key(key),
            Event::Key(_) => false,
        }
    }

    fn apply_key(&mut self, key: &KeyEvent) -> bool {
        let shortcut_mods = Modifiers::CTRL | Modifiers::SUPER | Modifiers::ALT;
        if key.modifiers.intersects(shortcut_mods) && key.code != KeyCode::Backspace {
            return false;
        }
        match key.code {
            KeyCode::Char(ch) => self.insert_text(ch.encode_utf8(&mut [0; 4])),
            KeyCode::Enter => self.insert_text("\n"),
            KeyCode::Tab if key.modifiers.is_empty() => self.insert_text("\t"),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => {
                let to = if self.start == self.end {
                    self.start.saturating_sub(1)
                } else {
                    self.start
                };
                self.collapse(to);
            }
            KeyCode::Right => {
                let to = if self.start == self.end { self.end + 1 } else { self.end };
                self.collapse(to.min(self.len_chars()));
            }
            KeyCode::Home => self.collapse(0),
            KeyCode::End => self.collapse(self.len_chars()),
            _ => return false,
        }
        true
    }

    fn collapse(&mut self, caret: usize) {
        self.start = caret;
        self.end = caret;
        self.direction = SelectionDirection::None;
    }
}

impl Default for TextArea {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TextArea {
    fn value(&self) -> String {
        self.rope.to_string()
    }

    fn set_value(&mut self, value: &str) {
        self.rope = Rope::from_str(value);
        self.revision += 1;
        // Writing the value moves the caret to the end, as text inputs do.
        self.collapse(self.rope.len_chars());
        for listener in &mut self.listeners {
            listener(value);
        }
    }

    fn selection_start(&self) -> usize {
        self.start
    }

    fn selection_end(&self) -> usize {
        self.end
    }

    fn selection_direction(&self) -> SelectionDirection {
        self.direction
    }

    fn set_selection_range(&mut self, start: usize, end: usize, direction: SelectionDirection) {
        let len = self.rope.len_chars();
        let end = end.min(len);
        self.start = start.min(end);
        self.end = end;
        self.direction = direction;
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

impl fmt::Debug for TextArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextArea")
            .field("value", &self.to_notation())
            .field("direction", &self.direction)
            .field("focused", &self.focused)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notation_roundtrip() {
        for s in ["<>", "**<some>** string", "a\nb<>", "<abc>", "x<y>z", "<>tail"] {
            assert_eq!(TextArea::from_notation(s).unwrap().to_notation(), s);
        }
    }

    #[test]
    fn notation_without_marks_puts_caret_at_end() {
        let area = TextArea::from_notation("abc").unwrap();
        assert_eq!(area.to_notation(), "abc<>");
    }

    #[test]
    fn notation_errors() {
        assert!(TextArea::from_notation("a<b").is_err());
        assert!(TextArea::from_notation("a>b<").is_err());
        assert!(TextArea::from_notation("<<>").is_err());
        assert!(TextArea::from_notation("<>>").is_err());
    }

    #[test]
    fn set_value_fires_listeners_and_moves_caret() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut area = TextArea::from_notation("<ab>").unwrap();
        let sink = Rc::clone(&seen);
        area.on_change(move |v| sink.borrow_mut().push(v.to_owned()));

        area.set_value("hello");
        assert_eq!(*seen.borrow(), vec!["hello".to_owned()]);
        assert_eq!(area.to_notation(), "hello<>");
        assert_eq!(area.revision(), 1);
    }

    #[test]
    fn selection_is_clamped() {
        let mut area = TextArea::from_text("abc");
        area.set_selection_range(2, 10, SelectionDirection::Forward);
        assert_eq!((area.selection_start(), area.selection_end()), (2, 3));
        area.set_selection_range(3, 1, SelectionDirection::None);
        assert_eq!((area.selection_start(), area.selection_end()), (1, 1));
    }

    #[test]
    fn typing_replaces_selection() {
        let mut area = TextArea::from_notation("a<bc>d").unwrap();
        area.apply_default(&Event::Key(KeyEvent::press(KeyCode::Char('X'))));
        assert_eq!(area.to_notation(), "aX<>d");
    }

    #[test]
    fn enter_and_tab_insert() {
        let mut area = TextArea::from_notation("ab<>").unwrap();
        area.apply_default(&Event::Key(KeyEvent::press(KeyCode::Enter)));
        area.apply_default(&Event::Key(KeyEvent::press(KeyCode::Tab)));
        assert_eq!(area.to_notation(), "ab\n\t<>");
    }

    #[test]
    fn backspace_deletes_char_or_selection() {
        let mut area = TextArea::from_notation("ab<>c").unwrap();
        area.backspace();
        assert_eq!(area.to_notation(), "a<>c");
        let mut area = TextArea::from_notation("<ab>c").unwrap();
        area.backspace();
        assert_eq!(area.to_notation(), "<>c");
        let mut area = TextArea::from_notation("<>c").unwrap();
        area.backspace();
        assert_eq!(area.to_notation(), "<>c");
    }

    #[test]
    fn paste_inserts() {
        let mut area = TextArea::from_notation("<>").unwrap();
        assert!(area.apply_default(&Event::Paste("hi".to_owned())));
        assert_eq!(area.to_notation(), "hi<>");
    }

    #[test]
    fn shortcuts_do_nothing_by_default() {
        let mut area = TextArea::from_notation("<>").unwrap();
        let ctrl_b = KeyEvent::new(KeyCode::Char('b'), Modifiers::CTRL);
        assert!(!area.apply_default(&Event::Key(ctrl_b)));
        assert_eq!(area.to_notation(), "<>");
    }

    #[test]
    fn arrows_move_caret() {
        let mut area = TextArea::from_notation("ab<>").unwrap();
        area.apply_default(&Event::Key(KeyEvent::press(KeyCode::Left)));
        assert_eq!(area.to_notation(), "a<>b");
        area.apply_default(&Event::Key(KeyEvent::press(KeyCode::Home)));
        assert_eq!(area.to_notation(), "<>ab");
        area.apply_default(&Event::Key(KeyEvent::press(KeyCode::Right)));
        assert_eq!(area.to_notation(), "a<>b");
    }

    #[test]
    fn focus_flag() {
        let mut area = TextArea::new();
        assert!(!area.is_focused());
        area.focus();
        assert!(area.is_focused());
        area.blur();
        assert!(!area.is_focused());
    }
}
