//! Cursor — selection geometry and structural edits over a [`Surface`].
//!
//! The cursor owns no state of its own. Every query reads the surface's
//! live value and selection, so geometry is never stale, even for work
//! that resumes after a deferral.
//!
//! Edits take a [`Template`]. The edit builds the complete new value
//! (text before the edited range, the template, text after) and commits
//! it through [`Cursor::set_text`], which writes the marker-free text and
//! turns the template's markers into the new selection. Content without
//! markers falls back to a per-operation [`Placement`].
//!
//! # Offsets
//!
//! Offsets are char offsets. Selection bounds read from the surface are
//! clamped to the value's length before use, and anything derived from
//! a line is clamped to `[0, line.len()]`.

use tracing::{debug, trace, warn};

use crate::line::{Line, char_len, char_slice, split_lines};
use crate::marker::{Placement, Template};
use crate::surface::{SelectionDirection, Surface};

// ---------------------------------------------------------------------------
// Geometry types
// ---------------------------------------------------------------------------

/// A non-empty selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Every line the selection touches, even partially.
    pub lines: Vec<Line>,
    /// The selected text.
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
    pub direction: SelectionDirection,
}

/// The caret's line and absolute offset. The caret is the selection start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: Line,
    pub cursor_at: usize,
}

/// Prefix and suffix for [`Cursor::wrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    pub prefix: String,
    pub suffix: String,
}

impl Markup {
    #[must_use]
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// The same string on both sides.
    #[must_use]
    pub fn symmetric(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        Self::new(markup.clone(), markup)
    }
}

impl From<&str> for Markup {
    fn from(s: &str) -> Self {
        Self::symmetric(s)
    }
}

impl From<String> for Markup {
    fn from(s: String) -> Self {
        Self::symmetric(s)
    }
}

impl From<(&str, &str)> for Markup {
    fn from((prefix, suffix): (&str, &str)) -> Self {
        Self::new(prefix, suffix)
    }
}

/// Options for [`Cursor::wrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapOptions {
    /// Remove the markup when the target is already wrapped. Default `true`.
    pub unwrap: bool,
    /// Content inserted between the markup when nothing is selected.
    pub placeholder: String,
}

impl WrapOptions {
    /// Default options with a placeholder.
    #[must_use]
    pub fn placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            ..Self::default()
        }
    }
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            unwrap: true,
            placeholder: String::new(),
        }
    }
}

/// Options for [`Cursor::replace_current_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceOptions {
    /// Select the whole replaced block instead of putting the caret after it.
    pub select_replaced: bool,
}

/// Target for [`Cursor::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectRange {
    /// An absolute range.
    Absolute { start: usize, end: usize },
    /// Shift the current bounds by signed deltas.
    Relative {
        from_current_start: isize,
        from_current_end: isize,
    },
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Reads and edits one surface.
pub struct Cursor<'a> {
    surface: &'a mut dyn Surface,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn new(surface: &'a mut dyn Surface) -> Self {
        Self { surface }
    }

    // -- Queries ------------------------------------------------------------

    /// The current value.
    #[must_use]
    pub fn value(&self) -> String {
        self.surface.value()
    }

    /// All lines of the current value.
    #[must_use]
    pub fn lines(&self) -> Vec<Line> {
        split_lines(&self.surface.value())
    }

    /// Line `line_number` (1-based), if it exists.
    #[must_use]
    pub fn line_at(&self, line_number: usize) -> Option<Line> {
        let index = line_number.checked_sub(1)?;
        self.lines().into_iter().nth(index)
    }

    /// The selection, or `None` for a bare caret.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        let value = self.surface.value();
        let (start, end) = self.bounds(&value);
        if start == end {
            return None;
        }
        let lines = split_lines(&value)
            .into_iter()
            .filter(|line| line.overlaps(start, end))
            .collect();
        Some(Selection {
            lines,
            text: char_slice(&value, start, end).to_owned(),
            selection_start: start,
            selection_end: end,
            direction: self.surface.selection_direction(),
        })
    }

    /// The caret's line and offset.
    ///
    /// # Panics
    ///
    /// Panics if no line contains the caret, which the line partition
    /// rules out for any clamped offset.
    #[must_use]
    pub fn position(&self) -> Position {
        let value = self.surface.value();
        let (cursor_at, _) = self.bounds(&value);
        let line = split_lines(&value)
            .into_iter()
            .find(|line| line.contains(cursor_at))
            .expect("caret outside every line");
        Position { line, cursor_at }
    }

    /// Width of the caret line's leading whitespace.
    #[must_use]
    pub fn indent_size(&self) -> usize {
        self.position().line.indent_size()
    }

    /// Is the selection (or caret) directly surrounded by `markup`?
    #[must_use]
    pub fn is_wrapped_with(&self, markup: &Markup) -> bool {
        let value = self.surface.value();
        let (start, end) = self.bounds(&value);
        is_wrapped(&value, start, end, markup)
    }

    // -- Commit -------------------------------------------------------------

    /// Write `content` as the whole value and apply its markers.
    ///
    /// No markers leaves the selection wherever the surface put it.
    pub fn set_text(&mut self, content: impl Into<Template>) {
        let rendered = content.into().render();
        if rendered.markers.len() > 2 {
            debug!(
                markers = rendered.markers.len(),
                "extra markers, using first and last"
            );
        }
        self.surface.set_value(&rendered.text);
        match rendered.selection() {
            Some((start, end)) if start == end => {
                self.surface
                    .set_selection_range(start, start, SelectionDirection::None);
            }
            Some((start, end)) => {
                self.surface
                    .set_selection_range(start, end, SelectionDirection::Forward);
            }
            None => {}
        }
        trace!(
            len = char_len(&rendered.text),
            selection = ?rendered.selection(),
            "committed edit"
        );
    }

    // -- Edits --------------------------------------------------------------

    /// Replace the selection with `content`, or insert it at the caret.
    ///
    /// Unmarked content leaves the caret after it.
    pub fn insert(&mut self, content: impl Into<Template>) {
        let value = self.surface.value();
        let (start, end) = self.bounds(&value);
        self.splice(&value, start, end, content.into(), Placement::ToEnd);
    }

    /// Map every selected line (or the caret line) through `map` and
    /// replace the block with the joined results. `None` drops the line.
    ///
    /// `map` gets the line, its index in the block and the whole block.
    pub fn replace_current_lines<F>(&mut self, mut map: F, options: ReplaceOptions)
    where
        F: FnMut(&Line, usize, &[Line]) -> Option<Template>,
    {
        let block = match self.selection() {
            Some(selection) => selection.lines,
            None => vec![self.position().line],
        };
        let (Some(first), Some(last)) = (block.first(), block.last()) else {
            return;
        };
        let (start, end) = (first.starts_at, last.ends_at);

        let mut content = Template::new();
        let mut joined = 0;
        for (index, line) in block.iter().enumerate() {
            if let Some(mapped) = map(line, index, &block) {
                if joined > 0 {
                    content = content.text("\n");
                }
                content = content.then(mapped);
                joined += 1;
            }
        }

        let placement = if options.select_replaced {
            Placement::SelectAll
        } else {
            Placement::ToEnd
        };
        let value = self.surface.value();
        self.splice(&value, start, end, content, placement);
    }

    /// Replace the content of line `line_number`, or delete the line and
    /// one adjoining newline when `content` is `None`.
    ///
    /// Deleting leaves the caret where the neighbours joined. Unknown line
    /// numbers are logged and ignored.
    pub fn replace_line(&mut self, line_number: usize, content: Option<Template>) {
        let Some(line) = self.line_at(line_number) else {
            warn!(line_number, "replace_line: no such line");
            return;
        };
        let value = self.surface.value();
        match content {
            Some(content) => {
                self.splice(&value, line.starts_at, line.ends_at, content, Placement::ToEnd);
            }
            // The first line takes its trailing newline with it.
            None if line.starts_at == 0 => {
                let after = char_slice(&value, line.ends_at + 1, usize::MAX);
                self.set_text(Template::new().marker().raw(after));
            }
            // Any other line takes the newline before it.
            None => {
                let before = char_slice(&value, 0, line.starts_at - 1);
                let after = char_slice(&value, line.ends_at, usize::MAX);
                self.set_text(Template::new().raw(before).marker().raw(after));
            }
        }
    }

    /// Wrap the selection in `markup`, or insert `markup` around the
    /// placeholder at the caret. When the target is already wrapped and
    /// `unwrap` is set, remove the markup instead. Either way the inner
    /// content ends up selected.
    pub fn wrap(&mut self, markup: impl Into<Markup>, options: &WrapOptions) {
        let markup = markup.into();
        let value = self.surface.value();
        let (start, end) = self.bounds(&value);
        let inner = char_slice(&value, start, end);

        let content = if options.unwrap && is_wrapped(&value, start, end, &markup) {
            debug!(prefix = %markup.prefix, "unwrapping");
            let before = char_slice(&value, 0, start - char_len(&markup.prefix));
            let after = char_slice(&value, end + char_len(&markup.suffix), usize::MAX);
            Template::new()
                .raw(before)
                .marker()
                .raw(inner)
                .marker()
                .raw(after)
        } else {
            let inner = if inner.is_empty() {
                options.placeholder.as_str()
            } else {
                inner
            };
            Template::new()
                .raw(char_slice(&value, 0, start))
                .text(&markup.prefix)
                .marker()
                .raw(inner)
                .marker()
                .text(&markup.suffix)
                .raw(char_slice(&value, end, usize::MAX))
        };
        self.set_text(content);
    }

    /// Move the selection without editing. The result is clamped to the
    /// value.
    pub fn select(&mut self, range: SelectRange) {
        let len = char_len(&self.surface.value());
        let (start, end) = match range {
            SelectRange::Absolute { start, end } => (start, end),
            SelectRange::Relative {
                from_current_start,
                from_current_end,
            } => (
                self.surface
                    .selection_start()
                    .saturating_add_signed(from_current_start),
                self.surface
                    .selection_end()
                    .saturating_add_signed(from_current_end),
            ),
        };
        let (start, end) = (start.min(len), end.min(len));
        let direction = if start == end {
            SelectionDirection::None
        } else {
            SelectionDirection::Forward
        };
        self.surface.set_selection_range(start, end, direction);
    }

    // -- Internals ----------------------------------------------------------

    /// Selection bounds clamped to the value and ordered.
    fn bounds(&self, value: &str) -> (usize, usize) {
        let len = char_len(value);
        let start = self.surface.selection_start().min(len);
        let end = self.surface.selection_end().min(len);
        (start.min(end), start.max(end))
    }

    /// Replace `[start, end)` of `value` with `content`.
    fn splice(
        &mut self,
        value: &str,
        start: usize,
        end: usize,
        content: Template,
        placement: Placement,
    ) {
        let composed = Template::new()
            .raw(char_slice(value, 0, start))
            .then(content.or_place(placement))
            .raw(char_slice(value, end, usize::MAX));
        self.set_text(composed);
    }
}

fn is_wrapped(value: &str, start: usize, end: usize, markup: &Markup) -> bool {
    let prefix_len = char_len(&markup.prefix);
    let suffix_len = char_len(&markup.suffix);
    if start < prefix_len || end + suffix_len > char_len(value) {
        return false;
    }
    char_slice(value, start - prefix_len, start) == markup.prefix
        && char_slice(value, end, end + suffix_len) == markup.suffix
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
