//! Line geometry over a flat text value.
//!
//! Lines are never stored. Every query splits the current value on `'\n'`
//! and numbers the pieces from 1. Offsets are char offsets into the value,
//! the same unit the surface uses for its selection.
//!
//! `ends_at` is the offset of the newline slot that terminates the line
//! (for the last line, the value's length), so the closed intervals
//! `[starts_at, ends_at]` of consecutive lines tile `[0, len]` exactly:
//! `next.starts_at == prev.ends_at + 1`.

use std::fmt;

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// One line of the value, with its absolute bounds.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Line {
    /// Line content without the trailing newline.
    pub text: String,
    /// 1-based line number.
    pub line_number: usize,
    /// Offset of the first char of the line.
    pub starts_at: usize,
    /// Offset of the newline slot after the last char.
    pub ends_at: usize,
}

impl Line {
    /// Length of the line content in chars.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ends_at - self.starts_at
    }

    /// True for a line with no content.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.starts_at == self.ends_at
    }

    /// True when `offset` falls inside `[starts_at, ends_at]`.
    #[inline]
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.starts_at <= offset && offset <= self.ends_at
    }

    /// True when the line overlaps the closed interval `[start, end]`.
    ///
    /// Either selection end landing inside the line counts, and so does a
    /// line lying wholly inside the selection.
    #[must_use]
    pub const fn overlaps(&self, start: usize, end: usize) -> bool {
        self.contains(start)
            || self.contains(end)
            || (start <= self.starts_at && self.ends_at <= end)
    }

    /// Convert an absolute offset to a column on this line, clamped to
    /// `[0, len]`.
    #[must_use]
    pub const fn column_of(&self, offset: usize) -> usize {
        let col = offset.saturating_sub(self.starts_at);
        if col > self.len() { self.len() } else { col }
    }

    /// Leading whitespace of the line.
    #[must_use]
    pub fn indentation(&self) -> &str {
        let body = self.text.trim_start();
        &self.text[..self.text.len() - body.len()]
    }

    /// Width of the leading whitespace in chars.
    #[must_use]
    pub fn indent_size(&self) -> usize {
        char_len(self.indentation())
    }

    /// Content before column `col` (clamped).
    #[must_use]
    pub fn before(&self, col: usize) -> &str {
        let col = col.min(self.len());
        &self.text[..byte_index(&self.text, col)]
    }

    /// Content from column `col` (clamped) to the end of the line.
    #[must_use]
    pub fn after(&self, col: usize) -> &str {
        let col = col.min(self.len());
        &self.text[byte_index(&self.text, col)..]
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line({} [{}..={}] {:?})",
            self.line_number, self.starts_at, self.ends_at, self.text
        )
    }
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// Split `value` into lines. Always returns at least one line.
#[must_use]
pub fn split_lines(value: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut starts_at = 0;
    for (i, text) in value.split('\n').enumerate() {
        let len = text.chars().count();
        lines.push(Line {
            text: text.to_owned(),
            line_number: i + 1,
            starts_at,
            ends_at: starts_at + len,
        });
        starts_at += len + 1;
    }
    lines
}

// ---------------------------------------------------------------------------
// Char/byte helpers
// ---------------------------------------------------------------------------

/// Byte index of char offset `offset` in `s`, or `s.len()` past the end.
#[must_use]
pub fn byte_index(s: &str, offset: usize) -> usize {
    s.char_indices().nth(offset).map_or(s.len(), |(i, _)| i)
}

/// Char count of `s`.
#[inline]
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Substring by char offsets `[start, end)`, clamped to the string.
#[must_use]
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let from = byte_index(s, start);
    let to = byte_index(s, end.max(start));
    &s[from..to]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_value_has_one_line() {
        let lines = split_lines("");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!((lines[0].starts_at, lines[0].ends_at), (0, 0));
        assert!(lines[0].is_empty());
    }

    #[test]
    fn bounds_cover_newline_slot() {
        let lines = split_lines("ab\n\ncde");
        let bounds: Vec<_> = lines.iter().map(|l| (l.starts_at, l.ends_at)).collect();
        assert_eq!(bounds, vec![(0, 2), (3, 3), (4, 7)]);
        assert_eq!(lines[2].text, "cde");
    }

    #[test]
    fn trailing_newline_makes_empty_last_line() {
        let lines = split_lines("x\n");
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[1].starts_at, lines[1].ends_at), (2, 2));
    }

    #[test]
    fn offsets_are_chars() {
        let lines = split_lines("café\nñ");
        assert_eq!(lines[0].ends_at, 4);
        assert_eq!(lines[1].starts_at, 5);
        assert_eq!(lines[1].ends_at, 6);
    }

    #[test]
    fn overlap_rules() {
        let lines = split_lines("one\ntwo\nthree");
        let hit = |s, e| -> Vec<usize> {
            lines
                .iter()
                .filter(|l| l.overlaps(s, e))
                .map(|l| l.line_number)
                .collect()
        };
        assert_eq!(hit(1, 1), vec![1]);
        // Offset 3 is line 1's newline slot.
        assert_eq!(hit(3, 3), vec![1]);
        assert_eq!(hit(2, 9), vec![1, 2, 3]);
        assert_eq!(hit(0, 13), vec![1, 2, 3]);
    }

    #[test]
    fn column_clamps() {
        let line = &split_lines("ab\ncd")[1];
        assert_eq!(line.column_of(0), 0);
        assert_eq!(line.column_of(4), 1);
        assert_eq!(line.column_of(99), 2);
    }

    #[test]
    fn before_after_split_on_chars() {
        let line = &split_lines("héllo")[0];
        assert_eq!(line.before(2), "hé");
        assert_eq!(line.after(2), "llo");
        assert_eq!(line.after(40), "");
    }

    #[test]
    fn indentation() {
        let lines = split_lines("    - a\n\t1. b\nc\n   ");
        let sizes: Vec<_> = lines.iter().map(Line::indent_size).collect();
        assert_eq!(sizes, vec![4, 1, 0, 3]);
        assert_eq!(lines[1].indentation(), "\t");
    }

    #[test]
    fn char_slice_clamps() {
        assert_eq!(char_slice("naïve", 1, 3), "aï");
        assert_eq!(char_slice("abc", 2, 10), "c");
        assert_eq!(char_slice("abc", 5, 1), "");
    }
}
