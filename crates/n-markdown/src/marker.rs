//! Marker templates — declaring where the selection lands after an edit.
//!
//! Every edit primitive takes a [`Template`]: an ordered list of literal
//! text and zero-width markers. [`Template::render`] joins the text and
//! reports the char offset of each marker in the joined result. The cursor
//! writes the text and turns the markers into the new selection:
//!
//! | markers | selection                         |
//! |---------|-----------------------------------|
//! | 0       | none requested                    |
//! | 1       | caret at the marker               |
//! | 2+      | range from the first to the last  |
//!
//! Plain strings convert into templates by splitting on [`MARKER`], so
//! `format!("**{MARKER}{text}{MARKER}**")` and the builder form
//! `Template::new().text("**").marker().text(text).marker().text("**")`
//! describe the same edit. Text copied out of a live buffer goes in through
//! [`Template::raw`], which keeps any `MARKER` chars the buffer holds.

use std::fmt;

/// Reserved char that stands for a marker inside plain strings.
pub const MARKER: char = '\u{0}';

// ---------------------------------------------------------------------------
// Segment / Template
// ---------------------------------------------------------------------------

/// One piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text.
    Text(String),
    /// A selection boundary.
    Marker,
}

/// An ordered list of text and marker segments.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// An empty template.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Append literal text. Stray [`MARKER`] chars in `text` become markers.
    #[must_use]
    pub fn text(mut self, text: impl AsRef<str>) -> Self {
        self.push_text(text.as_ref());
        self
    }

    /// Append `text` verbatim. [`MARKER`] chars stay literal.
    #[must_use]
    pub fn raw(mut self, text: impl AsRef<str>) -> Self {
        self.push_raw(text.as_ref());
        self
    }

    /// Append a marker.
    #[must_use]
    pub fn marker(mut self) -> Self {
        self.segments.push(Segment::Marker);
        self
    }

    /// Append another template.
    #[must_use]
    pub fn then(mut self, other: impl Into<Self>) -> Self {
        for segment in other.into().segments {
            match segment {
                Segment::Text(t) => self.push_raw(&t),
                Segment::Marker => self.segments.push(Segment::Marker),
            }
        }
        self
    }

    /// The segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of markers in the template.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Marker))
            .count()
    }

    /// True when the template carries at least one marker.
    #[must_use]
    pub fn has_markers(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Marker))
    }

    /// Add markers according to `placement` when the template has none.
    #[must_use]
    pub fn or_place(self, placement: Placement) -> Self {
        if self.has_markers() {
            return self;
        }
        match placement {
            Placement::ToStart => Self::new().marker().then(self),
            Placement::ToEnd => self.marker(),
            Placement::SelectAll => Self::new().marker().then(self).marker(),
        }
    }

    /// Join the text and collect marker offsets (in chars, after stripping).
    #[must_use]
    pub fn render(&self) -> Rendered {
        let mut text = String::new();
        let mut len = 0;
        let mut markers = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => {
                    text.push_str(t);
                    len += t.chars().count();
                }
                Segment::Marker => markers.push(len),
            }
        }
        Rendered { text, markers }
    }

    fn push_text(&mut self, text: &str) {
        for (i, piece) in text.split(MARKER).enumerate() {
            if i > 0 {
                self.segments.push(Segment::Marker);
            }
            self.push_raw(piece);
        }
    }

    fn push_raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_owned()));
        }
    }
}

impl From<&str> for Template {
    fn from(s: &str) -> Self {
        Self::new().text(s)
    }
}

impl From<String> for Template {
    fn from(s: String) -> Self {
        Self::new().text(s)
    }
}

impl From<&String> for Template {
    fn from(s: &String) -> Self {
        Self::new().text(s)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Template(")?;
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => write!(f, "{t:?}")?,
                Segment::Marker => f.write_str("|")?,
            }
        }
        f.write_str(")")
    }
}

// ---------------------------------------------------------------------------
// Rendered
// ---------------------------------------------------------------------------

/// A rendered template: marker-free text plus marker offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The text with all markers stripped.
    pub text: String,
    /// Char offsets into `text` where markers stood, ascending.
    pub markers: Vec<usize>,
}

impl Rendered {
    /// The selection the markers request, as `(start, end)`.
    ///
    /// `None` without markers. With more than two markers the first and
    /// the last win.
    #[must_use]
    pub fn selection(&self) -> Option<(usize, usize)> {
        let first = *self.markers.first()?;
        let last = *self.markers.last()?;
        Some((first, last))
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Where the selection goes when content carries no markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Caret before the inserted content.
    ToStart,
    /// Caret after the inserted content.
    #[default]
    ToEnd,
    /// The inserted content becomes the selection.
    SelectAll,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_and_string_agree() {
        let built = Template::new().text("**").marker().text("bold").marker().text("**");
        let parsed = Template::from(format!("**{MARKER}bold{MARKER}**"));
        assert_eq!(built, parsed);
    }

    #[test]
    fn render_strips_markers() {
        let r = Template::from(format!("a{MARKER}bc{MARKER}d")).render();
        assert_eq!(r.text, "abcd");
        assert_eq!(r.markers, vec![1, 3]);
        assert_eq!(r.selection(), Some((1, 3)));
    }

    #[test]
    fn single_marker_is_caret() {
        let r = Template::from(format!("xy{MARKER}")).render();
        assert_eq!(r.selection(), Some((2, 2)));
    }

    #[test]
    fn no_marker_no_selection() {
        assert_eq!(Template::from("plain").render().selection(), None);
    }

    #[test]
    fn extra_markers_use_first_and_last() {
        let r = Template::from(format!("{MARKER}a{MARKER}b{MARKER}c")).render();
        assert_eq!(r.text, "abc");
        assert_eq!(r.selection(), Some((0, 2)));
    }

    #[test]
    fn marker_offsets_count_chars() {
        let r = Template::new().text("ñé").marker().render();
        assert_eq!(r.markers, vec![2]);
    }

    #[test]
    fn placement_only_when_unmarked() {
        let t = Template::from("abc");
        assert_eq!(
            t.clone().or_place(Placement::ToStart).render().markers,
            vec![0]
        );
        assert_eq!(t.clone().or_place(Placement::ToEnd).render().markers, vec![3]);
        assert_eq!(t.or_place(Placement::SelectAll).render().markers, vec![0, 3]);

        let marked = Template::new().text("a").marker().text("bc");
        assert_eq!(marked.or_place(Placement::SelectAll).render().markers, vec![1]);
    }

    #[test]
    fn then_merges_adjacent_text() {
        let t = Template::from("ab").then("cd").then(Template::new().marker());
        assert_eq!(
            t.segments(),
            &[Segment::Text("abcd".to_owned()), Segment::Marker]
        );
        assert_eq!(t.marker_count(), 1);
    }

    #[test]
    fn raw_text_keeps_marker_chars() {
        let t = Template::new().raw(format!("a{MARKER}b")).marker().raw("c");
        assert_eq!(t.marker_count(), 1);
        let r = t.render();
        assert_eq!(r.text, format!("a{MARKER}bc"));
        assert_eq!(r.markers, vec![3]);

        // Raw text survives being appended to another template.
        let joined = Template::from("x").then(Template::new().raw(MARKER.to_string()));
        assert_eq!(joined.marker_count(), 0);
        assert_eq!(joined.render().text, format!("x{MARKER}"));
    }
}
