//! Clipboard — the one fallible collaborator.
//!
//! Commands that depend on clipboard content (link-paste) read it through
//! [`Clipboard`]. A failed read is never an error for the caller:
//! [`clipboard_text`] logs it and reports "nothing on the clipboard".

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;
use tracing::warn;

/// Why the host could not read the clipboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard access denied")]
    Denied,
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the system clipboard.
pub trait Clipboard {
    /// The clipboard's text content, if it holds any.
    ///
    /// # Errors
    ///
    /// Whatever the host reports when the read fails.
    fn read_text(&self) -> Result<Option<String>, ClipboardError>;
}

/// Read the clipboard, treating failures as an empty clipboard.
#[must_use]
pub fn clipboard_text(clipboard: &dyn Clipboard) -> Option<String> {
    match clipboard.read_text() {
        Ok(text) => text.filter(|t| !t.is_empty()),
        Err(err) => {
            warn!(%err, "clipboard read failed");
            None
        }
    }
}

/// A clipboard held in memory. Settable from the host side.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    content: RefCell<Option<String>>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard already holding `text`.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            content: RefCell::new(Some(text.into())),
        }
    }

    /// Replace the content.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.content.borrow_mut() = Some(text.into());
    }

    pub fn clear(&self) {
        self.content.borrow_mut().take();
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        Ok(self.content.borrow().clone())
    }
}

/// Shared clipboards, so the host keeps a handle after giving one to an
/// editor.
impl<C: Clipboard + ?Sized> Clipboard for Rc<C> {
    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        (**self).read_text()
    }
}

/// A host without clipboard access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        Err(ClipboardError::Unavailable("no clipboard attached".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn memory_clipboard_roundtrip() {
        let clip = MemoryClipboard::new();
        assert_eq!(clipboard_text(&clip), None);
        clip.set_text("https://example.com");
        assert_eq!(clipboard_text(&clip).as_deref(), Some("https://example.com"));
        clip.clear();
        assert_eq!(clipboard_text(&clip), None);
    }

    #[test]
    fn empty_text_counts_as_nothing() {
        assert_eq!(clipboard_text(&MemoryClipboard::with_text("")), None);
    }

    #[test]
    fn failures_degrade_to_none() {
        assert!(NoClipboard.read_text().is_err());
        assert_eq!(clipboard_text(&NoClipboard), None);
    }
}
