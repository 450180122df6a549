//! n-markdown — a markdown command layer for plain-text inputs.
//!
//! The host owns a text surface (a value plus a selection). This crate
//! turns named commands (bold, headings, lists, links, code, …) into edits
//! of that surface, and intervenes on raw key and paste events to keep
//! markdown structures consistent while the user types.
//!
//! ```text
//! host ──trigger──▶ Editor ──▶ Registry ──▶ Handler ──▶ Cursor ──▶ Surface
//!      ──key/paste─▶        ──▶ Keymap / Extensions ──────┘
//! ```
//!
//! Layers, bottom up:
//!
//! - [`line`] and [`marker`]: geometry of a flat string and the marker
//!   templates edits use to place the selection afterwards.
//! - [`surface`]: the host contract, plus the in-memory [`TextArea`].
//! - [`cursor`]: queries and primitive edits (insert, wrap, replace lines,
//!   select).
//! - [`command`], [`builtin`], [`handlers`], [`registry`], [`keymap`]:
//!   what commands exist and what they do.
//! - [`extension`]: event hooks (list continuation, indent, link paste,
//!   line removal, ordered-list autocorrect).
//! - [`editor`]: the dispatcher that ties one surface to all of the above.

pub mod builtin;
pub mod clipboard;
pub mod command;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod extension;
pub mod handlers;
pub mod keymap;
pub mod line;
pub mod marker;
pub mod options;
pub mod registry;
pub mod surface;

pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard, NoClipboard};
pub use command::{CommandSpec, Completion, Context, Invocation, Outcome, TaskId};
pub use cursor::{Cursor, Markup, ReplaceOptions, SelectRange, WrapOptions};
pub use editor::{Config, Editor};
pub use error::{Error, Result};
pub use extension::{Extension, Flow};
pub use line::Line;
pub use marker::{MARKER, Placement, Template};
pub use options::{Options, OptionsPatch};
pub use surface::{SelectionDirection, Surface, TextArea};
