//! Commands — named handlers and the values they exchange with the editor.
//!
//! A command is a [`Handler`] under a name, optionally bound to shortcut
//! chords. Handlers never talk to the surface directly: they get a
//! [`Context`] holding a [`Cursor`] over the live surface, the resolved
//! [`Options`], the key event that fired them (if any), extra arguments
//! from the trigger call, and the clipboard.
//!
//! A handler either finishes ([`Outcome::Done`]) or hands back a
//! [`Continuation`] to run at the host's next checkpoint
//! ([`Outcome::Deferred`]). Continuations get a fresh context, so the
//! geometry they read is whatever the surface holds when they resume.
//!
//! # Configuration
//!
//! Hosts describe commands with [`CommandSpec`]s. A spec naming a
//! built-in overrides it; any other name adds a custom command, which must
//! bring a handler. The registry classifies each spec into a
//! [`CommandSource`].

use std::fmt;
use std::rc::Rc;

use n_input::{Chord, KeyEvent};
use serde_json::Value;

use crate::clipboard::Clipboard;
use crate::cursor::Cursor;
use crate::options::Options;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// What a handler does when its command fires.
pub type Handler = Rc<dyn Fn(&mut Context<'_>) -> Outcome>;

/// Work a handler deferred to the next checkpoint.
pub type Continuation = Box<dyn FnOnce(&mut Context<'_>) -> Outcome>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut Context<'_>) -> Outcome + 'static,
{
    Rc::new(f)
}

/// How a handler (or continuation) finished.
pub enum Outcome {
    /// All edits are committed.
    Done,
    /// More work follows at the next checkpoint.
    Deferred(Continuation),
}

impl Outcome {
    /// Defer `f` to the next checkpoint.
    pub fn defer<F>(f: F) -> Self
    where
        F: FnOnce(&mut Context<'_>) -> Outcome + 'static,
    {
        Self::Deferred(Box::new(f))
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => f.write_str("Done"),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Everything a handler may touch.
pub struct Context<'a> {
    pub cursor: Cursor<'a>,
    pub options: &'a Options,
    /// The key event that fired the command through a shortcut.
    pub key_event: Option<KeyEvent>,
    /// Extra arguments passed to the trigger call.
    pub args: &'a [Value],
    pub clipboard: &'a dyn Clipboard,
}

impl Context<'_> {
    /// Argument `index` as a string, if present and a string.
    #[must_use]
    pub fn arg_str(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// A registered command.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub handler: Handler,
    /// Chords that trigger the command.
    pub shortcut: Vec<Chord>,
    /// Suppress the host's default key behavior when a chord fires.
    pub shortcut_prevent_default: bool,
    /// Only `Some(false)` disables the command.
    pub enable: Option<bool>,
}

impl CommandDescriptor {
    /// A descriptor with no shortcut.
    pub fn new(name: impl Into<String>, handler: Handler) -> Self {
        Self {
            name: name.into(),
            handler,
            shortcut: Vec::new(),
            shortcut_prevent_default: false,
            enable: None,
        }
    }

    #[must_use]
    pub fn with_shortcut(mut self, shortcut: Vec<Chord>) -> Self {
        self.shortcut = shortcut;
        self
    }

    /// False only when explicitly disabled.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enable != Some(false)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shortcut: Vec<String> = self.shortcut.iter().map(ToString::to_string).collect();
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("shortcut", &shortcut)
            .field("shortcut_prevent_default", &self.shortcut_prevent_default)
            .field("enable", &self.enable)
            .finish_non_exhaustive()
    }
}

/// A host-supplied command definition. Everything but the name is optional.
#[derive(Clone, Default)]
pub struct CommandSpec {
    pub name: String,
    pub handler: Option<Handler>,
    /// Shortcut strings such as `"ctrl+b"` or `"command+shift+x"`.
    pub shortcut: Option<Vec<String>>,
    pub shortcut_prevent_default: Option<bool>,
    pub enable: Option<bool>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Outcome + 'static,
    {
        self.handler = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn shortcut<I, S>(mut self, shortcut: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shortcut = Some(shortcut.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn prevent_default(mut self, prevent: bool) -> Self {
        self.shortcut_prevent_default = Some(prevent);
        self
    }

    #[must_use]
    pub const fn enable(mut self, enable: bool) -> Self {
        self.enable = Some(enable);
        self
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("handler", &self.handler.as_ref().map(|_| ".."))
            .field("shortcut", &self.shortcut)
            .field("shortcut_prevent_default", &self.shortcut_prevent_default)
            .field("enable", &self.enable)
            .finish()
    }
}

/// Fields a spec replaces on a built-in. `None` keeps the built-in's.
#[derive(Clone, Default)]
pub struct BuiltInOverride {
    pub handler: Option<Handler>,
    pub shortcut: Option<Vec<Chord>>,
    pub shortcut_prevent_default: Option<bool>,
    pub enable: Option<bool>,
}

impl BuiltInOverride {
    /// Lay the override over `base`.
    pub fn apply_to(self, base: &mut CommandDescriptor) {
        if let Some(handler) = self.handler {
            base.handler = handler;
        }
        if let Some(shortcut) = self.shortcut {
            base.shortcut = shortcut;
        }
        if let Some(prevent) = self.shortcut_prevent_default {
            base.shortcut_prevent_default = prevent;
        }
        if self.enable.is_some() {
            base.enable = self.enable;
        }
    }
}

/// A classified [`CommandSpec`].
pub enum CommandSource {
    /// Overrides the built-in with this name in place.
    BuiltIn {
        name: String,
        overrides: BuiltInOverride,
    },
    /// Appended after the built-ins.
    Custom(CommandDescriptor),
}

// ---------------------------------------------------------------------------
// Trigger protocol
// ---------------------------------------------------------------------------

/// Per-call trigger data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub key_event: Option<KeyEvent>,
    pub args: Vec<Value>,
}

impl Invocation {
    /// An invocation carrying a key event.
    #[must_use]
    pub fn key(event: KeyEvent) -> Self {
        Self {
            key_event: Some(event),
            args: Vec::new(),
        }
    }

    /// An invocation carrying extra arguments.
    #[must_use]
    pub fn args(args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            key_event: None,
            args: args.into_iter().collect(),
        }
    }
}

/// Identifies a queued trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// What a trigger call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The handler ran to completion.
    Done,
    /// The command is disabled.
    Skipped,
    /// Work is queued; poll with `is_settled`.
    Pending(TaskId),
}

impl Completion {
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
