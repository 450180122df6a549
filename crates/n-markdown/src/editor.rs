//! Editor — one surface, its command table, shortcuts and extensions.
//!
//! The editor is the dispatcher between the host and the handlers. Hosts
//! call [`Editor::trigger`] for toolbar buttons, forward raw input through
//! [`Editor::handle_key`] / [`Editor::handle_paste`] and honour the
//! returned [`Flow`], and call [`Editor::run_pending`] at every checkpoint
//! where deferred work may resume (the host's idle tick or microtask
//! drain).
//!
//! # Deferred work
//!
//! Each editor owns one FIFO queue and runs at most one piece of work at a
//! time. A handler that returns [`Outcome::Deferred`] parks its
//! continuation in the queue and the trigger reports
//! [`Completion::Pending`]. While anything is parked, new triggers queue
//! up behind it instead of running, so edits land in trigger order.
//! [`Editor::run_pending`] drains the queue front to back; a continuation
//! that defers again returns to the front and the drain stops there until
//! the next checkpoint. Every piece of work builds a fresh [`Context`], so
//! it sees the surface as it is when it runs.
//!
//! A trigger resolves its command before it looks at the queue: an
//! unknown name fails and a disabled command reports
//! [`Completion::Skipped`] right away, even while the queue is busy. A
//! parked trigger resolves the name again when it runs and is dropped if
//! the command has gone away or been disabled by then.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use n_input::{Event, KeyEvent};
use tracing::{debug, info, trace, warn};

use crate::clipboard::{Clipboard, NoClipboard};
use crate::command::{
    CommandSpec, Completion, Context, Continuation, Handler, Invocation, Outcome, TaskId,
};
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::extension::{self, Extension, Flow};
use crate::keymap::Keymap;
use crate::options::{Options, OptionsPatch};
use crate::registry::Registry;
use crate::surface::Surface;

/// What a host hands to [`Editor::bootstrap`] and [`Editor::reconfigure`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Built-in overrides and custom commands, in order.
    pub commands: Vec<CommandSpec>,
    pub options: OptionsPatch,
}

/// One built configuration. Swapped as a whole on reconfigure.
struct Installed {
    registry: Registry,
    options: Options,
    keymap: Keymap,
    extensions: Vec<Box<dyn Extension>>,
}

impl Installed {
    fn build(config: Config) -> Result<Self> {
        let options = Options::patched(config.options);
        let registry = Registry::build(config.commands)?;
        let keymap = Keymap::from_registry(&registry);
        let extensions = extension::install(&options)?;
        Ok(Self {
            registry,
            options,
            keymap,
            extensions,
        })
    }

    fn teardown(&mut self) {
        self.keymap.clear();
        self.extensions.clear();
    }
}

/// Parked work.
enum Task {
    /// A trigger that arrived while the queue was busy.
    Trigger {
        id: TaskId,
        name: String,
        invocation: Invocation,
    },
    /// A handler's deferred remainder.
    Resume {
        id: TaskId,
        continuation: Continuation,
        invocation: Invocation,
    },
}

impl Task {
    const fn id(&self) -> TaskId {
        match self {
            Self::Trigger { id, .. } | Self::Resume { id, .. } => *id,
        }
    }
}

/// The markdown command layer bound to one surface.
pub struct Editor<S: Surface> {
    surface: S,
    installed: Installed,
    clipboard: Box<dyn Clipboard>,
    queue: VecDeque<Task>,
    next_id: u64,
    disposed: bool,
}

impl<S: Surface> Editor<S> {
    // -- Lifecycle ----------------------------------------------------------

    /// Build the registry, keymap and extensions for `surface`.
    ///
    /// The editor starts without clipboard access; see
    /// [`with_clipboard`](Self::with_clipboard).
    ///
    /// # Errors
    ///
    /// Any configuration error: a bad shortcut string, a custom command
    /// without a handler, an invalid prefix pattern.
    pub fn bootstrap(surface: S, config: Config) -> Result<Self> {
        let installed = Installed::build(config)?;
        info!(
            commands = installed.registry.len(),
            shortcuts = installed.keymap.len(),
            extensions = installed.extensions.len(),
            "editor bootstrapped"
        );
        Ok(Self {
            surface,
            installed,
            clipboard: Box::new(NoClipboard),
            queue: VecDeque::new(),
            next_id: 0,
            disposed: false,
        })
    }

    /// Give handlers read access to a clipboard.
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    /// Swap in a new configuration. The old one stays in place when the
    /// new one fails to build. Queued triggers resolve against the new
    /// table when they run.
    ///
    /// # Errors
    ///
    /// See [`bootstrap`](Self::bootstrap).
    pub fn reconfigure(&mut self, config: Config) -> Result<()> {
        let installed = Installed::build(config)?;
        self.installed.teardown();
        self.installed = installed;
        self.disposed = false;
        info!(
            commands = self.installed.registry.len(),
            extensions = self.installed.extensions.len(),
            "editor reconfigured"
        );
        Ok(())
    }

    /// Release shortcut bindings and extensions and drop queued work.
    /// Key and paste events are ignored afterwards; explicit triggers
    /// still run.
    pub fn dispose(&mut self) {
        let dropped = self.queue.len();
        self.queue.clear();
        self.installed.teardown();
        self.disposed = true;
        info!(dropped, "editor disposed");
    }

    // -- Accessors ----------------------------------------------------------

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub const fn options(&self) -> &Options {
        &self.installed.options
    }

    pub const fn registry(&self) -> &Registry {
        &self.installed.registry
    }

    pub const fn keymap(&self) -> &Keymap {
        &self.installed.keymap
    }

    /// Number of parked tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    // -- Triggering ---------------------------------------------------------

    /// Fire command `name` with no key event or arguments.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownCommand`] when nothing is registered under `name`.
    pub fn trigger(&mut self, name: &str) -> Result<Completion> {
        self.trigger_with(name, Invocation::default())
    }

    /// Fire command `name` with a key event and/or arguments.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownCommand`] when nothing is registered under `name`.
    pub fn trigger_with(&mut self, name: &str, invocation: Invocation) -> Result<Completion> {
        let handler = self.enabled_handler(name)?;
        let Some(handler) = handler else {
            return Ok(Completion::Skipped);
        };

        if !self.queue.is_empty() {
            let id = self.allocate();
            debug!(command = name, task = %id, "queue busy, parking trigger");
            self.queue.push_back(Task::Trigger {
                id,
                name: name.to_owned(),
                invocation,
            });
            return Ok(Completion::Pending(id));
        }

        debug!(command = name, "trigger");
        match self.run(&invocation, |ctx| handler(ctx)) {
            Outcome::Done => Ok(Completion::Done),
            Outcome::Deferred(continuation) => {
                let id = self.allocate();
                debug!(command = name, task = %id, "deferred");
                self.queue.push_back(Task::Resume {
                    id,
                    continuation,
                    invocation,
                });
                Ok(Completion::Pending(id))
            }
        }
    }

    /// Run parked work in order. Returns how many tasks ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.queue.pop_front() {
            ran += 1;
            let (id, invocation, outcome) = match task {
                Task::Trigger {
                    id,
                    name,
                    invocation,
                } => {
                    let handler = match self.enabled_handler(&name) {
                        Ok(Some(handler)) => handler,
                        Ok(None) => {
                            debug!(command = %name, task = %id, "parked command disabled");
                            continue;
                        }
                        Err(err) => {
                            warn!(%err, task = %id, "parked command vanished");
                            continue;
                        }
                    };
                    trace!(command = %name, task = %id, "running parked trigger");
                    let outcome = self.run(&invocation, |ctx| handler(ctx));
                    (id, invocation, outcome)
                }
                Task::Resume {
                    id,
                    continuation,
                    invocation,
                } => {
                    trace!(task = %id, "resuming");
                    let outcome = self.run(&invocation, continuation);
                    (id, invocation, outcome)
                }
            };

            if let Outcome::Deferred(continuation) = outcome {
                debug!(task = %id, "deferred again");
                self.queue.push_front(Task::Resume {
                    id,
                    continuation,
                    invocation,
                });
                break;
            }
        }
        ran
    }

    /// Has task `id` finished (or been dropped)?
    #[must_use]
    pub fn is_settled(&self, id: TaskId) -> bool {
        id.0 < self.next_id && !self.queue.iter().any(|task| task.id() == id)
    }

    // -- Input events -------------------------------------------------------

    /// Route a key event: shortcut dispatch first, then every extension's
    /// key hook in installation order.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Flow {
        if self.disposed {
            return Flow::Continue;
        }

        let mut flow = Flow::Continue;
        if let Some(binding) = self.installed.keymap.lookup(event).cloned() {
            trace!(command = %binding.command, key = %event, "shortcut");
            if let Err(err) = self.trigger_with(&binding.command, Invocation::key(*event)) {
                warn!(%err, "shortcut bound to a missing command");
            }
            if binding.prevent_default {
                flow = Flow::PreventDefault;
            }
        }

        let options = &self.installed.options;
        for ext in &mut self.installed.extensions {
            let mut ctx = Context {
                cursor: Cursor::new(&mut self.surface),
                options,
                key_event: Some(*event),
                args: &[],
                clipboard: self.clipboard.as_ref(),
            };
            let verdict = ext.on_key(&mut ctx, event);
            if verdict.is_prevented() {
                trace!(extension = ext.name(), key = %event, "default prevented");
            }
            flow = flow.or(verdict);
        }
        flow
    }

    /// Route a paste through every extension's paste hook.
    pub fn handle_paste(&mut self, text: &str) -> Flow {
        if self.disposed {
            return Flow::Continue;
        }

        let options = &self.installed.options;
        let mut flow = Flow::Continue;
        for ext in &mut self.installed.extensions {
            let mut ctx = Context {
                cursor: Cursor::new(&mut self.surface),
                options,
                key_event: None,
                args: &[],
                clipboard: self.clipboard.as_ref(),
            };
            let verdict = ext.on_paste(&mut ctx, text);
            if verdict.is_prevented() {
                trace!(extension = ext.name(), "paste handled");
            }
            flow = flow.or(verdict);
        }
        flow
    }

    /// [`handle_key`](Self::handle_key) or
    /// [`handle_paste`](Self::handle_paste), by event kind.
    pub fn handle_event(&mut self, event: &Event) -> Flow {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => self.handle_paste(text),
        }
    }

    // -- Internals ----------------------------------------------------------

    /// The handler for `name`, or `None` when it is disabled.
    fn enabled_handler(&self, name: &str) -> Result<Option<Handler>> {
        let Some(command) = self.installed.registry.resolve(name) else {
            return Err(Error::UnknownCommand(name.to_owned()));
        };
        if command.is_enabled() {
            Ok(Some(Rc::clone(&command.handler)))
        } else {
            debug!(command = name, "disabled, skipping");
            Ok(None)
        }
    }

    const fn allocate(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Focus the surface and run `work` against a fresh context.
    fn run<F>(&mut self, invocation: &Invocation, work: F) -> Outcome
    where
        F: FnOnce(&mut Context<'_>) -> Outcome,
    {
        self.surface.focus();
        let mut ctx = Context {
            cursor: Cursor::new(&mut self.surface),
            options: &self.installed.options,
            key_event: invocation.key_event,
            args: &invocation.args,
            clipboard: self.clipboard.as_ref(),
        };
        work(&mut ctx)
    }
}

impl<S: Surface + fmt::Debug> fmt::Debug for Editor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("surface", &self.surface)
            .field("commands", &self.installed.registry.len())
            .field("shortcuts", &self.installed.keymap.len())
            .field(
                "extensions",
                &self
                    .installed
                    .extensions
                    .iter()
                    .map(|e| e.name())
                    .collect::<Vec<_>>(),
            )
            .field("pending", &self.queue.len())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
