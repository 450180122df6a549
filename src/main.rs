// SPDX-License-Identifier: MIT
//
// n-mark — drive the markdown command layer from the command line.
//
// A buffer is written in selection notation: `<` marks the selection start,
// `>` the end, so `"**<some>** string"` selects `some` and `"item<>"` is a
// caret after `item`. The binary loads it into an in-memory text area,
// replays a script of steps against a bootstrapped editor, and prints the
// result in the same notation:
//
//   n-mark run '- one<>' key:enter type:two key:enter key:enter
//   n-mark run '<title>' paste:https://example.com
//   n-mark run 'some item<>' cmd:ordered-list
//
// Each step flows the way a host's event would:
//
//   step → Editor (shortcuts, extensions) → Flow
//        → TextArea default behavior unless prevented
//        → run_pending (deferred work resumes)

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use n_input::{Chord, Event, KeyCode, KeyEvent};
use n_markdown::{Config, Editor, Invocation, MemoryClipboard, OptionsPatch, TextArea};

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "n-mark",
    about = "Markdown editing commands for plain-text buffers",
    version
)]
struct Cli {
    /// JSON file with option overrides (snake_case keys)
    #[arg(short, long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay steps against a buffer and print the result
    Run {
        /// Buffer in selection notation, or `-` to read it from stdin
        buffer: String,

        /// Steps: cmd:NAME[=JSON], key:CHORD, type:TEXT, paste:TEXT
        steps: Vec<Step>,

        /// Text the clipboard holds for link-paste
        #[arg(short, long)]
        clipboard: Option<String>,

        /// Print the buffer after every step (to stderr)
        #[arg(short, long)]
        trace: bool,
    },
    /// List the command table with shortcuts
    Commands,
    /// Print the resolved options as JSON
    Options,
}

// ─── Steps ──────────────────────────────────────────────────────────────────

/// One scripted action.
#[derive(Debug, Clone)]
enum Step {
    /// Trigger a command by name, optionally with JSON arguments.
    Command { name: String, args: Vec<Value> },
    /// Press a key chord.
    Key(KeyEvent),
    /// Press a key per character.
    Type(String),
    /// Paste text.
    Paste(String),
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((kind, rest)) = s.split_once(':') else {
            return Err(format!("step {s:?} needs a kind prefix (cmd:, key:, type:, paste:)"));
        };
        match kind {
            "cmd" => {
                let (name, args) = match rest.split_once('=') {
                    Some((name, json)) => (name, parse_args(json)?),
                    None => (rest, Vec::new()),
                };
                if name.is_empty() {
                    return Err(format!("step {s:?} names no command"));
                }
                Ok(Self::Command {
                    name: name.to_owned(),
                    args,
                })
            }
            "key" => {
                let chord: Chord = rest.parse().map_err(|e| format!("{e}"))?;
                Ok(Self::Key(KeyEvent::new(chord.code, chord.modifiers)))
            }
            "type" => Ok(Self::Type(rest.to_owned())),
            "paste" => Ok(Self::Paste(rest.to_owned())),
            other => Err(format!("unknown step kind {other:?}")),
        }
    }
}

/// A JSON array is the argument list; any other value is one argument.
fn parse_args(json: &str) -> Result<Vec<Value>, String> {
    match serde_json::from_str(json) {
        Ok(Value::Array(args)) => Ok(args),
        Ok(value) => Ok(vec![value]),
        Err(e) => Err(format!("bad JSON arguments {json:?}: {e}")),
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command { name, args } if args.is_empty() => write!(f, "cmd:{name}"),
            Self::Command { name, args } => write!(f, "cmd:{name}={}", Value::from(args.clone())),
            Self::Key(key) => write!(f, "key:{key}"),
            Self::Type(text) => write!(f, "type:{text}"),
            Self::Paste(text) => write!(f, "paste:{text}"),
        }
    }
}

// ─── Replay ─────────────────────────────────────────────────────────────────

/// Deliver an input event the way a host does: hooks first, the default
/// behavior only when nobody prevented it.
fn deliver(editor: &mut Editor<TextArea>, event: &Event) {
    let flow = editor.handle_event(event);
    if flow.is_prevented() {
        debug!(?event, "default prevented");
    } else {
        editor.surface_mut().apply_default(event);
    }
}

fn apply(editor: &mut Editor<TextArea>, step: &Step) -> Result<()> {
    match step {
        Step::Command { name, args } => {
            let completion = editor
                .trigger_with(name, Invocation::args(args.iter().cloned()))
                .with_context(|| format!("step {step}"))?;
            debug!(command = %name, ?completion, "triggered");
        }
        Step::Key(key) => deliver(editor, &Event::Key(*key)),
        Step::Type(text) => {
            for ch in text.chars() {
                let code = if ch == '\n' {
                    KeyCode::Enter
                } else {
                    KeyCode::Char(ch)
                };
                deliver(editor, &Event::Key(KeyEvent::press(code)));
                editor.run_pending();
            }
        }
        Step::Paste(text) => deliver(editor, &Event::Paste(text.clone())),
    }
    editor.run_pending();
    Ok(())
}

fn run(
    config: Config,
    buffer: &str,
    steps: &[Step],
    clipboard: Option<String>,
    trace: bool,
) -> Result<String> {
    let area = TextArea::from_notation(buffer).context("reading the buffer")?;
    let mut editor = Editor::bootstrap(area, config)?
        .with_clipboard(clipboard.map_or_else(MemoryClipboard::new, MemoryClipboard::with_text));

    for step in steps {
        apply(&mut editor, step)?;
        if trace {
            eprintln!("{:<24} {:?}", step.to_string(), editor.surface().to_notation());
        }
    }
    if editor.pending() > 0 {
        info!(pending = editor.pending(), "work still deferred at exit");
    }
    Ok(editor.surface().to_notation())
}

// ─── Setup ──────────────────────────────────────────────────────────────────

fn load_options(path: Option<&PathBuf>) -> Result<OptionsPatch> {
    let Some(path) = path else {
        return Ok(OptionsPatch::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_buffer(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_owned());
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    // A trailing newline from `echo` is not part of the buffer.
    if buffer.ends_with('\n') {
        buffer.pop();
    }
    Ok(buffer)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "n_mark=info,n_markdown=info".into()),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config {
        options: load_options(cli.options.as_ref())?,
        ..Config::default()
    };

    match cli.command {
        Commands::Run {
            buffer,
            steps,
            clipboard,
            trace,
        } => {
            let buffer = read_buffer(&buffer)?;
            println!("{}", run(config, &buffer, &steps, clipboard, trace)?);
        }
        Commands::Commands => {
            let editor = Editor::bootstrap(TextArea::new(), config)?;
            for command in editor.registry().iter() {
                let shortcut: Vec<String> = command.shortcut.iter().map(ToString::to_string).collect();
                let state = if command.is_enabled() { "" } else { " (disabled)" };
                println!("{:<16} {}{state}", command.name, shortcut.join(", "));
            }
        }
        Commands::Options => {
            let editor = Editor::bootstrap(TextArea::new(), config)?;
            println!("{}", serde_json::to_string_pretty(editor.options())?);
        }
    }
    Ok(())
}
