//! Extensions — behaviors bound to raw key and paste events.
//!
//! The editor runs every installed extension's hook for each event, in
//! installation order, after shortcut dispatch. A hook that substitutes
//! its own edit for the host's default returns [`Flow::PreventDefault`];
//! on anything it doesn't recognise it returns [`Flow::Continue`] and
//! leaves the surface alone.
//!
//! | Extension                  | Event               | Toggle                                         |
//! |----------------------------|---------------------|------------------------------------------------|
//! | [`IndentExtension`]        | Tab, Shift+Tab      | `enable_indent_extension`                      |
//! | [`LinkPasteExtension`]     | paste               | `enable_link_paste_extension`                  |
//! | [`OrderedListAutocorrect`] | Enter               | `enable_ordered_list_autocorrect_extension`    |
//! | [`PrefixWrapping`]         | Enter               | `enable_prefix_wrapping_extension`             |
//! | [`LineRemoveExtension`]    | `line_remove_shortcut` | `enable_proper_line_remove_behavior_extension` |

use std::sync::LazyLock;

use n_input::{Chord, KeyCode, KeyEvent, Modifiers, parse_chords};
use regex::Regex;
use tracing::{debug, trace};

use crate::command::Context;
use crate::cursor::{Cursor, Position, ReplaceOptions, SelectRange};
use crate::error::Result;
use crate::handlers::{can_linkify, is_url, link_markup};
use crate::line::{Line, char_len};
use crate::marker::Template;
use crate::options::{Options, PrefixRule};

const INDENT: &str = "    ";

static LIST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>\s*)(?P<marker>-|\+|\*|(?:\d+\.){1,2})\s+(?P<content>.*)$")
        .expect("list line regex")
});

static PAREN_ORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*\d+)\)(\s)").expect("paren ordered regex"));

// ---------------------------------------------------------------------------
// Hook protocol
// ---------------------------------------------------------------------------

/// A hook's verdict on the host's default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Let the host do its default.
    #[default]
    Continue,
    /// The hook already did the work; skip the default.
    PreventDefault,
}

impl Flow {
    /// Prevented if either side prevented.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Continue, Self::Continue) => Self::Continue,
            _ => Self::PreventDefault,
        }
    }

    #[must_use]
    pub const fn is_prevented(self) -> bool {
        matches!(self, Self::PreventDefault)
    }
}

/// An independently toggled input behavior.
pub trait Extension {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn on_key(&mut self, _ctx: &mut Context<'_>, _event: &KeyEvent) -> Flow {
        Flow::Continue
    }

    fn on_paste(&mut self, _ctx: &mut Context<'_>, _text: &str) -> Flow {
        Flow::Continue
    }
}

/// The extensions `options` enable, in hook order.
///
/// # Errors
///
/// A custom prefix pattern that doesn't compile, or a line-remove chord
/// that doesn't parse.
pub fn install(options: &Options) -> Result<Vec<Box<dyn Extension>>> {
    let mut extensions: Vec<Box<dyn Extension>> = Vec::new();
    if options.enable_indent_extension {
        extensions.push(Box::new(IndentExtension));
    }
    if options.enable_link_paste_extension {
        extensions.push(Box::new(LinkPasteExtension));
    }
    if options.enable_ordered_list_autocorrect_extension {
        extensions.push(Box::new(OrderedListAutocorrect));
    }
    if options.enable_prefix_wrapping_extension {
        extensions.push(Box::new(PrefixWrapping::new(options)?));
    }
    if options.enable_proper_line_remove_behavior_extension {
        extensions.push(Box::new(LineRemoveExtension::new(options)?));
    }
    debug!(
        installed = ?extensions.iter().map(|e| e.name()).collect::<Vec<_>>(),
        "extensions installed"
    );
    Ok(extensions)
}

fn is_plain(event: &KeyEvent, code: KeyCode) -> bool {
    event.is(code, Modifiers::empty())
}

// ---------------------------------------------------------------------------
// Indent
// ---------------------------------------------------------------------------

/// Tab indents by four spaces, Shift+Tab outdents by up to four.
#[derive(Debug, Default)]
pub struct IndentExtension;

impl Extension for IndentExtension {
    fn name(&self) -> &'static str {
        "indent"
    }

    fn on_key(&mut self, ctx: &mut Context<'_>, event: &KeyEvent) -> Flow {
        if is_plain(event, KeyCode::Tab) {
            indent(&mut ctx.cursor);
            return Flow::PreventDefault;
        }
        if event.is(KeyCode::Tab, Modifiers::SHIFT) {
            outdent_lines(&mut ctx.cursor);
            return Flow::PreventDefault;
        }
        Flow::Continue
    }
}

/// Insert one indent at the caret, or indent every selected line.
pub(crate) fn indent(cursor: &mut Cursor<'_>) {
    if cursor.selection().is_none() {
        cursor.insert(INDENT);
        return;
    }
    cursor.replace_current_lines(
        |line, _, _| Some(Template::new().text(INDENT).raw(&line.text)),
        ReplaceOptions {
            select_replaced: true,
        },
    );
}

/// Remove up to one indent from the caret line or every selected line.
pub(crate) fn outdent_lines(cursor: &mut Cursor<'_>) {
    let selected = cursor.selection().is_some();
    cursor.replace_current_lines(
        |line, _, _| Some(Template::new().raw(outdent(&line.text))),
        ReplaceOptions {
            select_replaced: selected,
        },
    );
}

/// `text` without up to four leading whitespace chars.
fn outdent(text: &str) -> &str {
    let cut: usize = text
        .chars()
        .take(INDENT.len())
        .take_while(|c| c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    &text[cut..]
}

// ---------------------------------------------------------------------------
// Link paste
// ---------------------------------------------------------------------------

/// Pasting a URL over selected text links the text.
#[derive(Debug, Default)]
pub struct LinkPasteExtension;

impl Extension for LinkPasteExtension {
    fn name(&self) -> &'static str {
        "link-paste"
    }

    fn on_paste(&mut self, ctx: &mut Context<'_>, text: &str) -> Flow {
        let url = text.trim();
        if !is_url(url) || !can_linkify(ctx) {
            return Flow::Continue;
        }
        let Some(selection) = ctx.cursor.selection() else {
            return Flow::Continue;
        };
        trace!(url, "linking selection");
        ctx.cursor.insert(link_markup(&selection.text, url));
        Flow::PreventDefault
    }
}

// ---------------------------------------------------------------------------
// Prefix wrapping
// ---------------------------------------------------------------------------

/// Enter on a list line continues the list.
#[derive(Debug, Default)]
pub struct PrefixWrapping {
    custom: Vec<PrefixRule>,
}

/// How the caret line matched.
struct NextLine {
    indent: String,
    /// Chars the matched prefix covers at the start of the line.
    prefix_len: usize,
    next_prefix: String,
    blank: bool,
    break_if_empty: bool,
}

impl PrefixWrapping {
    /// Compile the custom rules from `options`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPattern`](crate::Error::InvalidPattern) for a bad
    /// custom pattern.
    pub fn new(options: &Options) -> Result<Self> {
        let custom = options
            .custom_prefix_wrapping
            .iter()
            .map(crate::options::PrefixWrapping::compile)
            .collect::<Result<_>>()?;
        Ok(Self { custom })
    }

    /// Break the caret line, carrying its list prefix onto the new line.
    ///
    /// Returns [`Flow::Continue`] without a line break when the caret line
    /// isn't a list item, the selection spans lines, or the caret sits
    /// inside the prefix. An empty item that ends the list is cleared
    /// first and also returns [`Flow::Continue`].
    pub fn continue_line(&self, cursor: &mut Cursor<'_>) -> Flow {
        let Position { line, cursor_at } = cursor.position();
        let end = cursor.selection().map_or(cursor_at, |s| s.selection_end);
        if end > line.ends_at {
            // Multi-line selection: plain newline.
            return Flow::Continue;
        }
        let Some(next) = self.match_line(&line) else {
            return Flow::Continue;
        };

        if next.blank && next.break_if_empty {
            debug!(line = line.line_number, "breaking list");
            cursor.replace_line(line.line_number, Some(Template::new()));
            return Flow::Continue;
        }
        if line.column_of(cursor_at) < next.prefix_len {
            trace!(line = line.line_number, "caret inside list prefix");
            return Flow::Continue;
        }

        let rest = line.after(line.column_of(end)).to_owned();
        cursor.select(SelectRange::Absolute {
            start: cursor_at,
            end: line.ends_at,
        });
        cursor.insert(
            Template::new()
                .text("\n")
                .raw(&next.indent)
                .text(&next.next_prefix)
                .marker()
                .raw(rest),
        );
        Flow::PreventDefault
    }

    fn match_line(&self, line: &Line) -> Option<NextLine> {
        for rule in &self.custom {
            if let Some(m) = rule.pattern.find(&line.text) {
                let indent = if rule.save_indent {
                    line.indentation().to_owned()
                } else {
                    String::new()
                };
                return Some(NextLine {
                    indent,
                    prefix_len: char_len(&line.text[..m.end()]),
                    next_prefix: rule.prefix.clone(),
                    blank: line.text[m.end()..].trim().is_empty(),
                    break_if_empty: rule.break_if_empty,
                });
            }
        }

        let caps = LIST_LINE.captures(&line.text)?;
        let content = caps.name("content")?;
        Some(NextLine {
            indent: caps["indent"].to_owned(),
            prefix_len: char_len(&line.text[..content.start()]),
            next_prefix: format!("{} ", next_list_marker(&caps["marker"])?),
            blank: caps["content"].trim().is_empty(),
            break_if_empty: true,
        })
    }
}

impl Extension for PrefixWrapping {
    fn name(&self) -> &'static str {
        "prefix-wrapping"
    }

    fn on_key(&mut self, ctx: &mut Context<'_>, event: &KeyEvent) -> Flow {
        if !is_plain(event, KeyCode::Enter) {
            return Flow::Continue;
        }
        self.continue_line(&mut ctx.cursor)
    }
}

/// The marker for the next list item: bullets repeat, numbers count up in
/// their last segment (`1.` → `2.`, `1.9.` → `1.10.`).
///
/// `None` when the last segment isn't a number or has no successor.
#[must_use]
pub fn next_list_marker(marker: &str) -> Option<String> {
    let Some(numbers) = marker.strip_suffix('.') else {
        return Some(marker.to_owned());
    };
    let mut segments: Vec<String> = numbers.split('.').map(str::to_owned).collect();
    let last = segments.last_mut()?;
    let n: u64 = last.parse().ok()?;
    *last = n.checked_add(1)?.to_string();
    Some(format!("{}.", segments.join(".")))
}

// ---------------------------------------------------------------------------
// Ordered-list autocorrect
// ---------------------------------------------------------------------------

/// Enter on a `1) item` line rewrites it to `1. item` first.
#[derive(Debug, Default)]
pub struct OrderedListAutocorrect;

impl Extension for OrderedListAutocorrect {
    fn name(&self) -> &'static str {
        "ordered-list-autocorrect"
    }

    fn on_key(&mut self, ctx: &mut Context<'_>, event: &KeyEvent) -> Flow {
        if !is_plain(event, KeyCode::Enter) {
            return Flow::Continue;
        }
        let line = ctx.cursor.position().line;
        if !PAREN_ORDERED.is_match(&line.text) {
            return Flow::Continue;
        }
        let fixed = PAREN_ORDERED.replace(&line.text, "$1.$2").into_owned();
        let (start, end) = ctx
            .cursor
            .selection()
            .map_or_else(
                || {
                    let at = ctx.cursor.position().cursor_at;
                    (at, at)
                },
                |s| (s.selection_start, s.selection_end),
            );
        debug!(line = line.line_number, "autocorrecting ordered marker");
        ctx.cursor
            .replace_line(line.line_number, Some(Template::new().raw(fixed)));
        ctx.cursor.select(SelectRange::Absolute { start, end });
        Flow::Continue
    }
}

// ---------------------------------------------------------------------------
// Line remove
// ---------------------------------------------------------------------------

/// The line-remove chord on an empty line deletes the line itself.
#[derive(Debug)]
pub struct LineRemoveExtension {
    chords: Vec<Chord>,
}

impl LineRemoveExtension {
    /// # Errors
    ///
    /// A `line_remove_shortcut` entry that doesn't parse.
    pub fn new(options: &Options) -> Result<Self> {
        Ok(Self {
            chords: parse_chords(&options.line_remove_shortcut)?,
        })
    }
}

impl Extension for LineRemoveExtension {
    fn name(&self) -> &'static str {
        "line-remove"
    }

    fn on_key(&mut self, ctx: &mut Context<'_>, event: &KeyEvent) -> Flow {
        if !self.chords.iter().any(|c| c.matches(event)) {
            return Flow::Continue;
        }
        let line = ctx.cursor.position().line;
        if !line.is_empty() || ctx.cursor.selection().is_some() {
            return Flow::Continue;
        }
        ctx.cursor.replace_line(line.line_number, None);
        Flow::PreventDefault
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
