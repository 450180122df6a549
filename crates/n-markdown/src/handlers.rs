//! Built-in command handlers.
//!
//! Thin glue over the cursor: each handler picks markup from the options
//! and calls one cursor primitive. The link helpers are shared with the
//! link-paste extension; `indent`, `outdent` and `next-line` run the same
//! edits as the Tab and Enter extensions.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::clipboard::clipboard_text;
use crate::command::{Context, Outcome};
use crate::cursor::{Markup, ReplaceOptions, WrapOptions};
use crate::extension::{self, PrefixWrapping};
use crate::line::{Line, char_len};
use crate::marker::Template;

static ORDERED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.){1,2}\s+").expect("ordered prefix regex"));

static HEADING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{0,6}\s+").expect("heading prefix regex"));

static QUOTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>\s+").expect("quote prefix regex"));

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?|ftp)://(-\.)?([^\s/?\.#-]+\.?)+(/[^\s]*)?$").expect("url regex")
});

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(https?|ftp)://(-\.)?([^\s/?\.#-]+\.?)+(/[^\s]*)?\.(png|tiff|tif|bmp|jpg|jpeg|gif|eps|webp|dib|svg)$",
    )
    .expect("image url regex")
});

static LINK_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[[^\]\n]*\]\([^)\n]*\)").expect("link markup regex"));

// ---------------------------------------------------------------------------
// Inline markup
// ---------------------------------------------------------------------------

pub fn bold(ctx: &mut Context<'_>) -> Outcome {
    let options = ctx.options;
    ctx.cursor.wrap(
        options.bold_syntax.as_str(),
        &WrapOptions::placeholder(&options.bold_placeholder),
    );
    Outcome::Done
}

pub fn italic(ctx: &mut Context<'_>) -> Outcome {
    let options = ctx.options;
    ctx.cursor.wrap(
        options.italic_syntax.as_str(),
        &WrapOptions::placeholder(&options.italic_placeholder),
    );
    Outcome::Done
}

pub fn strike_through(ctx: &mut Context<'_>) -> Outcome {
    let options = ctx.options;
    ctx.cursor.wrap(
        "~~",
        &WrapOptions::placeholder(&options.strike_through_placeholder),
    );
    Outcome::Done
}

pub fn code_inline(ctx: &mut Context<'_>) -> Outcome {
    let options = ctx.options;
    ctx.cursor.wrap(
        "`",
        &WrapOptions::placeholder(&options.code_inline_placeholder),
    );
    Outcome::Done
}

pub fn code_block(ctx: &mut Context<'_>) -> Outcome {
    let options = ctx.options;
    ctx.cursor.wrap(
        Markup::new("```\n", "\n```"),
        &WrapOptions::placeholder(&options.code_block_placeholder),
    );
    Outcome::Done
}

/// A fenced block for multi-line selections, inline code otherwise.
pub fn code(ctx: &mut Context<'_>) -> Outcome {
    let multiline = ctx
        .cursor
        .selection()
        .is_some_and(|selection| selection.lines.len() > 1);
    if multiline {
        code_block(ctx)
    } else {
        code_inline(ctx)
    }
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

pub fn link(ctx: &mut Context<'_>) -> Outcome {
    let options = ctx.options;
    insert_link(ctx, "", &options.link_text_placeholder, &options.link_url_placeholder);
    Outcome::Done
}

pub fn image(ctx: &mut Context<'_>) -> Outcome {
    let options = ctx.options;
    insert_link(ctx, "!", &options.image_text_placeholder, &options.image_url_placeholder);
    Outcome::Done
}

/// `[text](url)` with the URL selected; the text is the selection or the
/// placeholder.
fn insert_link(ctx: &mut Context<'_>, bang: &str, text_placeholder: &str, url: &str) {
    let selected = ctx.cursor.selection().map(|s| s.text);
    let text = selected
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(text_placeholder);
    let content = Template::new()
        .text(format!("{bang}["))
        .raw(text)
        .text("](")
        .marker()
        .text(url)
        .marker()
        .text(")");
    ctx.cursor.insert(content);
}

/// Turn the selection into a link to the URL on the clipboard.
///
/// The clipboard is read at the next checkpoint, and the selection is
/// re-read then too. Nothing happens when nothing non-URL is selected, the
/// selection already sits inside link markup, or the clipboard holds no
/// URL.
pub fn link_paste(ctx: &mut Context<'_>) -> Outcome {
    if !can_linkify(ctx) {
        return Outcome::Done;
    }
    Outcome::defer(|ctx| {
        let Some(url) = clipboard_text(ctx.clipboard) else {
            return Outcome::Done;
        };
        let url = url.trim();
        if is_url(url) && can_linkify(ctx) {
            if let Some(selection) = ctx.cursor.selection() {
                ctx.cursor.insert(link_markup(&selection.text, url));
            }
        }
        Outcome::Done
    })
}

/// A non-URL selection outside existing link markup.
pub(crate) fn can_linkify(ctx: &Context<'_>) -> bool {
    let Some(selection) = ctx.cursor.selection() else {
        return false;
    };
    !is_url(selection.text.trim())
        && !in_link_markup(
            &ctx.cursor.value(),
            selection.selection_start,
            selection.selection_end,
        )
}

/// `[text](url) ` (or `![text](url) ` for image URLs) with the caret after.
pub(crate) fn link_markup(text: &str, url: &str) -> Template {
    let bang = if is_image_url(url) { "!" } else { "" };
    Template::new()
        .text(format!("{bang}["))
        .raw(text)
        .text("](")
        .raw(url)
        .text(") ")
        .marker()
}

#[must_use]
pub fn is_url(text: &str) -> bool {
    URL.is_match(text)
}

#[must_use]
pub fn is_image_url(text: &str) -> bool {
    IMAGE_URL.is_match(text)
}

/// Does `[start, end)` reach into a `[..](..)` span of `value`?
#[must_use]
pub fn in_link_markup(value: &str, start: usize, end: usize) -> bool {
    let inner_start = start + 1;
    let inner_end = end.saturating_sub(1);
    LINK_MARKUP.find_iter(value).any(|m| {
        let from = char_len(&value[..m.start()]);
        let to = from + char_len(m.as_str());
        (from..to).contains(&inner_start) || (from..to).contains(&inner_end)
    })
}

// ---------------------------------------------------------------------------
// Line prefixes
// ---------------------------------------------------------------------------

/// Lines the command acts on: the selected ones, or the caret line.
fn affected_lines(ctx: &Context<'_>) -> (Vec<Line>, bool) {
    match ctx.cursor.selection() {
        Some(selection) => (selection.lines, true),
        None => (vec![ctx.cursor.position().line], false),
    }
}

pub fn ordered_list(ctx: &mut Context<'_>) -> Outcome {
    let (lines, selected) = affected_lines(ctx);
    let undo = lines.iter().all(|line| ORDERED_PREFIX.is_match(&line.text));
    ctx.cursor.replace_current_lines(
        |line, index, _| {
            let text = if undo {
                ORDERED_PREFIX.replace(&line.text, "").into_owned()
            } else {
                format!("{}. {}", index + 1, line.text)
            };
            Some(Template::new().raw(text))
        },
        ReplaceOptions {
            select_replaced: selected,
        },
    );
    Outcome::Done
}

pub fn unordered_list(ctx: &mut Context<'_>) -> Outcome {
    let syntax = ctx.options.unordered_list_syntax.as_str();
    let (lines, selected) = affected_lines(ctx);
    let undo = lines
        .iter()
        .all(|line| strip_bullet(&line.text, syntax).is_some());
    ctx.cursor.replace_current_lines(
        |line, _, _| {
            let text = if undo {
                strip_bullet(&line.text, syntax)
                    .unwrap_or(&line.text)
                    .to_owned()
            } else {
                format!("{syntax} {}", line.text)
            };
            Some(Template::new().raw(text))
        },
        ReplaceOptions {
            select_replaced: selected,
        },
    );
    Outcome::Done
}

/// `text` without a leading `bullet` and the whitespace after it.
fn strip_bullet<'t>(text: &'t str, bullet: &str) -> Option<&'t str> {
    let rest = text.strip_prefix(bullet)?;
    let body = rest.trim_start();
    (body.len() < rest.len()).then_some(body)
}

/// Quote the affected block: `> ` on the first line, existing quoting
/// stripped, the quoted content selected.
pub fn block_quotes(ctx: &mut Context<'_>) -> Outcome {
    let placeholder = ctx.options.block_quotes_placeholder.as_str();
    ctx.cursor.replace_current_lines(
        |line, index, block| {
            let first = index == 0;
            let last = index + 1 == block.len();
            let stripped = QUOTE_PREFIX.replace(&line.text, "");
            let content = if stripped.is_empty() && first {
                placeholder
            } else {
                stripped.as_ref()
            };

            let mut template = Template::new();
            if first {
                template = template.text("> ").marker();
            }
            template = template.raw(content);
            if last {
                template = template.marker();
            }
            Some(template)
        },
        ReplaceOptions::default(),
    );
    Outcome::Done
}

/// Toggle a level-`level` heading on the caret line and select its text.
pub fn headline(ctx: &mut Context<'_>, level: u8) -> Outcome {
    let level = level.clamp(1, 6);
    let prefix = format!("{} ", "#".repeat(usize::from(level)));
    let line = ctx.cursor.position().line;
    let undo = line.text.starts_with(&prefix);
    let stripped = HEADING_PREFIX.replace(&line.text, "");
    let content = if stripped.is_empty() {
        ctx.options.headline_placeholder(level)
    } else {
        stripped.into_owned()
    };

    let template = Template::new()
        .text(if undo { "" } else { prefix.as_str() })
        .marker()
        .raw(content)
        .marker();
    ctx.cursor.replace_line(line.line_number, Some(template));
    Outcome::Done
}

// ---------------------------------------------------------------------------
// Indentation and line breaks
// ---------------------------------------------------------------------------

pub fn indent(ctx: &mut Context<'_>) -> Outcome {
    extension::indent(&mut ctx.cursor);
    Outcome::Done
}

pub fn outdent(ctx: &mut Context<'_>) -> Outcome {
    extension::outdent_lines(&mut ctx.cursor);
    Outcome::Done
}

/// Break the caret line, continuing the list when it is one.
pub fn next_line(ctx: &mut Context<'_>) -> Outcome {
    let wrapping = PrefixWrapping::new(ctx.options).unwrap_or_else(|err| {
        warn!(%err, "ignoring custom prefix rules");
        PrefixWrapping::default()
    });
    if !wrapping.continue_line(&mut ctx.cursor).is_prevented() {
        ctx.cursor.insert("\n");
    }
    Outcome::Done
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::cursor::Cursor;
    use crate::options::{ListSyntax, Options};
    use crate::surface::TextArea;
    use pretty_assertions::assert_eq;

    fn run_with(
        notation: &str,
        options: &Options,
        f: impl FnOnce(&mut Context<'_>) -> Outcome,
    ) -> String {
        let mut area = TextArea::from_notation(notation).unwrap();
        let clipboard = MemoryClipboard::new();
        let mut ctx = Context {
            cursor: Cursor::new(&mut area),
            options,
            key_event: None,
            args: &[],
            clipboard: &clipboard,
        };
        assert!(f(&mut ctx).is_done());
        area.to_notation()
    }

    fn run(notation: &str, f: impl FnOnce(&mut Context<'_>) -> Outcome) -> String {
        run_with(notation, &Options::default(), f)
    }

    // -- Inline ---------------------------------------------------------------

    #[test]
    fn bold_toggles() {
        assert_eq!(run("<>", bold), "**<bold>**");
        assert_eq!(run("**<some>** string", bold), "<some> string");
        assert_eq!(run("<some> string", bold), "**<some>** string");
    }

    #[test]
    fn bold_uses_configured_syntax() {
        let options = Options {
            bold_syntax: crate::options::BoldSyntax::Underscores,
            ..Options::default()
        };
        assert_eq!(run_with("<x>", &options, bold), "__<x>__");
    }

    #[test]
    fn italic_strike_code() {
        assert_eq!(run("<>", italic), "*<italic>*");
        assert_eq!(run("<a>", strike_through), "~~<a>~~");
        assert_eq!(run("<>", code_inline), "`<code>`");
        assert_eq!(run("<>", code_block), "```\n<code block>\n```");
    }

    #[test]
    fn code_picks_block_for_multiline() {
        assert_eq!(run("<a\nb>", code), "```\n<a\nb>\n```");
        assert_eq!(run("<ab>", code), "`<ab>`");
        assert_eq!(run("x<>", code), "x`<code>`");
    }

    // -- Links ---------------------------------------------------------------

    #[test]
    fn link_selects_url_placeholder() {
        assert_eq!(run("<>", link), "[example](<url>)");
        assert_eq!(run("see <docs>!", link), "see [docs](<url>)!");
    }

    #[test]
    fn image_selects_url_placeholder() {
        assert_eq!(run("<>", image), "![image](<image.png>)");
    }

    #[test]
    fn url_detection() {
        assert!(is_url("https://example.com"));
        assert!(is_url("ftp://files.example.com/a/b.txt"));
        assert!(is_url("HTTP://EXAMPLE.COM/path?q=1"));
        assert!(!is_url("example.com"));
        assert!(!is_url("see https://example.com"));
        assert!(!is_url("https://exa mple.com"));
    }

    #[test]
    fn image_url_detection() {
        assert!(is_image_url("https://example.com/cat.png"));
        assert!(is_image_url("https://example.com/cat.JPEG"));
        assert!(!is_image_url("https://example.com/cat.png.html"));
        assert!(!is_image_url("https://example.com/"));
    }

    #[test]
    fn link_markup_detection() {
        let value = "a [title](https://x.io) b";
        assert!(in_link_markup(value, 3, 8));
        assert!(in_link_markup(value, 10, 15));
        assert!(!in_link_markup(value, 24, 25));
        assert!(!in_link_markup("plain", 0, 5));
        // Right after the closing paren is outside the markup.
        assert!(!in_link_markup("[a](b)x", 6, 7));
        assert!(in_link_markup("[a](b)x", 4, 7));
    }

    #[test]
    fn link_markup_for_images() {
        assert_eq!(
            link_markup("cat", "https://x.io/cat.gif").render().text,
            "![cat](https://x.io/cat.gif) "
        );
    }

    #[test]
    fn link_paste_defers_then_reads_clipboard() {
        let mut area = TextArea::from_notation("<title>").unwrap();
        let clipboard = MemoryClipboard::with_text("https://example.com");
        let options = Options::default();
        let mut ctx = Context {
            cursor: Cursor::new(&mut area),
            options: &options,
            key_event: None,
            args: &[],
            clipboard: &clipboard,
        };
        let Outcome::Deferred(rest) = link_paste(&mut ctx) else {
            panic!("expected a deferral");
        };
        assert!(rest(&mut ctx).is_done());
        assert_eq!(area.to_notation(), "[title](https://example.com) <>");
    }

    #[test]
    fn link_paste_skips_url_selection() {
        assert_eq!(run("<https://a.io>", link_paste), "<https://a.io>");
        assert_eq!(run("<>", link_paste), "<>");
    }

    // -- Lists ---------------------------------------------------------------

    #[test]
    fn ordered_list_toggles_caret_line() {
        assert_eq!(run("some item<>", ordered_list), "1. some item<>");
        assert_eq!(run("1. some item<>", ordered_list), "some item<>");
    }

    #[test]
    fn ordered_list_numbers_selection() {
        assert_eq!(run("<a\nb\nc>", ordered_list), "<1. a\n2. b\n3. c>");
        assert_eq!(run("<1. a\n2. b>", ordered_list), "<a\nb>");
    }

    #[test]
    fn ordered_list_mixed_block_prefixes_all() {
        assert_eq!(run("<1. a\nb>", ordered_list), "<1. 1. a\n2. b>");
    }

    #[test]
    fn unordered_list_toggles() {
        assert_eq!(run("<a\nb>", unordered_list), "<- a\n- b>");
        assert_eq!(run("<- a\n- b>", unordered_list), "<a\nb>");
        assert_eq!(run("item<>", unordered_list), "- item<>");
    }

    #[test]
    fn unordered_list_uses_configured_bullet() {
        let options = Options {
            unordered_list_syntax: ListSyntax::Plus,
            ..Options::default()
        };
        assert_eq!(run_with("x<>", &options, unordered_list), "+ x<>");
        assert_eq!(run_with("+ x<>", &options, unordered_list), "x<>");
        // A dash list is not a plus list.
        assert_eq!(run_with("- x<>", &options, unordered_list), "+ - x<>");
    }

    #[test]
    fn strip_bullet_needs_whitespace() {
        assert_eq!(strip_bullet("- a", "-"), Some("a"));
        assert_eq!(strip_bullet("-a", "-"), None);
        assert_eq!(strip_bullet("-   ", "-"), Some(""));
    }

    // -- Quotes and headings ---------------------------------------------------

    #[test]
    fn block_quote_selects_content() {
        assert_eq!(run("<>", block_quotes), "> <quote>");
        assert_eq!(run("hello<>", block_quotes), "> <hello>");
        assert_eq!(run("<a\nb>", block_quotes), "> <a\nb>");
        assert_eq!(run("> old<>", block_quotes), "> <old>");
    }

    #[test]
    fn headline_toggles_and_switches_level() {
        assert_eq!(run("<>", |c| headline(c, 2)), "## <headline 2>");
        assert_eq!(run("title<>", |c| headline(c, 1)), "# <title>");
        assert_eq!(run("# title<>", |c| headline(c, 1)), "<title>");
        assert_eq!(run("# title<>", |c| headline(c, 3)), "### <title>");
    }

    #[test]
    fn headline_only_touches_caret_line() {
        assert_eq!(run("a\nb<>\nc", |c| headline(c, 1)), "a\n# <b>\nc");
    }

    // -- Indentation and line breaks --------------------------------------------

    #[test]
    fn indent_command() {
        assert_eq!(run("some<>", indent), "some    <>");
        assert_eq!(run("<a\nb>", indent), "<    a\n    b>");
    }

    #[test]
    fn outdent_command() {
        assert_eq!(run("      x<>", outdent), "  x<>");
        assert_eq!(run("<    a\n  b>", outdent), "<a\nb>");
    }

    #[test]
    fn next_line_continues_lists() {
        assert_eq!(
            run("1. option 1\n2. option 2\n3. option 3<>", next_line),
            "1. option 1\n2. option 2\n3. option 3\n4. <>"
        );
        assert_eq!(run("- a\n- <>", next_line), "- a\n\n<>");
    }

    #[test]
    fn next_line_breaks_plain_lines() {
        assert_eq!(run("ab<>cd", next_line), "ab\n<>cd");
        assert_eq!(run("a<bc>d", next_line), "a\n<>d");
        assert_eq!(run("<>- item", next_line), "\n<>- item");
    }

    #[test]
    fn next_line_uses_custom_prefixes() {
        let options = Options {
            custom_prefix_wrapping: vec![crate::options::PrefixWrapping::Literal(
                "> ".to_owned(),
            )],
            ..Options::default()
        };
        assert_eq!(run_with("> quote<>", &options, next_line), "> quote\n> <>");
    }
}
