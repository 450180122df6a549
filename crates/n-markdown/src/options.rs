//! Editor options — syntax preferences, placeholders, extension toggles.
//!
//! [`Options`] is the resolved record every handler reads. Hosts never
//! build it field by field: they supply an [`OptionsPatch`] (typically
//! deserialized from JSON) and [`Options::patched`] lays it shallowly over
//! the defaults.
//!
//! | Option                                         | Default              |
//! |------------------------------------------------|----------------------|
//! | `bold_syntax`                                  | `**`                 |
//! | `italic_syntax`                                | `*`                  |
//! | `unordered_list_syntax`                        | `-`                  |
//! | `bold_placeholder`                             | `bold`               |
//! | `italic_placeholder`                           | `italic`             |
//! | `strike_through_placeholder`                   | `strike through`     |
//! | `code_inline_placeholder`                      | `code`               |
//! | `code_block_placeholder`                       | `code block`         |
//! | `headline_placeholder`                         | `headline {level}`   |
//! | `block_quotes_placeholder`                     | `quote`              |
//! | `link_text_placeholder`                        | `example`            |
//! | `link_url_placeholder`                         | `url`                |
//! | `image_text_placeholder`                       | `image`              |
//! | `image_url_placeholder`                        | `image.png`          |
//! | `enable_indent_extension`                      | true                 |
//! | `enable_link_paste_extension`                  | true                 |
//! | `enable_prefix_wrapping_extension`             | true                 |
//! | `enable_proper_line_remove_behavior_extension` | true                 |
//! | `enable_ordered_list_autocorrect_extension`    | false                |
//! | `custom_prefix_wrapping`                       | none                 |
//! | `line_remove_shortcut`                         | `command+backspace`, `ctrl+backspace` |

use n_input::meta_combination;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Syntax choices
// ---------------------------------------------------------------------------

/// Markup used for bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoldSyntax {
    #[default]
    #[serde(rename = "**")]
    Asterisks,
    #[serde(rename = "__")]
    Underscores,
}

impl BoldSyntax {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asterisks => "**",
            Self::Underscores => "__",
        }
    }
}

/// Markup used for italic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ItalicSyntax {
    #[default]
    #[serde(rename = "*")]
    Asterisk,
    #[serde(rename = "_")]
    Underscore,
}

impl ItalicSyntax {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asterisk => "*",
            Self::Underscore => "_",
        }
    }
}

/// Bullet used by the unordered-list command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListSyntax {
    #[default]
    #[serde(rename = "-")]
    Dash,
    #[serde(rename = "*")]
    Asterisk,
    #[serde(rename = "+")]
    Plus,
}

impl ListSyntax {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dash => "-",
            Self::Asterisk => "*",
            Self::Plus => "+",
        }
    }
}

// ---------------------------------------------------------------------------
// Custom prefix wrapping
// ---------------------------------------------------------------------------

/// A user-defined line prefix continued on Enter.
///
/// In JSON either a bare string (`"- [] "`) or an object with the fields of
/// [`Rule`](Self::Rule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefixWrapping {
    /// Continue lines starting with this literal prefix.
    Literal(String),
    Rule {
        /// Inserted at the start of the new line.
        prefix: String,
        /// Regex a line must match at its start. Defaults to the escaped
        /// prefix after optional indentation.
        #[serde(default)]
        prefix_pattern: Option<String>,
        /// Carry the line's indentation over to the new line.
        #[serde(default = "yes")]
        save_indent: bool,
        /// On a line with nothing after the prefix, clear it and stop.
        #[serde(default = "yes")]
        break_if_empty: bool,
    },
}

const fn yes() -> bool {
    true
}

/// A compiled [`PrefixWrapping`].
#[derive(Debug, Clone)]
pub struct PrefixRule {
    pub prefix: String,
    pub pattern: Regex,
    pub save_indent: bool,
    pub break_if_empty: bool,
}

impl PrefixWrapping {
    /// Compile the pattern, anchored at the start of the line.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPattern`] when `prefix_pattern` is not a valid regex.
    pub fn compile(&self) -> Result<PrefixRule> {
        let (prefix, pattern, save_indent, break_if_empty) = match self {
            Self::Literal(prefix) => (prefix, None, true, true),
            Self::Rule {
                prefix,
                prefix_pattern,
                save_indent,
                break_if_empty,
            } => (prefix, prefix_pattern.as_deref(), *save_indent, *break_if_empty),
        };
        let anchored = pattern.map_or_else(
            || format!(r"^\s*{}", regex::escape(prefix)),
            |p| format!("^(?:{p})"),
        );
        let pattern = Regex::new(&anchored).map_err(|source| Error::InvalidPattern {
            pattern: pattern.unwrap_or(prefix.as_str()).to_owned(),
            source,
        })?;
        Ok(PrefixRule {
            prefix: prefix.clone(),
            pattern,
            save_indent,
            break_if_empty,
        })
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Resolved options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Options {
    pub bold_syntax: BoldSyntax,
    pub italic_syntax: ItalicSyntax,
    pub unordered_list_syntax: ListSyntax,

    pub bold_placeholder: String,
    pub italic_placeholder: String,
    pub strike_through_placeholder: String,
    pub code_inline_placeholder: String,
    pub code_block_placeholder: String,
    /// `{level}` is replaced by the heading level.
    pub headline_placeholder: String,
    pub block_quotes_placeholder: String,
    pub link_text_placeholder: String,
    pub link_url_placeholder: String,
    pub image_text_placeholder: String,
    pub image_url_placeholder: String,

    pub enable_indent_extension: bool,
    pub enable_link_paste_extension: bool,
    pub enable_prefix_wrapping_extension: bool,
    pub enable_proper_line_remove_behavior_extension: bool,
    pub enable_ordered_list_autocorrect_extension: bool,

    pub custom_prefix_wrapping: Vec<PrefixWrapping>,
    /// Chords that delete an empty line outright.
    pub line_remove_shortcut: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            bold_syntax: BoldSyntax::default(),
            italic_syntax: ItalicSyntax::default(),
            unordered_list_syntax: ListSyntax::default(),
            bold_placeholder: "bold".to_owned(),
            italic_placeholder: "italic".to_owned(),
            strike_through_placeholder: "strike through".to_owned(),
            code_inline_placeholder: "code".to_owned(),
            code_block_placeholder: "code block".to_owned(),
            headline_placeholder: "headline {level}".to_owned(),
            block_quotes_placeholder: "quote".to_owned(),
            link_text_placeholder: "example".to_owned(),
            link_url_placeholder: "url".to_owned(),
            image_text_placeholder: "image".to_owned(),
            image_url_placeholder: "image.png".to_owned(),
            enable_indent_extension: true,
            enable_link_paste_extension: true,
            enable_prefix_wrapping_extension: true,
            enable_proper_line_remove_behavior_extension: true,
            enable_ordered_list_autocorrect_extension: false,
            custom_prefix_wrapping: Vec::new(),
            line_remove_shortcut: meta_combination(&["backspace"]),
        }
    }
}

impl Options {
    /// Defaults with `patch` laid over them.
    #[must_use]
    pub fn patched(patch: OptionsPatch) -> Self {
        let mut options = Self::default();
        options.apply(patch);
        options
    }

    /// The heading placeholder for `level`.
    #[must_use]
    pub fn headline_placeholder(&self, level: u8) -> String {
        self.headline_placeholder
            .replace("{level}", &level.to_string())
    }

    /// Replace every field the patch provides.
    pub fn apply(&mut self, patch: OptionsPatch) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field {
                    self.$field = value;
                })*
            };
        }
        take!(
            bold_syntax,
            italic_syntax,
            unordered_list_syntax,
            bold_placeholder,
            italic_placeholder,
            strike_through_placeholder,
            code_inline_placeholder,
            code_block_placeholder,
            headline_placeholder,
            block_quotes_placeholder,
            link_text_placeholder,
            link_url_placeholder,
            image_text_placeholder,
            image_url_placeholder,
            enable_indent_extension,
            enable_link_paste_extension,
            enable_prefix_wrapping_extension,
            enable_proper_line_remove_behavior_extension,
            enable_ordered_list_autocorrect_extension,
            custom_prefix_wrapping,
            line_remove_shortcut,
        );
    }
}

/// A partial [`Options`]: every field optional, unknown keys rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold_syntax: Option<BoldSyntax>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic_syntax: Option<ItalicSyntax>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unordered_list_syntax: Option<ListSyntax>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike_through_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_inline_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_block_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_quotes_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_text_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_text_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url_placeholder: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_indent_extension: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_link_paste_extension: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_prefix_wrapping_extension: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_proper_line_remove_behavior_extension: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_ordered_list_autocorrect_extension: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_prefix_wrapping: Option<Vec<PrefixWrapping>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_remove_shortcut: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
