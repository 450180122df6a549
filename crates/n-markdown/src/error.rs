//! Configuration errors.
//!
//! Only programmer mistakes surface as errors: triggering a command that
//! was never registered, registering a custom command without a handler,
//! a malformed shortcut string or prefix pattern. Content that simply
//! doesn't match (no URL on paste, a line that isn't a list item, a
//! disabled command) is a silent no-op and never reaches this type.
use n_input::ChordError;
use thiserror::Error;

/// Everything that can go wrong while configuring or driving an editor.
#[derive(Error, Debug)]
pub enum Error {
    #[error("command {0:?} is not defined")]
    UnknownCommand(String),

    #[error("custom command {0:?} must have a handler")]
    MissingHandler(String),

    #[error("invalid shortcut for command {command:?}: {source}")]
    InvalidShortcut {
        command: String,
        #[source]
        source: ChordError,
    },

    #[error("invalid shortcut option: {0}")]
    InvalidOptionShortcut(#[from] ChordError),

    #[error("invalid prefix pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed selection notation: {0}")]
    Notation(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
