//! Error Types
//!
//! Typed errors for each stage of the pipeline. Recoverable conditions
//! (invalid attribute names, formatter failures) are logged and worked
//! around instead of surfaced here; everything below is fatal to the
//! generation call that hit it.

use thiserror::Error;

/// Errors raised while scanning or rewriting embedded expression code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),

    #[error("unterminated template literal starting at offset {0}")]
    UnterminatedTemplate(usize),

    #[error("unterminated regular expression starting at offset {0}")]
    UnterminatedRegExp(usize),

    #[error("unexpected character `{ch}` at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },
}

/// Errors raised while parsing the object literal of a `css` binding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error(transparent)]
    Scan(#[from] RewriteError),

    #[error("expected {expected} in style literal, found `{found}` at offset {offset}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("style literal ended unexpectedly")]
    UnexpectedEnd,

    #[error("style value `{0}` is not a representable number")]
    InvalidNumber(String),
}

/// Error returned by a [`SourceFormatter`](crate::format::SourceFormatter)
/// implementation. Formatting is best-effort, so this never aborts a
/// generation call.
#[derive(Error, Debug, Clone)]
#[error("formatter failed: {message}")]
pub struct FormatError {
    pub message: String,
}

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        FormatError {
            message: message.into(),
        }
    }
}

/// Error returned by a [`ModuleLinker`](crate::bundle::ModuleLinker)
/// implementation.
#[derive(Error, Debug, Clone)]
#[error("linker failed: {message}")]
pub struct LinkError {
    pub message: String,
}

impl LinkError {
    pub fn new(message: impl Into<String>) -> Self {
        LinkError {
            message: message.into(),
        }
    }
}

/// Top-level error for a generation call.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("bundling requested but no module linker was provided")]
    MissingLinker,
}

/// Result alias used by the generators.
pub type Result<T> = std::result::Result<T, GenerateError>;
