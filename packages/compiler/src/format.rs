//! Source Formatting
//!
//! Pretty-printing is an external capability. Generators hand the final
//! text to whatever [`SourceFormatter`] the caller injected; with none
//! injected the text passes through unformatted. A formatter failure is
//! never fatal: the error is logged and the unformatted text is used.

use crate::error::FormatError;

/// Language the formatter is asked to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    TypeScript,
    Css,
}

pub trait SourceFormatter: Send + Sync {
    fn format(&self, code: &str, kind: SourceKind) -> Result<String, FormatError>;
}

/// Run `code` through the formatter when one is present and formatting is
/// enabled; on failure, warn and fall back to the input.
pub fn format_or_warn(
    formatter: Option<&dyn SourceFormatter>,
    pretty: bool,
    code: String,
    kind: SourceKind,
) -> String {
    if !pretty {
        return code;
    }
    match formatter {
        None => code,
        Some(formatter) => match formatter.format(&code, kind) {
            Ok(formatted) => formatted,
            Err(err) => {
                log::warn!("error formatting generated code: {}", err);
                code
            }
        },
    }
}
