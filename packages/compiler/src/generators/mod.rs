//! Code Generators
//!
//! A generator turns one [`Component`](crate::ir::Component) into a set of
//! named output files. Every generator follows the same contract: clone
//! the input before touching it, run the plugin hooks at the four fixed
//! points, delegate formatting to the injected capability, and emit
//! deterministic output for identical input. This module holds the pieces
//! the individual targets share.

pub mod qwik;
pub mod react;
pub mod react_native;

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::ir::{ImportEntry, Node};
use crate::util::{camel_case, capitalize};

pub use qwik::{component_to_qwik, ExportShape, QwikOptions};
pub use react::{component_to_react, ReactOptions, StylesMode};
pub use react_native::{component_to_react_native, ReactNativeOptions};

/// One generated output file. The compiler never writes to disk; the
/// caller owns persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path: String,
    pub contents: String,
}

/// The full result of one generation call, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorOutput {
    pub files: Vec<File>,
}

/// HTML void elements, emitted self-closing with no children.
pub static SELF_CLOSING_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ])
});

/// Whitespace-only text nodes carry no rendering and are dropped from
/// control-flow bodies.
pub fn is_empty_text_node(node: &Node) -> bool {
    match node.text_property() {
        Some(text) => text.trim().is_empty(),
        None => false,
    }
}

/// Display name for a component: `my-component` → `MyComponent`.
pub fn component_display_name(name: &str) -> String {
    let base = if name.is_empty() { "my-component" } else { name };
    capitalize(&camel_case(base))
}

/// Render the component's import entries to source lines. Entries mapping
/// a local name to `default` take the default position, `*` becomes a
/// namespace import, everything else lands in the named group; an entry
/// with no names at all is a bare side-effect import.
pub fn render_import_lines(imports: &[ImportEntry]) -> String {
    let mut lines = Vec::new();
    for entry in imports {
        let mut default_local = None;
        let mut named = Vec::new();
        for (local, exported) in &entry.imports {
            match exported.as_str() {
                "default" => default_local = Some(local.clone()),
                "*" => lines.push(format!("import * as {} from '{}';", local, entry.path)),
                _ if exported == local => named.push(local.clone()),
                _ => named.push(format!("{} as {}", exported, local)),
            }
        }

        if default_local.is_none() && named.is_empty() {
            if entry.imports.is_empty() {
                lines.push(format!("import '{}';", entry.path));
            }
            continue;
        }

        let mut clauses = Vec::new();
        if let Some(local) = default_local {
            clauses.push(local);
        }
        if !named.is_empty() {
            clauses.push(format!("{{ {} }}", named.join(", ")));
        }
        lines.push(format!(
            "import {} from '{}';",
            clauses.join(", "),
            entry.path
        ));
    }
    lines.join("\n")
}
