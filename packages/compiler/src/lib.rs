#![deny(clippy::all)]

//! Refract Compiler
//!
//! Compiles a framework-neutral component tree into real source files
//! for several UI runtimes. The input is one [`ir::Component`] per
//! source component: a tree of element nodes plus state, props, imports
//! and lifecycle hooks, with all embedded logic carried as JS expression
//! strings. Generators walk that tree and emit target-native code: the
//! Qwik generator splits a component into lazy-loadable template, class
//! and event-handler files (optionally rolled into a bundle), and the
//! React generators emit a single function component for web or React
//! Native.
//!
//! Embedded expressions are never parsed into a full AST. The [`rewrite`]
//! module scans them into spanned tokens and splices replacements at
//! exact offsets, which keeps formatting and comments intact.

#[cfg(feature = "napi-bindings")]
use napi_derive::napi;

// Core modules
pub mod chars;
pub mod error;
pub mod ir;
pub mod naming;
pub mod plugins;
pub mod rewrite;
pub mod styles;
pub mod util;

// Output pipeline
pub mod bundle;
pub mod format;
pub mod generators;

// Re-exports
pub use error::{GenerateError, Result};
pub use generators::{
    component_to_qwik, component_to_react, component_to_react_native, ExportShape, File,
    GeneratorOutput, QwikOptions, ReactNativeOptions, ReactOptions, StylesMode,
};
pub use ir::{Binding, Component, Node};

/// Options accepted across the bindings boundary. Hook- and trait-valued
/// options (plugins, formatter, rewriter, linker) only exist host-side.
#[cfg_attr(feature = "napi-bindings", napi(object))]
#[cfg_attr(not(feature = "napi-bindings"), derive(Debug))]
pub struct GenerateConfig {
    /// Disable formatting entirely when `false`
    pub pretty: Option<bool>,
    /// Prefix for generated style class names
    pub css_namespace: Option<String>,
    /// Collapse collected css onto single lines
    pub minify_styles: Option<bool>,
}

#[cfg(feature = "napi-bindings")]
fn component_from_json(component: &str) -> napi::Result<Component> {
    serde_json::from_str(component)
        .map_err(|err| napi::Error::from_reason(format!("invalid component json: {}", err)))
}

#[cfg(feature = "napi-bindings")]
fn output_to_json(output: &GeneratorOutput) -> String {
    let files: Vec<serde_json::Value> = output
        .files
        .iter()
        .map(|file| {
            serde_json::json!({
                "path": file.path,
                "contents": file.contents,
            })
        })
        .collect();

    serde_json::json!({ "files": files }).to_string()
}

/// Generate a React function component. Takes the component tree as JSON,
/// returns `{"files": [{"path", "contents"}]}` as JSON.
#[cfg(feature = "napi-bindings")]
#[napi]
pub fn generate_react(component: String, config: Option<GenerateConfig>) -> napi::Result<String> {
    let json = component_from_json(&component)?;
    let config = config.unwrap_or(GenerateConfig {
        pretty: None,
        css_namespace: None,
        minify_styles: None,
    });

    let options = ReactOptions {
        pretty: config.pretty,
        css_namespace: config.css_namespace,
        minify_styles: config.minify_styles.unwrap_or(false),
        ..ReactOptions::default()
    };

    let output = component_to_react(&json, &options)
        .map_err(|err| napi::Error::from_reason(err.to_string()))?;
    Ok(output_to_json(&output))
}

/// Generate a React Native component. Same JSON contract as
/// [`generate_react`].
#[cfg(feature = "napi-bindings")]
#[napi]
pub fn generate_react_native(
    component: String,
    config: Option<GenerateConfig>,
) -> napi::Result<String> {
    let json = component_from_json(&component)?;
    let config = config.unwrap_or(GenerateConfig {
        pretty: None,
        css_namespace: None,
        minify_styles: None,
    });

    let options = ReactNativeOptions {
        pretty: config.pretty,
        ..ReactNativeOptions::default()
    };

    let output = component_to_react_native(&json, &options)
        .map_err(|err| napi::Error::from_reason(err.to_string()))?;
    Ok(output_to_json(&output))
}

/// Get compiler version
#[cfg(feature = "napi-bindings")]
#[napi]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Check if the native compiler is available
#[cfg(feature = "napi-bindings")]
#[napi]
pub fn is_available() -> bool {
    true
}
