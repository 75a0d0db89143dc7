//! Plugin Pipeline
//!
//! Four fixed extension points per generation call: before and after the
//! generator's own IR mutation, and before and after formatting of the
//! generated text. Each point folds the value through the plugin list in
//! order, so one plugin's output is the next plugin's input. Plugins are
//! trusted extensions; a panic inside a hook propagates to the caller.

use std::sync::Arc;

use crate::ir::Component;

pub type IrHook = Arc<dyn Fn(Component) -> Component + Send + Sync>;
pub type CodeHook = Arc<dyn Fn(String) -> String + Send + Sync>;

/// One plugin; any subset of the four hooks may be present.
#[derive(Clone, Default)]
pub struct Plugin {
    pub ir_pre: Option<IrHook>,
    pub ir_post: Option<IrHook>,
    pub code_pre: Option<CodeHook>,
    pub code_post: Option<CodeHook>,
}

impl Plugin {
    pub fn new() -> Self {
        Plugin::default()
    }
}

pub fn run_pre_ir_plugins(component: Component, plugins: &[Plugin]) -> Component {
    plugins
        .iter()
        .fold(component, |value, plugin| match &plugin.ir_pre {
            Some(hook) => hook(value),
            None => value,
        })
}

pub fn run_post_ir_plugins(component: Component, plugins: &[Plugin]) -> Component {
    plugins
        .iter()
        .fold(component, |value, plugin| match &plugin.ir_post {
            Some(hook) => hook(value),
            None => value,
        })
}

pub fn run_pre_code_plugins(code: String, plugins: &[Plugin]) -> String {
    plugins
        .iter()
        .fold(code, |value, plugin| match &plugin.code_pre {
            Some(hook) => hook(value),
            None => value,
        })
}

pub fn run_post_code_plugins(code: String, plugins: &[Plugin]) -> String {
    plugins
        .iter()
        .fold(code, |value, plugin| match &plugin.code_post {
            Some(hook) => hook(value),
            None => value,
        })
}
