//! React Native Generator
//!
//! React Native has no HTML: generic lower-cased tags become the host
//! container kind `View`, and any node carrying non-blank text becomes
//! the host text kind `Text` with its text hoisted into a child node so
//! the wrapper element survives emission. Styles collect into a
//! `StyleSheet.create` map instead of a stylesheet. Emission itself is
//! delegated to the React generator in native mode.

use std::sync::Arc;

use crate::error::{Result, StyleError};
use crate::format::SourceFormatter;
use crate::ir::{Binding, Component, Node, NodeKind, CSS_KEY, TEXT_KEY};
use crate::naming::{clear_generated_ids, NameRegistry};
use crate::plugins::Plugin;
use crate::rewrite::ExpressionRewriter;
use crate::styles::{is_empty_style, parse_style_literal, ClassStyleMap};
use crate::util::camel_case;

use super::react::{component_to_react, ReactOptions, StylesMode};
use super::GeneratorOutput;

#[derive(Clone, Default)]
pub struct ReactNativeOptions {
    /// `Some(false)` disables formatting; anything else formats when a
    /// formatter is present.
    pub pretty: Option<bool>,
    pub plugins: Vec<Plugin>,
    pub formatter: Option<Arc<dyn SourceFormatter>>,
    pub rewriter: Option<Arc<dyn ExpressionRewriter>>,
}

/// Strip every `css` binding into a style map keyed by camel-cased tag
/// name (`view`, `view2`, ...), counting only styled nodes, and point the
/// node's `style` binding at its entry.
pub fn collect_react_native_styles(
    nodes: &mut [Node],
) -> std::result::Result<ClassStyleMap, StyleError> {
    let mut styles = ClassStyleMap::new();
    let mut names = NameRegistry::new();
    collect_into(nodes, &mut names, &mut styles)?;
    Ok(styles)
}

fn collect_into(
    nodes: &mut [Node],
    names: &mut NameRegistry,
    styles: &mut ClassStyleMap,
) -> std::result::Result<(), StyleError> {
    for node in nodes {
        if let Some(binding) = node.bindings.shift_remove(CSS_KEY) {
            let value = parse_style_literal(&binding.code)?;
            if !is_empty_style(&value) {
                let base = if node.name.is_empty() {
                    "view".to_string()
                } else {
                    camel_case(&node.name)
                };
                let class_name = names.claim(&base);
                node.bindings.insert(
                    "style".to_string(),
                    Binding::new(format!("styles.{}", class_name)),
                );
                styles.insert(class_name, value);
            }
        }
        collect_into(&mut node.children, names, styles)?;
    }
    Ok(())
}

/// Lower the tree to the two host kinds. Text is hoisted into a fresh
/// child node, which is skipped by the recursion so it is not lowered
/// again.
fn lower_to_native(nodes: &mut [Node]) {
    for node in nodes {
        if node.kind() != NodeKind::Element {
            lower_to_native(&mut node.children);
            continue;
        }

        if node.name.to_lowercase() == node.name {
            node.name = "View".to_string();
        }

        if node.has_text() {
            node.name = "Text".to_string();
            let mut text_node = Node::new("div");
            if let Some(text) = node.properties.shift_remove(TEXT_KEY) {
                text_node.properties.insert(TEXT_KEY.to_string(), text);
            }
            if let Some(binding) = node.bindings.shift_remove(TEXT_KEY) {
                text_node.bindings.insert(TEXT_KEY.to_string(), binding);
            }
            node.children.insert(0, text_node);
            lower_to_native(&mut node.children[1..]);
            continue;
        }

        lower_to_native(&mut node.children);
    }
}

pub fn component_to_react_native(
    component: &Component,
    options: &ReactNativeOptions,
) -> Result<GeneratorOutput> {
    let mut json = component.clone();
    clear_generated_ids(&mut json.children);
    lower_to_native(&mut json.children);

    let react_options = ReactOptions {
        pretty: options.pretty,
        plugins: options.plugins.clone(),
        styles_mode: StylesMode::Native,
        css_namespace: None,
        minify_styles: false,
        formatter: options.formatter.clone(),
        rewriter: options.rewriter.clone(),
    };
    component_to_react(&json, &react_options)
}
