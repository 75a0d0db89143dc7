//! React-style Generator
//!
//! Emits a component as a single function-component module. State fields
//! become `useState` pairs and state writes are rewritten into setter
//! calls, so no dirty-marking is needed; `onMount`/`onUnMount` become
//! effects. This generator is also the delegation target of the React
//! Native generator, which lowers the tree first and then reuses the
//! whole emission path in native mode.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::format::{format_or_warn, SourceFormatter, SourceKind};
use crate::ir::{
    is_event_key, is_internal_key, walk_nodes, Component, Node, NodeKind, EACH_KEY, FOR_NAME_KEY,
    SPREAD_KEY, TEXT_KEY, WHEN_KEY,
};
use crate::naming::clear_generated_ids;
use crate::plugins::{
    run_post_code_plugins, run_post_ir_plugins, run_pre_code_plugins, run_pre_ir_plugins, Plugin,
};
use crate::rewrite::{ExpressionRewriter, LexicalRewriter};
use crate::styles::{collect_css, minify_css, ClassStyleMap, CssOptions};
use crate::util::{capitalize, html_attribute_escape, is_valid_attribute_name};

use super::react_native::collect_react_native_styles;
use super::{
    component_display_name, is_empty_text_node, render_import_lines, File, GeneratorOutput,
    SELF_CLOSING_TAGS,
};

/// Where collected styles land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylesMode {
    /// Inline `<style>` tag with generated class names.
    Web,
    /// `StyleSheet.create` map referenced through `style` bindings.
    Native,
}

impl Default for StylesMode {
    fn default() -> Self {
        StylesMode::Web
    }
}

#[derive(Clone, Default)]
pub struct ReactOptions {
    /// `Some(false)` disables formatting; anything else formats when a
    /// formatter is present.
    pub pretty: Option<bool>,
    pub plugins: Vec<Plugin>,
    pub styles_mode: StylesMode,
    /// Namespace applied to generated class names (web mode).
    pub css_namespace: Option<String>,
    pub minify_styles: bool,
    pub formatter: Option<Arc<dyn SourceFormatter>>,
    pub rewriter: Option<Arc<dyn ExpressionRewriter>>,
}

fn is_pretty(options: &ReactOptions) -> bool {
    options.pretty != Some(false)
}

struct ReactContext<'a> {
    options: &'a ReactOptions,
    rewriter: &'a dyn ExpressionRewriter,
    formatter: Option<&'a dyn SourceFormatter>,
}

fn format_code(code: String, ctx: &ReactContext<'_>, kind: SourceKind) -> String {
    format_or_warn(ctx.formatter, is_pretty(ctx.options), code, kind)
}

/// Rewrite binding code for this target: state writes become setter calls
/// (`state.count = 5` → `setCount(5)`), state reads become the bare local
/// (`state.count` → `count`), `props.` stays as-is since the component
/// receives a `props` parameter.
fn process_binding(code: &str, ctx: &ReactContext<'_>) -> Result<String> {
    let with_setters = ctx.rewriter.rewrite_state_setters(code, "state", &|field, value| {
        format!("set{}({})", capitalize(field), value)
    })?;
    let stripped = ctx
        .rewriter
        .rewrite_reference_roots(&with_setters, "state", "")?;
    let trimmed = stripped.trim();
    Ok(trimmed.strip_suffix(';').unwrap_or(trimmed).to_string())
}

fn block_to_react(node: &Node, ctx: &ReactContext<'_>) -> Result<String> {
    match node.kind() {
        NodeKind::Fragment => {
            let mut parts = Vec::new();
            for child in &node.children {
                parts.push(block_to_react(child, ctx)?);
            }
            Ok(format!("<>{}</>", parts.join("\n")))
        }
        NodeKind::For => for_to_react(node, ctx),
        NodeKind::Show => show_to_react(node, ctx),
        NodeKind::Element => element_to_react(node, ctx),
    }
}

fn for_to_react(node: &Node, ctx: &ReactContext<'_>) -> Result<String> {
    let each_code = node
        .bindings
        .get(EACH_KEY)
        .map(|binding| binding.code.clone())
        .unwrap_or_default();
    let each = process_binding(&each_code, ctx)?;
    let for_name = node
        .properties
        .get(FOR_NAME_KEY)
        .cloned()
        .unwrap_or_default();
    let body = filtered_children(node, ctx)?;
    Ok(format!("{{{}.map({} => (\n<>{}</>\n))}}", each, for_name, body))
}

fn show_to_react(node: &Node, ctx: &ReactContext<'_>) -> Result<String> {
    let when_code = node
        .bindings
        .get(WHEN_KEY)
        .map(|binding| binding.code.clone())
        .unwrap_or_default();
    let when = process_binding(&when_code, ctx)?;
    let body = filtered_children(node, ctx)?;
    Ok(format!("{{{} ? (\n<>{}</>\n) : null}}", when, body))
}

fn filtered_children(node: &Node, ctx: &ReactContext<'_>) -> Result<String> {
    let mut parts = Vec::new();
    for child in &node.children {
        if is_empty_text_node(child) {
            continue;
        }
        parts.push(block_to_react(child, ctx)?);
    }
    Ok(parts.join("\n"))
}

/// `class` from the IR is `className` in this target.
fn react_attribute_name(key: &str) -> &str {
    if key == "class" {
        "className"
    } else {
        key
    }
}

fn element_to_react(node: &Node, ctx: &ReactContext<'_>) -> Result<String> {
    if let Some(binding) = node.bindings.get(TEXT_KEY) {
        return Ok(format!("{{{}}}", process_binding(&binding.code, ctx)?));
    }
    if let Some(text) = node.text_property() {
        return Ok(text.to_string());
    }

    let mut out = format!("<{}", node.name);

    if let Some(spread) = node.bindings.get(SPREAD_KEY) {
        out.push_str(&format!(" {{...({})}}", spread.code));
    }

    for (key, value) in &node.properties {
        if key.is_empty() || is_internal_key(key) {
            continue;
        }
        if !is_valid_attribute_name(key) {
            log::warn!("skipping invalid attribute name: {}", key);
            continue;
        }
        out.push_str(&format!(
            " {}=\"{}\"",
            react_attribute_name(key),
            html_attribute_escape(value)
        ));
    }

    for (key, binding) in &node.bindings {
        if is_internal_key(key) {
            continue;
        }
        if is_event_key(key) {
            let handler = process_binding(&binding.code, ctx)?;
            if binding.is_arrow_function {
                out.push_str(&format!(" {}={{{}}}", key, handler));
            } else if handler.contains(';') {
                out.push_str(&format!(" {}={{(event) => {{ {} }}}}", key, handler));
            } else {
                out.push_str(&format!(" {}={{(event) => {}}}", key, handler));
            }
        } else {
            if !is_valid_attribute_name(key) {
                log::warn!("skipping invalid attribute name: {}", key);
                continue;
            }
            out.push_str(&format!(
                " {}={{{}}}",
                react_attribute_name(key),
                process_binding(&binding.code, ctx)?
            ));
        }
    }

    if SELF_CLOSING_TAGS.contains(node.name.as_str()) {
        out.push_str(" />");
        return Ok(out);
    }

    out.push('>');
    let mut parts = Vec::new();
    for child in &node.children {
        parts.push(block_to_react(child, ctx)?);
    }
    out.push_str(&parts.join("\n"));
    out.push_str(&format!("</{}>", node.name));

    Ok(out)
}

fn json_literal(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn state_hooks(component: &Component) -> String {
    component
        .state
        .iter()
        .map(|(key, value)| {
            format!(
                "  const [{key}, set{cap}] = useState(() => {value});",
                key = key,
                cap = capitalize(key),
                value = json_literal(value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_style_sheet(styles: &ClassStyleMap) -> String {
    let entries = styles
        .iter()
        .map(|(name, value)| {
            format!(
                "  {}: {},",
                name,
                serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("const styles = StyleSheet.create({{\n{}\n}});\n", entries)
}

/// Which react-native host components the lowered tree references.
fn native_imports(component: &Component, has_styles: bool) -> Vec<&'static str> {
    let mut uses_view = false;
    let mut uses_text = false;
    walk_nodes(&component.children, &mut |node| {
        match node.name.as_str() {
            "View" => uses_view = true,
            "Text" => uses_text = true,
            _ => {}
        }
    });
    let mut names = Vec::new();
    if uses_view {
        names.push("View");
    }
    if uses_text {
        names.push("Text");
    }
    if has_styles {
        names.push("StyleSheet");
    }
    names
}

pub fn component_to_react(
    component: &Component,
    options: &ReactOptions,
) -> Result<GeneratorOutput> {
    let default_rewriter = LexicalRewriter::new();
    let rewriter: &dyn ExpressionRewriter = match &options.rewriter {
        Some(rewriter) => rewriter.as_ref(),
        None => &default_rewriter,
    };
    let formatter = options.formatter.as_deref();

    let mut json = component.clone();
    clear_generated_ids(&mut json.children);
    json = run_pre_ir_plugins(json, &options.plugins);

    let mut css = String::new();
    let mut native_styles = ClassStyleMap::new();
    match options.styles_mode {
        StylesMode::Web => {
            let css_options = CssOptions {
                class_property: "className".to_string(),
                prefix: options.css_namespace.clone(),
            };
            css = collect_css(&mut json.children, &css_options)?;
            if options.minify_styles {
                css = minify_css(&css);
            } else {
                css = format_or_warn(formatter, is_pretty(options), css, SourceKind::Css);
            }
        }
        StylesMode::Native => {
            native_styles = collect_react_native_styles(&mut json.children)?;
        }
    }
    let has_css = !css.trim().is_empty();
    let add_wrapper = json.children.len() > 1 || has_css;

    json = run_post_ir_plugins(json, &options.plugins);

    let component_name = component_display_name(&component.name);
    let ctx = ReactContext {
        options,
        rewriter,
        formatter,
    };

    let mut children_parts = Vec::new();
    for child in &json.children {
        children_parts.push(block_to_react(child, &ctx)?);
    }

    // Imports
    let mut react_hooks = Vec::new();
    if !json.state.is_empty() {
        react_hooks.push("useState");
    }
    if json.on_mount().is_some() || json.on_unmount().is_some() {
        react_hooks.push("useEffect");
    }
    let mut header = String::from("import * as React from 'react';\n");
    if !react_hooks.is_empty() {
        header.push_str(&format!(
            "import {{ {} }} from 'react';\n",
            react_hooks.join(", ")
        ));
    }
    if options.styles_mode == StylesMode::Native {
        let names = native_imports(&json, !native_styles.is_empty());
        if !names.is_empty() {
            header.push_str(&format!(
                "import {{ {} }} from 'react-native';\n",
                names.join(", ")
            ));
        }
    }
    let import_lines = render_import_lines(&json.imports);
    if !import_lines.is_empty() {
        header.push_str(&import_lines);
        header.push('\n');
    }

    // Optional props interface
    let mut props_interface = String::new();
    let props_param = if json.props.is_empty() {
        String::from("()")
    } else {
        let fields = json
            .props
            .iter()
            .map(|(name, type_text)| format!("  {}: {};", name, type_text))
            .collect::<Vec<_>>()
            .join("\n");
        props_interface = format!(
            "export interface {name}Props {{\n{fields}\n}}\n\n",
            name = component_name,
            fields = fields
        );
        format!("(props: {}Props)", component_name)
    };

    let mut body_lines = Vec::new();
    let hooks = state_hooks(&json);
    if !hooks.is_empty() {
        body_lines.push(hooks);
    }
    if let Some(mount) = json.on_mount() {
        let processed = process_binding(mount, &ctx)?;
        body_lines.push(format!("  useEffect(() => {{\n    {}\n  }}, []);", processed));
    }
    if let Some(unmount) = json.on_unmount() {
        let processed = process_binding(unmount, &ctx)?;
        body_lines.push(format!(
            "  useEffect(() => {{\n    return () => {{\n      {}\n    }};\n  }}, []);",
            processed
        ));
    }

    let mut render = String::new();
    if add_wrapper {
        render.push_str("<>\n");
    }
    if has_css {
        render.push_str(&format!("<style>{{`{}`}}</style>\n", css.trim()));
    }
    render.push_str(&children_parts.join("\n"));
    if add_wrapper {
        render.push_str("\n</>");
    }

    let mut code = header;
    code.push('\n');
    code.push_str(&props_interface);
    code.push_str(&format!(
        "export default function {name}{params} {{\n",
        name = component_name,
        params = props_param
    ));
    if !body_lines.is_empty() {
        code.push_str(&body_lines.join("\n\n"));
        code.push_str("\n\n");
    }
    code.push_str(&format!("  return ({});\n}}\n", render));

    if !native_styles.is_empty() {
        code.push('\n');
        code.push_str(&render_style_sheet(&native_styles));
    }

    code = run_pre_code_plugins(code, &options.plugins);
    code = format_code(code, &ctx, SourceKind::TypeScript);
    code = run_post_code_plugins(code, &options.plugins);

    Ok(GeneratorOutput {
        files: vec![File {
            path: format!("{}.tsx", component_name),
            contents: code,
        }],
    })
}
