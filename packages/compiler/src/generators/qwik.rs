//! Qwik-style Generator
//!
//! Emits a component as the resumable-runtime file set: a declaration
//! module binding a custom-element tag to the template's locator, a
//! template module wrapping the render tree in the runtime's injection
//! scaffold, a component class module carrying state, and one module per
//! event handler addressed through QRL locator strings. With `bundle`
//! enabled, the set is additionally linked into a single module through
//! the injected [`ModuleLinker`] and handlers are addressed through the
//! bundle namespace.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::bundle::{ModuleLinker, VirtualModuleGraph};
use crate::error::{GenerateError, Result};
use crate::format::{format_or_warn, SourceFormatter, SourceKind};
use crate::ir::{
    is_event_key, is_internal_key, Component, ImportEntry, Node, NodeKind, EACH_KEY, FOR_NAME_KEY,
    SPREAD_KEY, TEXT_KEY, WHEN_KEY,
};
use crate::naming::{clear_generated_ids, el_id, NameRegistry};
use crate::plugins::{
    run_post_code_plugins, run_post_ir_plugins, run_pre_code_plugins, run_pre_ir_plugins, Plugin,
};
use crate::rewrite::{ExpressionRewriter, LexicalRewriter};
use crate::styles::{collect_css, minify_css, CssOptions};
use crate::util::{
    html_attribute_escape, is_valid_attribute_name, kebab_case, remove_surrounding_block,
};

use super::{
    component_display_name, is_empty_text_node, render_import_lines, File, GeneratorOutput,
    SELF_CLOSING_TAGS,
};

/// How the component class reaches consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportShape {
    /// `export class {Name}Component` with a static template locator.
    Direct,
    /// Private class behind an exported Proxy that synthesizes the
    /// template locator, for hosts that rewrite locators at serve time.
    Wrapped,
}

impl Default for ExportShape {
    fn default() -> Self {
        ExportShape::Direct
    }
}

#[derive(Clone, Default)]
pub struct QwikOptions {
    /// `Some(false)` disables formatting; anything else formats when a
    /// formatter is present.
    pub pretty: Option<bool>,
    pub plugins: Vec<Plugin>,
    /// Import path of the runtime library. Defaults to `@builder.io/qwik`.
    pub qwik_lib: Option<String>,
    /// Locator prefix. Defaults to `ui:`.
    pub qrl_prefix: Option<String>,
    /// Locator suffix, e.g. a content hash slot.
    pub qrl_suffix: Option<String>,
    /// Namespace applied to generated class names.
    pub css_namespace: Option<String>,
    pub minify_styles: bool,
    /// Link the file set into `{Name}/bundle.js` and address handlers
    /// through the bundle namespace.
    pub bundle: bool,
    pub export_shape: ExportShape,
    pub formatter: Option<Arc<dyn SourceFormatter>>,
    pub rewriter: Option<Arc<dyn ExpressionRewriter>>,
    pub linker: Option<Arc<dyn ModuleLinker>>,
}

fn qwik_import(options: &QwikOptions) -> &str {
    options.qwik_lib.as_deref().unwrap_or("@builder.io/qwik")
}

fn qrl_prefix(options: &QwikOptions) -> &str {
    options.qrl_prefix.as_deref().unwrap_or("ui:")
}

fn qrl_suffix(options: &QwikOptions) -> &str {
    options.qrl_suffix.as_deref().unwrap_or("")
}

fn is_pretty(options: &QwikOptions) -> bool {
    options.pretty != Some(false)
}

/// The template's locator string, shared by the declaration module, the
/// component class and the bundle entry.
fn template_qrl(options: &QwikOptions, component_name: &str) -> String {
    format!(
        "{}/{}{}{}{}",
        qrl_prefix(options),
        component_name,
        if options.bundle { "/bundle" } else { "_template" },
        qrl_suffix(options),
        if options.bundle { ".template" } else { "" }
    )
}

/// Per-call emission state threaded through the tree walk.
struct QwikContext<'a> {
    options: &'a QwikOptions,
    component_name: String,
    names: NameRegistry,
    rewriter: &'a dyn ExpressionRewriter,
    formatter: Option<&'a dyn SourceFormatter>,
}

fn format_code(code: String, ctx: &QwikContext<'_>, kind: SourceKind) -> String {
    format_or_warn(ctx.formatter, is_pretty(ctx.options), code, kind)
}

/// Rewrite binding code for this target: insert dirty markers after state
/// mutations, redirect `state.`/`props.` roots to `this.`, and strip the
/// trailing terminator since the result lands in expression position.
fn process_binding(code: &str, ctx: &QwikContext<'_>) -> Result<String> {
    let marked = ctx
        .rewriter
        .insert_after_mutations(code, "state", "markDirty(this)")?;
    let through_state = ctx.rewriter.rewrite_reference_roots(&marked, "state", "this.")?;
    let through_props = ctx
        .rewriter
        .rewrite_reference_roots(&through_state, "props", "this.")?;
    let trimmed = through_props.trim();
    Ok(trimmed.strip_suffix(';').unwrap_or(trimmed).to_string())
}

fn block_to_qwik(node: &mut Node, ctx: &mut QwikContext<'_>) -> Result<String> {
    match node.kind() {
        NodeKind::Fragment => {
            let mut parts = Vec::new();
            for child in &mut node.children {
                parts.push(block_to_qwik(child, ctx)?);
            }
            Ok(format!("<>{}</>", parts.join("\n")))
        }
        NodeKind::For => for_to_qwik(node, ctx),
        NodeKind::Show => show_to_qwik(node, ctx),
        NodeKind::Element => element_to_qwik(node, ctx),
    }
}

fn for_to_qwik(node: &mut Node, ctx: &mut QwikContext<'_>) -> Result<String> {
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

fn show_to_qwik(node: &mut Node, ctx: &mut QwikContext<'_>) -> Result<String> {
    let when_code = node
        .bindings
        .get(WHEN_KEY)
        .map(|binding| binding.code.clone())
        .unwrap_or_default();
    let when = process_binding(&when_code, ctx)?;
    let body = filtered_children(node, ctx)?;
    Ok(format!("{{{} ? (\n<>{}</>\n) : undefined}}", when, body))
}

fn filtered_children(node: &mut Node, ctx: &mut QwikContext<'_>) -> Result<String> {
    let mut parts = Vec::new();
    for child in &mut node.children {
        if is_empty_text_node(child) {
            continue;
        }
        parts.push(block_to_qwik(child, ctx)?);
    }
    Ok(parts.join("\n"))
}

fn element_to_qwik(node: &mut Node, ctx: &mut QwikContext<'_>) -> Result<String> {
    if let Some(binding) = node.bindings.get(TEXT_KEY) {
        let code = binding.code.clone();
        return Ok(format!("{{{}}}", process_binding(&code, ctx)?));
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
        out.push_str(&format!(" {}=\"{}\"", key, html_attribute_escape(value)));
    }

    // Event bindings allocate the element id and are appended after the
    // inline attributes.
    let bindings: Vec<(String, String)> = node
        .bindings
        .iter()
        .map(|(key, binding)| (key.clone(), binding.code.clone()))
        .collect();
    let mut event_attrs = Vec::new();
    for (key, code) in bindings {
        if is_internal_key(&key) {
            continue;
        }
        if is_event_key(&key) {
            let use_key = format!("on:{}", key[2..].to_lowercase());
            let id = el_id(node, &mut ctx.names);
            let event = &key[2..];
            let qrl = if ctx.options.bundle {
                format!(
                    "QRL`{}/{}/bundle{}.on{}{}`",
                    qrl_prefix(ctx.options),
                    ctx.component_name,
                    qrl_suffix(ctx.options),
                    id,
                    event
                )
            } else {
                format!(
                    "QRL`{}/{}_on{}{}{}`",
                    qrl_prefix(ctx.options),
                    ctx.component_name,
                    id,
                    event,
                    qrl_suffix(ctx.options)
                )
            };
            event_attrs.push(format!(" {}={{{}}}", use_key, qrl));
        } else {
            if !is_valid_attribute_name(&key) {
                log::warn!("skipping invalid attribute name: {}", key);
                continue;
            }
            out.push_str(&format!(" {}={{{}}}", key, process_binding(&code, ctx)?));
        }
    }
    for attr in event_attrs {
        out.push_str(&attr);
    }

    if SELF_CLOSING_TAGS.contains(node.name.as_str()) {
        out.push_str(" />");
        return Ok(out);
    }

    out.push('>');
    let mut parts = Vec::new();
    for child in &mut node.children {
        parts.push(block_to_qwik(child, ctx)?);
    }
    out.push_str(&parts.join("\n"));
    out.push_str(&format!("</{}>", node.name));

    Ok(out)
}

/// Imports of sibling `.lite` components are redirected to the built
/// public module, and their default imports become named imports of the
/// pascal-cased component.
fn remap_lite_imports(imports: &[ImportEntry]) -> Vec<ImportEntry> {
    imports
        .iter()
        .map(|entry| {
            if !entry.path.ends_with(".lite") {
                return entry.clone();
            }
            let parts: Vec<&str> = entry.path.split(|c| c == '.' || c == '/').collect();
            let stem = if parts.len() >= 2 {
                parts[parts.len() - 2]
            } else {
                entry.path.as_str()
            };
            let pascal_name = component_display_name(stem);
            let mut clone = entry.clone();
            clone.path = format!("../{}/public.js", pascal_name);
            for exported in clone.imports.values_mut() {
                if exported == "default" {
                    *exported = pascal_name.clone();
                }
            }
            clone
        })
        .collect()
}

fn state_class_fields(state: &IndexMap<String, Value>) -> String {
    state
        .iter()
        .map(|(key, value)| format!("  {} = {};", key, json_literal(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn json_literal(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// The `{Name}_component.ts` module: state class, `onMount` constructor,
/// and the export shape the host expects.
fn component_class_source(
    json: &Component,
    ctx: &QwikContext<'_>,
) -> Result<String> {
    let options = ctx.options;
    let component_name = &ctx.component_name;
    let qrl = template_qrl(options, component_name);

    let mut class_body = String::new();
    match options.export_shape {
        ExportShape::Direct => {
            class_body.push_str(&format!(
                "export class {}Component extends Component<any, any> {{\n",
                component_name
            ));
            class_body.push_str(&format!("  static $templateQRL = '{}';\n", qrl));
        }
        ExportShape::Wrapped => {
            class_body.push_str(&format!(
                "class _{}Component extends Component<any, any> {{\n",
                component_name
            ));
        }
    }

    let fields = state_class_fields(&json.state);
    if !fields.is_empty() {
        class_body.push('\n');
        class_body.push_str(&fields);
        class_body.push('\n');
    }

    if let Some(mount) = json.on_mount() {
        let processed = process_binding(mount, ctx)?;
        class_body.push_str(&format!(
            "\n  constructor(...args) {{\n    super(...args);\n\n    {}\n  }}\n",
            processed
        ));
    }

    class_body.push_str("\n  $newState() {\n    return {};\n  }\n}\n");

    if options.export_shape == ExportShape::Wrapped {
        class_body.push_str(&format!(
            "\nexport const {name}Component = new Proxy(_{name}Component, {{\n  get(target, prop) {{\n    if (prop === '$templateQRL') {{\n      return '{qrl}';\n    }}\n    return Reflect.get(...arguments);\n  }}\n}});\n",
            name = component_name,
            qrl = qrl
        ));
    }

    let mark_dirty = if class_body.contains("markDirty(") {
        ", markDirty"
    } else {
        ""
    };
    Ok(format!(
        "import {{ Component, QRL{} }} from '{}';\n\n{}",
        mark_dirty,
        qwik_import(options),
        class_body
    ))
}

/// One module per event binding, wrapping the rewritten handler body in
/// the runtime's injection scaffold.
fn event_handler_files(nodes: &mut [Node], ctx: &mut QwikContext<'_>) -> Result<Vec<File>> {
    let mut files = Vec::new();
    collect_handler_files(nodes, ctx, &mut files)?;
    Ok(files)
}

fn collect_handler_files(
    nodes: &mut [Node],
    ctx: &mut QwikContext<'_>,
    files: &mut Vec<File>,
) -> Result<()> {
    for node in nodes {
        let bindings: Vec<(String, String)> = node
            .bindings
            .iter()
            .filter(|(key, _)| is_event_key(key))
            .map(|(key, binding)| (key.clone(), binding.code.clone()))
            .collect();
        for (key, code) in bindings {
            let id = el_id(node, &mut ctx.names);
            let handler_name = format!("{}{}", id, &key[2..]);
            let component_name = ctx.component_name.clone();
            let body = remove_surrounding_block(&process_binding(&code, ctx)?);
            let export_clause = if ctx.options.bundle {
                format!("const on{} =", handler_name)
            } else {
                "default".to_string()
            };
            let contents = format!(
                "import {{\n  injectEventHandler,\n  provideEvent,\n  markDirty\n}} from '{lib}';\nimport {{ {name}Component }} from './{name}_component.js';\n\nexport {export_clause} injectEventHandler(\n  {name}Component,\n  provideEvent(),\n  async function (this: {name}Component, event: Event) {{\n    {body}\n  }}\n);\n",
                lib = qwik_import(ctx.options),
                name = component_name,
                export_clause = export_clause,
                body = body
            );
            let contents = format_code(contents, ctx, SourceKind::TypeScript);
            files.push(File {
                path: format!("{}_on{}.ts", component_name, handler_name),
                contents,
            });
        }
        collect_handler_files(&mut node.children, ctx, files)?;
    }
    Ok(())
}

pub async fn component_to_qwik(
    component: &Component,
    options: &QwikOptions,
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

    let css_options = CssOptions {
        class_property: "class".to_string(),
        prefix: options.css_namespace.clone(),
    };
    let mut css = collect_css(&mut json.children, &css_options)?;
    if options.minify_styles {
        css = minify_css(&css);
    } else {
        css = format_or_warn(formatter, is_pretty(options), css, SourceKind::Css);
    }
    let has_css = !css.trim().is_empty();
    let add_wrapper = json.children.len() > 1 || has_css;

    json = run_post_ir_plugins(json, &options.plugins);

    let component_name = component_display_name(&component.name);
    let mut ctx = QwikContext {
        options,
        component_name: component_name.clone(),
        names: NameRegistry::new(),
        rewriter,
        formatter,
    };

    let mut children_parts = Vec::new();
    for child in &mut json.children {
        children_parts.push(block_to_qwik(child, &mut ctx)?);
    }

    let mut header = format!(
        "import {{ injectMethod, QRL, jsxFactory }} from '{}';\n",
        qwik_import(options)
    );
    header.push_str(&format!(
        "import {{ {name}Component }} from './{name}_component.js';\n",
        name = component_name
    ));
    let import_lines = render_import_lines(&remap_lite_imports(&json.imports));
    if !import_lines.is_empty() {
        header.push_str(&import_lines);
        header.push('\n');
    }

    let mut body = String::new();
    if add_wrapper {
        body.push_str("<>\n");
    }
    if has_css {
        body.push_str(&format!("<style>{{`{}`}}</style>\n", css.trim()));
    }
    body.push_str(&children_parts.join("\n"));
    if add_wrapper {
        body.push_str("\n</>");
    }

    let template_export = if options.bundle {
        "const template ="
    } else {
        "default"
    };
    let mut template = format!(
        "{header}\nexport {export_clause} injectMethod({name}Component, function (this: {name}Component) {{\n  return ({body});\n}});\n",
        header = header,
        export_clause = template_export,
        name = component_name,
        body = body
    );

    template = run_pre_code_plugins(template, &options.plugins);
    template = format_code(template, &ctx, SourceKind::TypeScript);
    template = run_post_code_plugins(template, &options.plugins);

    let declaration = format_code(
        format!(
            "import {{ jsxDeclareComponent, QRL }} from '{}';\n\nexport const {} = jsxDeclareComponent(QRL`{}`, '{}');\n",
            qwik_import(options),
            component_name,
            template_qrl(options, &component_name),
            kebab_case(&component_name)
        ),
        &ctx,
        SourceKind::TypeScript,
    );

    let component_class = format_code(
        component_class_source(&json, &ctx)?,
        &ctx,
        SourceKind::TypeScript,
    );

    let handler_files = event_handler_files(&mut json.children, &mut ctx)?;
    let handler_paths: HashSet<String> = handler_files
        .iter()
        .map(|file| file.path.clone())
        .collect();

    let mut output = GeneratorOutput::default();
    output.files.push(File {
        path: format!("{}_template.tsx", component_name),
        contents: template,
    });
    output.files.push(File {
        path: format!("{}.ts", component_name),
        contents: declaration,
    });
    output.files.push(File {
        path: format!("{}_component.ts", component_name),
        contents: component_class,
    });
    output.files.extend(handler_files);

    if options.bundle {
        let linker = match &options.linker {
            Some(linker) => linker.as_ref(),
            None => return Err(GenerateError::MissingLinker),
        };
        let graph = VirtualModuleGraph::from_files(&output.files, |file| {
            file.path.ends_with(".tsx") || handler_paths.contains(&file.path)
        });
        let externals = vec![qwik_import(options).to_string()];
        let bundled = linker.link(&graph, &externals).await?;
        output.files.push(File {
            path: format!("{}/bundle.js", component_name),
            contents: bundled,
        });
    }

    Ok(output)
}
