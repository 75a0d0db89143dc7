//! Qwik Generator Tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use refract_compiler::bundle::{ModuleLinker, VirtualModuleGraph};
use refract_compiler::error::{FormatError, LinkError};
use refract_compiler::format::{SourceFormatter, SourceKind};
use refract_compiler::plugins::Plugin;
use refract_compiler::{component_to_qwik, Component, ExportShape, GenerateError, QwikOptions};

fn parse(value: serde_json::Value) -> Component {
    serde_json::from_value(value).expect("component should deserialize")
}

fn counter() -> Component {
    parse(json!({
        "name": "my-counter",
        "state": { "count": 0 },
        "children": [
            {
                "name": "div",
                "children": [
                    {
                        "name": "button",
                        "bindings": { "onClick": "state.count = state.count + 1" }
                    },
                    { "name": "span", "bindings": { "_text": "state.count" } }
                ]
            }
        ]
    }))
}

async fn generate(component: &Component, options: &QwikOptions) -> Vec<(String, String)> {
    let output = component_to_qwik(component, options)
        .await
        .expect("generation should succeed");
    output
        .files
        .into_iter()
        .map(|file| (file.path, file.contents))
        .collect()
}

#[tokio::test]
async fn should_emit_the_resumable_file_set() {
    let files = generate(&counter(), &QwikOptions::default()).await;
    let paths: Vec<&str> = files.iter().map(|(path, _)| path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "MyCounter_template.tsx",
            "MyCounter.ts",
            "MyCounter_component.ts",
            "MyCounter_onButtonClick.ts",
        ]
    );

    assert_eq!(
        files[0].1,
        r#"import { injectMethod, QRL, jsxFactory } from '@builder.io/qwik';
import { MyCounterComponent } from './MyCounter_component.js';

export default injectMethod(MyCounterComponent, function (this: MyCounterComponent) {
  return (<div><button on:click={QRL`ui:/MyCounter_onButtonClick`}></button>
{this.count}</div>);
});
"#
    );

    assert_eq!(
        files[1].1,
        r#"import { jsxDeclareComponent, QRL } from '@builder.io/qwik';

export const MyCounter = jsxDeclareComponent(QRL`ui:/MyCounter_template`, 'my-counter');
"#
    );

    assert_eq!(
        files[2].1,
        r#"import { Component, QRL } from '@builder.io/qwik';

export class MyCounterComponent extends Component<any, any> {
  static $templateQRL = 'ui:/MyCounter_template';

  count = 0;

  $newState() {
    return {};
  }
}
"#
    );

    assert_eq!(
        files[3].1,
        r#"import {
  injectEventHandler,
  provideEvent,
  markDirty
} from '@builder.io/qwik';
import { MyCounterComponent } from './MyCounter_component.js';

export default injectEventHandler(
  MyCounterComponent,
  provideEvent(),
  async function (this: MyCounterComponent, event: Event) {
    this.count = this.count + 1; markDirty(this)
  }
);
"#
    );
}

#[tokio::test]
async fn should_import_mark_dirty_for_mount_mutations() {
    let component = parse(json!({
        "name": "my-counter",
        "state": { "count": 0 },
        "hooks": { "onMount": "state.count = 1" },
        "children": [
            { "name": "span", "bindings": { "_text": "state.count" } }
        ]
    }));
    let files = generate(&component, &QwikOptions::default()).await;
    let class_source = &files[2].1;
    assert!(class_source.starts_with("import { Component, QRL, markDirty } from '@builder.io/qwik';\n"));
    assert!(class_source.contains(
        "\n  constructor(...args) {\n    super(...args);\n\n    this.count = 1; markDirty(this)\n  }\n"
    ));
}

#[tokio::test]
async fn should_honor_custom_library_and_locator_options() {
    let options = QwikOptions {
        qwik_lib: Some("my-qwik".to_string()),
        qrl_prefix: Some("app:".to_string()),
        qrl_suffix: Some("#h".to_string()),
        ..QwikOptions::default()
    };
    let files = generate(&counter(), &options).await;
    assert!(files[0].1.starts_with("import { injectMethod, QRL, jsxFactory } from 'my-qwik';\n"));
    assert!(files[0].1.contains("on:click={QRL`app:/MyCounter_onButtonClick#h`}"));
    assert!(files[1]
        .1
        .contains("jsxDeclareComponent(QRL`app:/MyCounter_template#h`, 'my-counter');"));
    assert!(files[2].1.contains("static $templateQRL = 'app:/MyCounter_template#h';"));
}

#[tokio::test]
async fn should_wrap_the_class_in_a_proxy_when_asked() {
    let options = QwikOptions {
        export_shape: ExportShape::Wrapped,
        ..QwikOptions::default()
    };
    let files = generate(&counter(), &options).await;
    let class_source = &files[2].1;
    assert!(class_source.contains("class _MyCounterComponent extends Component<any, any> {"));
    assert!(!class_source.contains("static $templateQRL"));
    assert!(class_source.contains(
        "export const MyCounterComponent = new Proxy(_MyCounterComponent, {"
    ));
    assert!(class_source.contains("return 'ui:/MyCounter_template';"));
}

#[tokio::test]
async fn should_render_for_nodes_as_map_calls() {
    let component = parse(json!({
        "name": "item-list",
        "state": { "items": [] },
        "children": [
            {
                "name": "ul",
                "children": [
                    {
                        "name": "For",
                        "bindings": { "each": "state.items" },
                        "properties": { "_forName": "item" },
                        "children": [
                            { "name": "div", "properties": { "_text": "\n   " } },
                            {
                                "name": "li",
                                "children": [
                                    { "name": "div", "bindings": { "_text": "item.label" } }
                                ]
                            }
                        ]
                    }
                ]
            }
        ]
    }));
    let files = generate(&component, &QwikOptions::default()).await;
    let template = &files[0].1;
    assert!(
        template.contains("<ul>{this.items.map(item => (\n<><li>{item.label}</li></>\n))}</ul>")
    );
}

#[tokio::test]
async fn should_render_show_nodes_as_ternaries() {
    let component = parse(json!({
        "name": "maybe",
        "state": { "open": true },
        "children": [
            {
                "name": "Show",
                "bindings": { "when": "state.open" },
                "children": [
                    { "name": "div", "properties": { "_text": "Open" } }
                ]
            }
        ]
    }));
    let files = generate(&component, &QwikOptions::default()).await;
    let template = &files[0].1;
    assert!(template.contains("return ({this.open ? (\n<>Open</>\n) : undefined});"));
}

#[tokio::test]
async fn should_collect_css_into_the_template() {
    let component = parse(json!({
        "name": "styled-box",
        "children": [
            {
                "name": "div",
                "bindings": { "css": "{ color: 'red' }" },
                "children": [
                    { "name": "div", "properties": { "_text": "Hi" } }
                ]
            }
        ]
    }));
    let files = generate(&component, &QwikOptions::default()).await;
    let template = &files[0].1;
    assert!(template.contains("return (<>\n<style>{`.div {\n  color: red;\n}`}</style>\n"));
    assert!(template.contains("<div class=\"div\">Hi</div>\n</>);"));
}

#[tokio::test]
async fn should_use_name_hints_for_handler_ids() {
    let component = parse(json!({
        "name": "my-counter",
        "state": { "count": 0 },
        "children": [
            {
                "name": "button",
                "properties": { "$name": "increment" },
                "bindings": { "onClick": "state.count++" }
            }
        ]
    }));
    let files = generate(&component, &QwikOptions::default()).await;
    assert!(files[0].1.contains("on:click={QRL`ui:/MyCounter_onIncrementClick`}"));
    assert!(!files[0].1.contains("$name"));
    assert_eq!(files[3].0, "MyCounter_onIncrementClick.ts");
}

#[tokio::test]
async fn should_allocate_one_id_per_element() {
    let component = parse(json!({
        "name": "my-counter",
        "state": { "count": 0 },
        "children": [
            {
                "name": "button",
                "bindings": {
                    "onClick": "state.count++",
                    "onMouseOver": "state.count--"
                }
            }
        ]
    }));
    let files = generate(&component, &QwikOptions::default()).await;
    assert!(files[0].1.contains(
        " on:click={QRL`ui:/MyCounter_onButtonClick`} on:mouseover={QRL`ui:/MyCounter_onButtonMouseOver`}"
    ));
    assert_eq!(files[3].0, "MyCounter_onButtonClick.ts");
    assert_eq!(files[4].0, "MyCounter_onButtonMouseOver.ts");
}

#[tokio::test]
async fn should_count_ids_per_tag_name() {
    let component = parse(json!({
        "name": "my-counter",
        "state": { "count": 0 },
        "children": [
            { "name": "button", "bindings": { "onClick": "state.count++" } },
            { "name": "button", "bindings": { "onClick": "state.count--" } }
        ]
    }));
    let files = generate(&component, &QwikOptions::default()).await;
    assert!(files[0].1.contains("on:click={QRL`ui:/MyCounter_onButtonClick`}"));
    assert!(files[0].1.contains("on:click={QRL`ui:/MyCounter_onButton2Click`}"));
    assert_eq!(files[3].0, "MyCounter_onButtonClick.ts");
    assert_eq!(files[4].0, "MyCounter_onButton2Click.ts");
}

#[tokio::test]
async fn should_remap_lite_imports_to_built_modules() {
    let component = parse(json!({
        "name": "shell",
        "imports": [
            { "path": "./other.lite", "imports": { "Other": "default" } }
        ],
        "children": [
            { "name": "Other" }
        ]
    }));
    let files = generate(&component, &QwikOptions::default()).await;
    assert!(files[0].1.contains("import { Other } from '../Other/public.js';\n"));
    assert!(!files[0].1.contains(".lite"));
}

#[tokio::test]
async fn should_run_plugins_on_the_template() {
    let plugin = Plugin {
        ir_pre: Some(Arc::new(|mut component: Component| {
            if let Some(node) = component.children.first_mut() {
                node.properties
                    .insert("data-stage".to_string(), "pre".to_string());
            }
            component
        })),
        code_post: Some(Arc::new(|code: String| format!("{}// tail\n", code))),
        ..Plugin::default()
    };
    let options = QwikOptions {
        plugins: vec![plugin],
        ..QwikOptions::default()
    };
    let files = generate(&counter(), &options).await;
    assert!(files[0].1.contains(" data-stage=\"pre\""));
    assert!(files[0].1.ends_with("// tail\n"));
    assert!(!files[1].1.ends_with("// tail\n"));
}

struct MarkerFormatter;

impl SourceFormatter for MarkerFormatter {
    fn format(&self, code: &str, kind: SourceKind) -> Result<String, FormatError> {
        if code.trim().is_empty() {
            return Ok(code.to_string());
        }
        match kind {
            SourceKind::TypeScript => Ok(format!("{}// formatted\n", code)),
            SourceKind::Css => Ok(code.to_string()),
        }
    }
}

#[tokio::test]
async fn should_format_every_module_unless_pretty_is_off() {
    let options = QwikOptions {
        formatter: Some(Arc::new(MarkerFormatter)),
        ..QwikOptions::default()
    };
    let files = generate(&counter(), &options).await;
    for (path, contents) in &files {
        assert!(contents.ends_with("// formatted\n"), "unformatted: {}", path);
    }

    let options = QwikOptions {
        pretty: Some(false),
        formatter: Some(Arc::new(MarkerFormatter)),
        ..QwikOptions::default()
    };
    let files = generate(&counter(), &options).await;
    for (path, contents) in &files {
        assert!(!contents.contains("// formatted"), "formatted: {}", path);
    }
}

#[tokio::test]
async fn should_emit_identical_output_for_identical_input() {
    let component = counter();
    let first = component_to_qwik(&component, &QwikOptions::default())
        .await
        .unwrap();
    let second = component_to_qwik(&component, &QwikOptions::default())
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn should_leave_the_input_component_untouched() {
    let component = counter();
    let before = component.clone();
    component_to_qwik(&component, &QwikOptions::default())
        .await
        .unwrap();
    assert_eq!(component, before);
}

#[derive(Default)]
struct RecordingLinker {
    captured: Mutex<Option<(VirtualModuleGraph, Vec<String>)>>,
}

#[async_trait]
impl ModuleLinker for RecordingLinker {
    async fn link(
        &self,
        graph: &VirtualModuleGraph,
        externals: &[String],
    ) -> Result<String, LinkError> {
        *self.captured.lock().unwrap() = Some((graph.clone(), externals.to_vec()));
        Ok("// bundled\n".to_string())
    }
}

#[tokio::test]
async fn should_fail_bundle_mode_without_a_linker() {
    let options = QwikOptions {
        bundle: true,
        ..QwikOptions::default()
    };
    let err = component_to_qwik(&counter(), &options).await.unwrap_err();
    assert!(matches!(err, GenerateError::MissingLinker));
}

#[tokio::test]
async fn should_link_the_public_modules_in_bundle_mode() {
    let linker = Arc::new(RecordingLinker::default());
    let options = QwikOptions {
        bundle: true,
        linker: Some(linker.clone()),
        ..QwikOptions::default()
    };
    let files = generate(&counter(), &options).await;

    let paths: Vec<&str> = files.iter().map(|(path, _)| path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "MyCounter_template.tsx",
            "MyCounter.ts",
            "MyCounter_component.ts",
            "MyCounter_onButtonClick.ts",
            "MyCounter/bundle.js",
        ]
    );

    assert!(files[0].1.contains("export const template = injectMethod("));
    assert!(files[0].1.contains("on:click={QRL`ui:/MyCounter/bundle.onButtonClick`}"));
    assert!(files[1]
        .1
        .contains("jsxDeclareComponent(QRL`ui:/MyCounter/bundle.template`, 'my-counter');"));
    assert!(files[2].1.contains("static $templateQRL = 'ui:/MyCounter/bundle.template';"));
    assert!(files[3].1.contains("export const onButtonClick = injectEventHandler("));
    assert_eq!(files[4].1, "// bundled\n");

    let captured = linker.captured.lock().unwrap();
    let (graph, externals) = captured.as_ref().expect("linker should have run");
    assert_eq!(graph.entry_name, "entry");
    assert_eq!(
        graph.entry_source,
        "export * from './MyCounter_template.js';\nexport * from './MyCounter_onButtonClick.js';"
    );
    let module_names: Vec<&str> = graph.modules.keys().map(String::as_str).collect();
    assert_eq!(
        module_names,
        vec![
            "./MyCounter_template.js",
            "./MyCounter.js",
            "./MyCounter_component.js",
            "./MyCounter_onButtonClick.js",
        ]
    );
    assert_eq!(externals, &vec!["@builder.io/qwik".to_string()]);
}
