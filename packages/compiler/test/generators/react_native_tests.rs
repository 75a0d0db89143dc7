//! React Native Generator Tests

use pretty_assertions::assert_eq;
use serde_json::json;

use refract_compiler::generators::react_native::collect_react_native_styles;
use refract_compiler::ir::CSS_KEY;
use refract_compiler::{component_to_react_native, Binding, Component, Node, ReactNativeOptions};

fn parse(value: serde_json::Value) -> Component {
    serde_json::from_value(value).expect("component should deserialize")
}

fn generate(component: &Component) -> (String, String) {
    let output = component_to_react_native(component, &ReactNativeOptions::default())
        .expect("generation should succeed");
    assert_eq!(output.files.len(), 1);
    let file = &output.files[0];
    (file.path.clone(), file.contents.clone())
}

#[test]
fn should_lower_host_elements_to_view_and_text() {
    let component = parse(json!({
        "name": "hello-native",
        "children": [
            {
                "name": "div",
                "children": [
                    { "name": "span", "properties": { "_text": "Hello" } }
                ]
            }
        ]
    }));
    let (path, contents) = generate(&component);
    assert_eq!(path, "HelloNative.tsx");
    assert_eq!(
        contents,
        r#"import * as React from 'react';
import { View, Text } from 'react-native';

export default function HelloNative() {
  return (<View><Text>Hello</Text></View>);
}
"#
    );
}

#[test]
fn should_hoist_bound_text_into_a_text_element() {
    let component = parse(json!({
        "name": "greeting",
        "props": { "name": "string" },
        "children": [
            { "name": "span", "bindings": { "_text": "props.name" } }
        ]
    }));
    let (_, contents) = generate(&component);
    assert!(contents.contains("import { Text } from 'react-native';\n"));
    assert!(contents.contains("return (<Text>{props.name}</Text>);"));
}

#[test]
fn should_leave_component_references_unlowered() {
    let component = parse(json!({
        "name": "shell",
        "children": [
            { "name": "MyWidget" }
        ]
    }));
    let (_, contents) = generate(&component);
    assert!(contents.contains("return (<MyWidget></MyWidget>);"));
    assert!(!contents.contains("react-native"));
}

#[test]
fn should_lower_inside_control_flow_nodes() {
    let component = parse(json!({
        "name": "cond",
        "state": { "visible": true },
        "children": [
            {
                "name": "Show",
                "bindings": { "when": "state.visible" },
                "children": [
                    { "name": "div", "properties": { "_text": "Yes" } }
                ]
            }
        ]
    }));
    let (_, contents) = generate(&component);
    assert!(contents.contains("return ({visible ? (\n<><Text>Yes</Text></>\n) : null});"));
}

#[test]
fn should_collect_styles_into_a_style_sheet() {
    let component = parse(json!({
        "name": "styled-native",
        "children": [
            {
                "name": "div",
                "bindings": { "css": "{ marginTop: 10 }" },
                "children": [
                    { "name": "span", "properties": { "_text": "Hi" } }
                ]
            }
        ]
    }));
    let (_, contents) = generate(&component);
    assert!(contents.contains("import { View, Text, StyleSheet } from 'react-native';\n"));
    assert!(contents.contains("return (<View style={styles.view}><Text>Hi</Text></View>);"));
    assert!(contents.ends_with(
        "const styles = StyleSheet.create({\n  view: {\n  \"marginTop\": 10\n},\n});\n"
    ));
}

#[test]
fn should_count_style_names_per_tag() {
    let component = parse(json!({
        "name": "rows",
        "children": [
            { "name": "div", "bindings": { "css": "{ flex: 1 }" } },
            { "name": "div", "bindings": { "css": "{ flex: 2 }" } }
        ]
    }));
    let (_, contents) = generate(&component);
    assert!(contents.contains("<View style={styles.view}></View>\n<View style={styles.view2}></View>"));
    assert!(contents.contains("  view: {"));
    assert!(contents.contains("  view2: {"));
}

#[test]
fn should_skip_empty_style_literals() {
    let component = parse(json!({
        "name": "plain",
        "children": [
            { "name": "div", "bindings": { "css": "{}" } }
        ]
    }));
    let (_, contents) = generate(&component);
    assert!(!contents.contains("StyleSheet"));
    assert!(!contents.contains("style={"));
    assert!(contents.contains("return (<View></View>);"));
}

#[test]
fn should_rewrite_state_through_the_delegated_emitter() {
    let component = parse(json!({
        "name": "native-counter",
        "state": { "count": 0 },
        "children": [
            { "name": "span", "bindings": { "_text": "state.count" } }
        ]
    }));
    let (_, contents) = generate(&component);
    assert!(contents.contains("import { useState } from 'react';\n"));
    assert!(contents.contains("const [count, setCount] = useState(() => 0);"));
    assert!(contents.contains("return (<Text>{count}</Text>);"));
}

#[test]
fn should_collect_styles_directly_from_a_node_list() {
    let mut styled = Node::new("View");
    styled
        .bindings
        .insert(CSS_KEY.to_string(), Binding::new("{ flex: 1, padding: 8 }"));
    let mut nodes = vec![styled, Node::new("View")];

    let styles = collect_react_native_styles(&mut nodes).unwrap();

    assert_eq!(styles.len(), 1);
    assert_eq!(styles["view"], json!({ "flex": 1, "padding": 8 }));
    assert_eq!(nodes[0].bindings["style"], Binding::new("styles.view"));
    assert!(nodes[0].bindings.get(CSS_KEY).is_none());
    assert!(nodes[1].bindings.get("style").is_none());
}
