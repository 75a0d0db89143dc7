//! Style Collection
//!
//! A node may carry a `css` binding holding a JSON5-ish object literal
//! (`{ color: 'red', '&:hover': { color: 'blue' } }`). The collector
//! parses each literal, removes the raw binding, assigns the node a
//! deterministic class name and accumulates a class-keyed style map that
//! generators render to stylesheet text. Parsing reuses the expression
//! token scanner, so quoting, escapes and nesting behave the same as in
//! binding code.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::StyleError;
use crate::ir::{Node, CSS_KEY};
use crate::naming::NameRegistry;
use crate::rewrite::lexer::{Lexer, Token, TokenKind};
use crate::util::{camel_case, hyphenate};

/// Generated class name → parsed style declaration object.
pub type ClassStyleMap = IndexMap<String, Value>;

/// Knobs for the web collector.
#[derive(Debug, Clone)]
pub struct CssOptions {
    /// Property the generated class name is appended to (`class` or
    /// `className` depending on the target).
    pub class_property: String,
    /// Optional namespace applied to every generated class name as
    /// `{prefix}-{name}`.
    pub prefix: Option<String>,
}

impl Default for CssOptions {
    fn default() -> Self {
        CssOptions {
            class_property: "class".to_string(),
            prefix: None,
        }
    }
}

/// Walk the tree, strip every `css` binding and build the class-keyed
/// style map. Class names are the camel-cased tag name claimed through a
/// fresh [`NameRegistry`] (`div`, `div2`, ...), counting only nodes that
/// actually carry styles. The node is rewritten to reference its class
/// through `options.class_property`, appended to any existing value.
pub fn collect_class_styles(
    nodes: &mut [Node],
    options: &CssOptions,
) -> Result<ClassStyleMap, StyleError> {
    let mut styles = ClassStyleMap::new();
    let mut names = NameRegistry::new();
    collect_into(nodes, options, &mut names, &mut styles)?;
    Ok(styles)
}

fn collect_into(
    nodes: &mut [Node],
    options: &CssOptions,
    names: &mut NameRegistry,
    styles: &mut ClassStyleMap,
) -> Result<(), StyleError> {
    for node in nodes {
        if let Some(binding) = node.bindings.shift_remove(CSS_KEY) {
            let value = parse_style_literal(&binding.code)?;
            if !is_empty_style(&value) {
                let base = if node.name.is_empty() {
                    "div".to_string()
                } else {
                    camel_case(&node.name)
                };
                let name = names.claim(&base);
                let class_name = match &options.prefix {
                    Some(prefix) => format!("{}-{}", prefix, name),
                    None => name,
                };
                let existing = node
                    .properties
                    .get(&options.class_property)
                    .cloned()
                    .unwrap_or_default();
                let joined = format!("{} {}", existing, class_name).trim().to_string();
                node.properties
                    .insert(options.class_property.clone(), joined);
                styles.insert(class_name, value);
            }
        }
        collect_into(&mut node.children, options, names, styles)?;
    }
    Ok(())
}

/// Collect and render in one step; what the web generators call.
pub fn collect_css(nodes: &mut [Node], options: &CssOptions) -> Result<String, StyleError> {
    let styles = collect_class_styles(nodes, options)?;
    Ok(render_css(&styles))
}

/// An empty literal produces no class and no stylesheet text.
pub fn is_empty_style(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

/// Render the style map to stylesheet text. Plain entries become
/// declarations on the class selector; object-valued entries are nested
/// rules: `@`-keys wrap the class rule, selectors containing `&` splice
/// the class in, anything else is treated as a descendant selector.
pub fn render_css(styles: &ClassStyleMap) -> String {
    let mut out = String::new();
    for (class_name, value) in styles {
        let entries = match value {
            Value::Object(entries) => entries,
            _ => continue,
        };

        let mut plain = Vec::new();
        let mut nested = Vec::new();
        for (key, value) in entries {
            if value.is_object() {
                nested.push((key, value));
            } else {
                plain.push((key, value));
            }
        }

        out.push_str(&format!(".{} {{\n{}}}\n", class_name, declarations(&plain)));

        for (selector, value) in nested {
            let body = match value {
                Value::Object(entries) => {
                    let plain: Vec<_> = entries.iter().filter(|(_, v)| !v.is_object()).collect();
                    declarations(&plain)
                }
                _ => String::new(),
            };
            if let Some(at_rule) = selector.strip_prefix('@') {
                out.push_str(&format!(
                    "@{} {{\n.{} {{\n{}}}\n}}\n",
                    at_rule, class_name, body
                ));
            } else if selector.contains('&') {
                let resolved = selector.replace('&', &format!(".{}", class_name));
                out.push_str(&format!("{} {{\n{}}}\n", resolved, body));
            } else {
                out.push_str(&format!(".{} {} {{\n{}}}\n", class_name, selector, body));
            }
        }
    }
    out
}

fn declarations(entries: &[(&String, &Value)]) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(&format!("  {}: {};\n", hyphenate(key), css_value(value)));
    }
    out
}

fn css_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    }
}

/// Collapse stylesheet text to a single line instead of pretty-printing.
pub fn minify_css(css: &str) -> String {
    css.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse the JSON5-ish object-literal text of a `css` binding: unquoted
/// identifier keys, single- or double-quoted strings, numbers, booleans,
/// nested objects and arrays, trailing commas.
pub fn parse_style_literal(code: &str) -> Result<Value, StyleError> {
    let tokens = Lexer::new().tokenize(code)?;
    let mut parser = StyleParser {
        tokens: &tokens,
        index: 0,
    };
    let value = parser.parse_value()?;
    if let Some(extra) = parser.peek() {
        return Err(StyleError::UnexpectedToken {
            expected: "end of style literal",
            found: extra.text.clone(),
            offset: extra.start,
        });
    }
    Ok(value)
}

struct StyleParser<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> StyleParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.index);
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn expect_character(&mut self, ch: char, expected: &'static str) -> Result<(), StyleError> {
        match self.bump() {
            Some(token) if token.is_character(ch) => Ok(()),
            Some(token) => Err(StyleError::UnexpectedToken {
                expected,
                found: token.text.clone(),
                offset: token.start,
            }),
            None => Err(StyleError::UnexpectedEnd),
        }
    }

    fn parse_value(&mut self) -> Result<Value, StyleError> {
        let token = match self.peek() {
            Some(token) => token,
            None => return Err(StyleError::UnexpectedEnd),
        };

        if token.is_character('{') {
            return self.parse_object();
        }
        if token.is_character('[') {
            return self.parse_array();
        }

        match token.kind {
            TokenKind::String => {
                let text = decode_string(&token.text, token.start)?;
                self.index += 1;
                Ok(Value::String(text))
            }
            TokenKind::Number => {
                let value = parse_number(&token.text)?;
                self.index += 1;
                Ok(value)
            }
            TokenKind::Keyword => match token.text.as_str() {
                "true" => {
                    self.index += 1;
                    Ok(Value::Bool(true))
                }
                "false" => {
                    self.index += 1;
                    Ok(Value::Bool(false))
                }
                "null" | "undefined" => {
                    self.index += 1;
                    Ok(Value::Null)
                }
                _ => Err(StyleError::UnexpectedToken {
                    expected: "a style value",
                    found: token.text.clone(),
                    offset: token.start,
                }),
            },
            TokenKind::Operator if token.text == "-" || token.text == "+" => {
                let negate = token.text == "-";
                self.index += 1;
                match self.bump() {
                    Some(number) if number.kind == TokenKind::Number => {
                        let value = parse_number(&number.text)?;
                        if negate {
                            negate_number(value, &number.text)
                        } else {
                            Ok(value)
                        }
                    }
                    Some(other) => Err(StyleError::UnexpectedToken {
                        expected: "a number",
                        found: other.text.clone(),
                        offset: other.start,
                    }),
                    None => Err(StyleError::UnexpectedEnd),
                }
            }
            _ => Err(StyleError::UnexpectedToken {
                expected: "a style value",
                found: token.text.clone(),
                offset: token.start,
            }),
        }
    }

    fn parse_object(&mut self) -> Result<Value, StyleError> {
        self.expect_character('{', "`{`")?;
        let mut map = Map::new();
        loop {
            match self.peek() {
                None => return Err(StyleError::UnexpectedEnd),
                Some(token) if token.is_character('}') => {
                    self.index += 1;
                    return Ok(Value::Object(map));
                }
                _ => {}
            }

            let key = match self.bump() {
                Some(token)
                    if token.kind == TokenKind::Identifier
                        || token.kind == TokenKind::Keyword =>
                {
                    token.text.clone()
                }
                Some(token) if token.kind == TokenKind::String => {
                    decode_string(&token.text, token.start)?
                }
                Some(token) => {
                    return Err(StyleError::UnexpectedToken {
                        expected: "a property name",
                        found: token.text.clone(),
                        offset: token.start,
                    })
                }
                None => return Err(StyleError::UnexpectedEnd),
            };

            self.expect_character(':', "`:`")?;
            let value = self.parse_value()?;
            map.insert(key, value);

            match self.peek() {
                Some(token) if token.is_character(',') => {
                    self.index += 1;
                }
                Some(token) if token.is_character('}') => {}
                Some(token) => {
                    return Err(StyleError::UnexpectedToken {
                        expected: "`,` or `}`",
                        found: token.text.clone(),
                        offset: token.start,
                    })
                }
                None => return Err(StyleError::UnexpectedEnd),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, StyleError> {
        self.expect_character('[', "`[`")?;
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => return Err(StyleError::UnexpectedEnd),
                Some(token) if token.is_character(']') => {
                    self.index += 1;
                    return Ok(Value::Array(items));
                }
                _ => {}
            }

            items.push(self.parse_value()?);

            match self.peek() {
                Some(token) if token.is_character(',') => {
                    self.index += 1;
                }
                Some(token) if token.is_character(']') => {}
                Some(token) => {
                    return Err(StyleError::UnexpectedToken {
                        expected: "`,` or `]`",
                        found: token.text.clone(),
                        offset: token.start,
                    })
                }
                None => return Err(StyleError::UnexpectedEnd),
            }
        }
    }
}

fn parse_number(raw: &str) -> Result<Value, StyleError> {
    let cleaned: String = raw.chars().filter(|&ch| ch != '_').collect();
    if let Ok(int) = cleaned.parse::<i64>() {
        return Ok(Value::Number(int.into()));
    }
    match cleaned.parse::<f64>() {
        Ok(float) => serde_json::Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| StyleError::InvalidNumber(raw.to_string())),
        Err(_) => Err(StyleError::InvalidNumber(raw.to_string())),
    }
}

fn negate_number(value: Value, raw: &str) -> Result<Value, StyleError> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(Value::Number((-int).into()));
            }
            match number.as_f64() {
                Some(float) => serde_json::Number::from_f64(-float)
                    .map(Value::Number)
                    .ok_or_else(|| StyleError::InvalidNumber(raw.to_string())),
                None => Err(StyleError::InvalidNumber(raw.to_string())),
            }
        }
        other => Ok(other),
    }
}

/// Decode a quoted string token (quotes included in `raw`) to its value.
fn decode_string(raw: &str, offset: usize) -> Result<String, StyleError> {
    let inner = if raw.len() >= 2 { &raw[1..raw.len() - 1] } else { raw };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('v') => out.push('\u{000B}'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        return Err(StyleError::UnexpectedToken {
                            expected: "a valid escape sequence",
                            found: format!("\\u{}", hex),
                            offset,
                        })
                    }
                }
            }
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        return Err(StyleError::UnexpectedToken {
                            expected: "a valid escape sequence",
                            found: format!("\\x{}", hex),
                            offset,
                        })
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}
