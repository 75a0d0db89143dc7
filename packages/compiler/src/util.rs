//! Utility Functions
//!
//! String helpers shared across the IR passes and the generators: case
//! conversion, attribute-name validation and HTML attribute escaping.

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex matching separator runs followed by a word character
static WORD_SEPARATOR_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-_\s:]+([a-zA-Z0-9])").unwrap());

/// Attribute names must start with a letter, `_` or `:` and continue with
/// word characters, dashes, colons or periods.
static VALID_ATTRIBUTE_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9\-_:.]*$").unwrap());

/// Convert a dash/underscore/space separated name to camelCase.
///
/// The first character is lowercased, so `MyComponent` becomes `myComponent`
/// and `my-component` becomes `myComponent`.
pub fn camel_case(input: &str) -> String {
    let joined = WORD_SEPARATOR_REGEXP
        .replace_all(input, |caps: &regex::Captures| {
            caps.get(1).map(|m| m.as_str().to_uppercase()).unwrap_or_default()
        })
        .to_string();
    let trimmed = joined.trim_matches(|c: char| c == '-' || c == '_' || c.is_whitespace());
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a camelCase or space/underscore separated name to kebab-case.
///
/// Used for custom-element tag names: `MyComponent` becomes `my-component`.
pub fn kebab_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 4);
    let mut prev_lower = false;
    for ch in input.chars() {
        if ch == '_' || ch.is_whitespace() {
            if !result.ends_with('-') {
                result.push('-');
            }
            prev_lower = false;
        } else if ch.is_ascii_uppercase() {
            if prev_lower {
                result.push('-');
            }
            result.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            result.push(ch);
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    result.trim_matches('-').to_string()
}

/// Convert a camelCase CSS property name to its hyphenated form.
///
/// `marginTop` becomes `margin-top`. A dash is only inserted when an
/// uppercase letter follows a lowercase one, so already-hyphenated names
/// pass through unchanged.
pub fn hyphenate(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 4);
    let mut prev_lower = false;
    for ch in value.chars() {
        if ch.is_ascii_uppercase() && prev_lower {
            result.push('-');
        }
        prev_lower = ch.is_ascii_lowercase();
        result.push(ch.to_ascii_lowercase());
    }
    result
}

/// Check whether a property key can be emitted as a JSX/HTML attribute name.
pub fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty() && VALID_ATTRIBUTE_REGEXP.is_match(name)
}

/// Escape a string for use inside a double-quoted HTML attribute value.
pub fn html_attribute_escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Strip one level of surrounding `{ ... }` from a code block, if present.
///
/// Event-handler bodies arrive either as bare statements or as a block;
/// the emitted handler wraps them in its own function body.
pub fn remove_surrounding_block(code: &str) -> String {
    let trimmed = code.trim();
    if let Some(inner) = trimmed.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        inner.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

// Tests are in test/ directory
