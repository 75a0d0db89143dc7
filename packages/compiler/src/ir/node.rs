//! IR Nodes
//!
//! A [`Node`] is one element of the component tree. Tag names carry the
//! structure: the reserved names `Fragment`, `For` and `Show` select
//! control-flow behavior, anything else is a host element or component
//! reference. Properties are static strings, bindings are embedded
//! expression code.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved binding/property key: literal text content of the node.
pub const TEXT_KEY: &str = "_text";
/// Reserved binding key: object spread onto the element.
pub const SPREAD_KEY: &str = "_spread";
/// Reserved binding key: extracted style object literal.
pub const CSS_KEY: &str = "css";
/// Reserved property key: iteration variable name of a `For` node.
pub const FOR_NAME_KEY: &str = "_forName";
/// Reserved binding key: iterable expression of a `For` node.
pub const EACH_KEY: &str = "each";
/// Reserved binding key: condition expression of a `Show` node.
pub const WHEN_KEY: &str = "when";
/// Reserved property key: author-chosen name hint for id allocation.
pub const NAME_HINT_KEY: &str = "$name";
/// Node meta key the id allocator memoizes into.
pub const ID_META_KEY: &str = "id";

/// Structural kind of a node, derived from its tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Transparent grouping; emits no element of its own.
    Fragment,
    /// Repeats its children once per item of the bound collection.
    For,
    /// Emits its children only while the bound condition holds.
    Show,
    /// Everything else: a host element or component reference.
    Element,
}

/// Expression bound to an attribute, event or directive slot.
///
/// `code` is JS-flavored source text. The compiler rewrites it lexically
/// (reference roots, dirty markers, setters) and never evaluates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BindingRepr")]
pub struct Binding {
    pub code: String,
    /// Set when the expression is already a function of the event, so
    /// generators that inline handlers emit it verbatim instead of
    /// wrapping it in an arrow.
    #[serde(default)]
    pub is_arrow_function: bool,
}

impl Binding {
    pub fn new(code: impl Into<String>) -> Self {
        Binding {
            code: code.into(),
            is_arrow_function: false,
        }
    }

    pub fn arrow(code: impl Into<String>) -> Self {
        Binding {
            code: code.into(),
            is_arrow_function: true,
        }
    }
}

impl From<&str> for Binding {
    fn from(code: &str) -> Self {
        Binding::new(code)
    }
}

impl From<String> for Binding {
    fn from(code: String) -> Self {
        Binding::new(code)
    }
}

/// Front-end parsers serialize bindings either as a bare code string or as
/// an object with flags; both deserialize into [`Binding`].
#[derive(Deserialize)]
#[serde(untagged)]
enum BindingRepr {
    Code(String),
    Full {
        code: String,
        #[serde(default, alias = "isArrowFunction")]
        is_arrow_function: bool,
    },
}

impl From<BindingRepr> for Binding {
    fn from(repr: BindingRepr) -> Self {
        match repr {
            BindingRepr::Code(code) => Binding::new(code),
            BindingRepr::Full {
                code,
                is_arrow_function,
            } => Binding {
                code,
                is_arrow_function,
            },
        }
    }
}

/// One element of the component tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub name: String,
    pub properties: IndexMap<String, String>,
    pub bindings: IndexMap<String, Binding>,
    pub children: Vec<Node>,
    pub meta: IndexMap<String, Value>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            ..Node::default()
        }
    }

    /// Structural kind, with unknown tag names falling through to
    /// [`NodeKind::Element`].
    pub fn kind(&self) -> NodeKind {
        match self.name.as_str() {
            "Fragment" => NodeKind::Fragment,
            "For" => NodeKind::For,
            "Show" => NodeKind::Show,
            _ => NodeKind::Element,
        }
    }

    /// Static text content carried on the node, if any.
    pub fn text_property(&self) -> Option<&str> {
        self.properties.get(TEXT_KEY).map(String::as_str)
    }

    /// Bound (dynamic) text content carried on the node, if any.
    pub fn text_binding(&self) -> Option<&Binding> {
        self.bindings.get(TEXT_KEY)
    }

    /// Whether the node carries non-blank text content, static or bound.
    pub fn has_text(&self) -> bool {
        self.text_property()
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false)
            || self
                .text_binding()
                .map(|binding| !binding.code.trim().is_empty())
                .unwrap_or(false)
    }
}

/// Keys starting with `on` denote event bindings.
pub fn is_event_key(key: &str) -> bool {
    key.starts_with("on")
}

/// Internal (`_`) and directive (`$`) keys never emit as attributes.
pub fn is_internal_key(key: &str) -> bool {
    key.starts_with('_') || key.starts_with('$')
}
