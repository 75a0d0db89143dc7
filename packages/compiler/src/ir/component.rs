//! Component IR Root
//!
//! The deserialized form a front-end parser hands to the generators.
//! Generators treat it as immutable and clone before transforming.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::node::Node;

/// Hook slot run when a component instance is mounted.
pub const ON_MOUNT_HOOK: &str = "onMount";
/// Hook slot run when a component instance is removed.
pub const ON_UNMOUNT_HOOK: &str = "onUnMount";

/// One import statement carried on the component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportEntry {
    pub path: String,
    /// Local name to exported name. The exported names `default` and `*`
    /// select the default and namespace exports.
    pub imports: IndexMap<String, String>,
}

impl ImportEntry {
    pub fn new(path: impl Into<String>) -> Self {
        ImportEntry {
            path: path.into(),
            imports: IndexMap::new(),
        }
    }
}

/// Root of the component IR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    pub name: String,
    pub imports: Vec<ImportEntry>,
    /// Lifecycle hook bodies keyed by hook name (`onMount`, `onUnMount`).
    /// Unrecognized keys are carried through untouched.
    pub hooks: IndexMap<String, String>,
    /// State fields and their initial values, in declaration order.
    pub state: IndexMap<String, Value>,
    /// Prop names mapped to their type text, in declaration order.
    pub props: IndexMap<String, String>,
    pub children: Vec<Node>,
    pub meta: IndexMap<String, Value>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Component {
            name: name.into(),
            ..Component::default()
        }
    }

    /// Non-blank `onMount` hook body, if declared.
    pub fn on_mount(&self) -> Option<&str> {
        self.hooks
            .get(ON_MOUNT_HOOK)
            .map(String::as_str)
            .filter(|code| !code.trim().is_empty())
    }

    /// Non-blank `onUnMount` hook body, if declared.
    pub fn on_unmount(&self) -> Option<&str> {
        self.hooks
            .get(ON_UNMOUNT_HOOK)
            .map(String::as_str)
            .filter(|code| !code.trim().is_empty())
    }
}
