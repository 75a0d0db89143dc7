//! Deterministic name allocation for generated artifacts.
//!
//! Element ids feed generated symbol and file names, so they have to be
//! stable across runs and unique within a component. A [`NameRegistry`]
//! hands out `base`, `base2`, `base3`... in first-come order; derived ids
//! are memoized on the node so every later lookup agrees with the first.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::ir::{walk_nodes_mut, Node, ID_META_KEY, NAME_HINT_KEY};
use crate::util::{camel_case, capitalize};

// h1-h9 keep their digit instead of camel-casing into `h-1` territory.
static HEADING_TAG_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^h\d$").unwrap());

/// Counter-per-base allocator. The first claim of a base returns it
/// unchanged; later claims append the running count.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    counts: IndexMap<String, usize>,
}

impl NameRegistry {
    pub fn new() -> Self {
        NameRegistry::default()
    }

    pub fn claim(&mut self, base: &str) -> String {
        let count = self.counts.entry(base.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base.to_string()
        } else {
            format!("{}{}", base, count)
        }
    }
}

/// The registry base for a node: an explicit `$name` property wins,
/// heading tags pass through untouched, anything else is camel-cased with
/// `div` standing in for a missing name.
pub fn id_base(node: &Node) -> String {
    if let Some(hint) = node.properties.get(NAME_HINT_KEY) {
        return camel_case(hint);
    }
    if HEADING_TAG_REGEXP.is_match(&node.name) {
        return node.name.clone();
    }
    if node.name.is_empty() {
        "div".to_string()
    } else {
        camel_case(&node.name)
    }
}

/// Allocate the next id for `node`: the claimed base, capitalized.
pub fn get_id(node: &Node, names: &mut NameRegistry) -> String {
    capitalize(&names.claim(&id_base(node)))
}

/// The memoized id for `node`, allocating one on first use. Emitters call
/// this from several places per element; the first call decides.
pub fn el_id(node: &mut Node, names: &mut NameRegistry) -> String {
    if let Some(Value::String(id)) = node.meta.get(ID_META_KEY) {
        return id.clone();
    }
    let id = get_id(node, names);
    node.meta
        .insert(ID_META_KEY.to_string(), Value::String(id.clone()));
    id
}

/// Drop ids memoized by a previous run so a fresh generation starts from a
/// clean registry.
pub fn clear_generated_ids(nodes: &mut [Node]) {
    walk_nodes_mut(nodes, &mut |node| {
        node.meta.shift_remove(ID_META_KEY);
    });
}
