//! Tree Traversal
//!
//! Pre-order (document order) walks over the node tree. The mutable walk
//! hands each node out by `&mut`, so a visitor may rewrite the node in
//! place or replace its children list; the replacement children are then
//! walked in turn. Visitors never see siblings, so sibling surgery is
//! structurally impossible here.

use super::component::Component;
use super::node::Node;

/// Visit every node under `nodes` in document order.
pub fn walk_nodes<'a>(nodes: &'a [Node], visit: &mut dyn FnMut(&'a Node)) {
    for node in nodes {
        visit(node);
        walk_nodes(&node.children, visit);
    }
}

/// Visit every node under `nodes` in document order, mutably.
pub fn walk_nodes_mut(nodes: &mut [Node], visit: &mut dyn FnMut(&mut Node)) {
    for node in nodes.iter_mut() {
        visit(node);
        walk_nodes_mut(&mut node.children, visit);
    }
}

impl Component {
    /// Visit every node of the component tree in document order.
    pub fn for_each_node<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        walk_nodes(&self.children, visit);
    }

    /// Visit every node of the component tree in document order, mutably.
    pub fn for_each_node_mut(&mut self, visit: &mut dyn FnMut(&mut Node)) {
        walk_nodes_mut(&mut self.children, visit);
    }

    /// Collect references to every node matching `predicate`, in document
    /// order.
    pub fn find_nodes(&self, predicate: impl Fn(&Node) -> bool) -> Vec<&Node> {
        let mut found = Vec::new();
        self.for_each_node(&mut |node| {
            if predicate(node) {
                found.push(node);
            }
        });
        found
    }
}
