//! Component IR
//!
//! The canonical component-level representation every generator consumes:
//! a [`Component`] root holding imports, hooks, state and a tree of
//! [`Node`]s. Front-end parsers produce this shape (usually as JSON);
//! generators clone it, transform their copy and emit target source.

pub mod component;
pub mod node;
pub mod traverse;

pub use component::{Component, ImportEntry, ON_MOUNT_HOOK, ON_UNMOUNT_HOOK};
pub use node::{
    is_event_key, is_internal_key, Binding, Node, NodeKind, CSS_KEY, EACH_KEY, FOR_NAME_KEY,
    ID_META_KEY, NAME_HINT_KEY, SPREAD_KEY, TEXT_KEY, WHEN_KEY,
};
pub use traverse::{walk_nodes, walk_nodes_mut};
