//! Static + live namespace merge.
//!
//! The static tree is authoritative for shape. A typed live node replaces
//! type, rate, description and template at its path, and live-only
//! subtrees are grafted in. A live namespace unknown to the static tree
//! becomes a sibling under the synthetic container. The input tree is never
//! modified.

use crate::types::Node;

/// Merge `live` top-level nodes into a copy of `static_tree`.
pub fn merge(static_tree: &Node, live: &[Node]) -> Node {
    let mut merged = static_tree.clone();

    for live_root in live {
        if let Some(target) = merged.find_mut(&live_root.path) {
            merge_node(target, live_root);
            continue;
        }
        tracing::debug!(path = %live_root.path, "grafting live-only namespace");
        if !merged.is_container() {
            merged = Node::container(vec![merged]);
        }
        merged.children.push(live_root.clone());
    }

    merged
}

fn merge_node(target: &mut Node, live: &Node) {
    if live.topic_type.is_some() {
        target.topic_type = live.topic_type;
        target.est_mps = live.est_mps;
        target.description = live.description.clone();
        target.template = live.template.clone();
    }

    for live_child in &live.children {
        match target.children.iter_mut().find(|c| c.path == live_child.path) {
            Some(existing) => merge_node(existing, live_child),
            None => target.children.push(live_child.clone()),
        }
    }
}
