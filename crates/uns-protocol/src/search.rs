//! Case-insensitive namespace search.

use crate::types::Node;

/// True when `query` occurs in the node's name, path or description,
/// ignoring case. An empty query matches everything.
pub fn matches_search(node: &Node, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    q.is_empty() || matches_lowered(node, &q)
}

/// Copy of `root` reduced to matching nodes and their ancestors.
///
/// A node is kept when it or any descendant matches. Children are filtered
/// by the same rule, so the result keeps every path from the root down to a
/// match. `None` means nothing matched.
pub fn filter_tree(root: &Node, query: &str) -> Option<Node> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Some(root.clone());
    }
    filter_lowered(root, &q)
}

fn matches_lowered(node: &Node, q: &str) -> bool {
    node.name.to_lowercase().contains(q)
        || node.path.to_lowercase().contains(q)
        || node
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(q))
}

fn filter_lowered(node: &Node, q: &str) -> Option<Node> {
    let children: Vec<Node> = node
        .children
        .iter()
        .filter_map(|c| filter_lowered(c, q))
        .collect();
    if children.is_empty() && !matches_lowered(node, q) {
        return None;
    }
    Some(Node {
        id: node.id.clone(),
        name: node.name.clone(),
        path: node.path.clone(),
        topic_type: node.topic_type,
        est_mps: node.est_mps,
        template: node.template.clone(),
        description: node.description.clone(),
        children,
    })
}
