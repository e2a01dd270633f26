//! Incremental namespace tree construction from flat path records.
//!
//! Nodes live in an arena keyed by normalized path while records are
//! inserted, so every distinct path maps to exactly one node and each node is
//! linked to its parent once, at creation. `build()` assembles the owned
//! `Node` tree.
//!
//! Root resolution: a single top-level namespace becomes the root; zero or
//! several top-level namespaces are grouped under the synthetic `root`
//! container.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path;
use crate::types::{Node, Template, TopicType};

/// Attributes assigned to the node at a record's exact path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAttributes {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub topic_type: Option<TopicType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub est_mps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TopicAttributes {
    pub fn typed(topic_type: TopicType) -> Self {
        Self {
            topic_type: Some(topic_type),
            ..Default::default()
        }
    }

    pub fn with_est_mps(mut self, est_mps: f64) -> Self {
        self.est_mps = Some(est_mps);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }
}

struct PendingNode {
    path: String,
    attrs: TopicAttributes,
    children: Vec<usize>,
}

/// Builds a namespace tree from `(path, attributes)` records.
#[derive(Default)]
pub struct TreeBuilder {
    nodes: Vec<PendingNode>,
    /// normalized path → arena index
    index: HashMap<String, usize>,
    /// top-level nodes in first-seen order
    roots: Vec<usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree in one pass over `records`.
    ///
    /// Stops at the first record with an invalid path.
    pub fn from_records<I, P>(records: I) -> Result<Node>
    where
        I: IntoIterator<Item = (P, TopicAttributes)>,
        P: AsRef<str>,
    {
        let mut builder = Self::new();
        for (path, attrs) in records {
            builder.insert(path.as_ref(), attrs)?;
        }
        Ok(builder.build())
    }

    /// Ensure a node exists for `path` and its ancestors, then assign
    /// `attrs` to it. Re-inserting a path overwrites its attributes.
    pub fn insert(&mut self, path: &str, attrs: TopicAttributes) -> Result<()> {
        let idx = self.ensure_node(path)?;
        let node = &mut self.nodes[idx];
        if node.attrs.topic_type.is_some() && attrs != node.attrs {
            tracing::debug!(path = %node.path, "overwriting attributes of existing topic");
        }
        node.attrs = attrs;
        Ok(())
    }

    /// Folder-only insert: creates the node without touching attributes.
    pub fn ensure(&mut self, path: &str) -> Result<()> {
        self.ensure_node(path).map(|_| ())
    }

    /// Number of distinct nodes created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn ensure_node(&mut self, path: &str) -> Result<usize> {
        let segments = path::parse(path)?;
        let mut parent: Option<usize> = None;
        let mut prefix = String::with_capacity(path.len());

        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                prefix.push('/');
            }
            prefix.push_str(segment);

            let idx = match self.index.get(&prefix) {
                Some(&idx) => idx,
                None => {
                    let idx = self.nodes.len();
                    self.nodes.push(PendingNode {
                        path: prefix.clone(),
                        attrs: TopicAttributes::default(),
                        children: Vec::new(),
                    });
                    self.index.insert(prefix.clone(), idx);
                    match parent {
                        Some(p) => self.nodes[p].children.push(idx),
                        None => self.roots.push(idx),
                    }
                    idx
                }
            };
            parent = Some(idx);
        }

        // parse() guarantees at least one segment
        Ok(parent.unwrap_or_default())
    }

    /// Top-level namespaces, each with its full subtree.
    pub fn into_roots(self) -> Vec<Node> {
        self.roots.iter().map(|&idx| self.assemble(idx)).collect()
    }

    /// The tree root according to the root resolution policy.
    pub fn build(self) -> Node {
        let mut roots = self.into_roots();
        if roots.len() == 1 {
            if let Some(root) = roots.pop() {
                return root;
            }
        }
        Node::container(roots)
    }

    fn assemble(&self, idx: usize) -> Node {
        let pending = &self.nodes[idx];
        let mut node = Node::folder(&pending.path);
        node.topic_type = pending.attrs.topic_type;
        node.est_mps = pending.attrs.est_mps;
        node.template = pending.attrs.template.clone();
        node.description = pending.attrs.description.clone();
        node.children = pending.children.iter().map(|&c| self.assemble(c)).collect();
        node
    }
}
