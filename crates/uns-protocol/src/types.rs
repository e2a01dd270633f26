use serde::{Deserialize, Serialize};

use crate::constants::{COMPACT_SCHEMA_VERSION, CONTAINER_PATH, CONTAINER_ROOT};

/// Example payload attached to a topic. Expected to be a shallow mapping.
pub type Template = serde_json::Map<String, serde_json::Value>;

/// Kind of a publishable topic. Folder nodes carry no type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicType {
    /// Device measurements (counters, cycle times, energy).
    Metrics,
    /// Current state snapshots.
    State,
    /// Commands issued to a station or service.
    Action,
    /// Master and reference data.
    Info,
}

impl TopicType {
    pub const ALL: [TopicType; 4] = [
        TopicType::Metrics,
        TopicType::State,
        TopicType::Action,
        TopicType::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metrics => "metrics",
            Self::State => "state",
            Self::Action => "action",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for TopicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TopicType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metrics" => Ok(Self::Metrics),
            "state" => Ok(Self::State),
            "action" => Ok(Self::Action),
            "info" => Ok(Self::Info),
            other => Err(format!("unknown topic type '{other}'")),
        }
    }
}

/// A vertex of the namespace tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub topic_type: Option<TopicType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub est_mps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Folder node for an already normalized path.
    pub fn folder(path: &str) -> Self {
        Self {
            id: path.to_string(),
            name: crate::path::name(path),
            path: path.to_string(),
            topic_type: None,
            est_mps: None,
            template: None,
            description: None,
            children: Vec::new(),
        }
    }

    /// Synthetic root grouping several top-level namespaces.
    pub fn container(children: Vec<Node>) -> Self {
        Self {
            id: CONTAINER_PATH.to_string(),
            name: CONTAINER_ROOT.to_string(),
            path: CONTAINER_PATH.to_string(),
            topic_type: None,
            est_mps: None,
            template: None,
            description: None,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// A leaf carrying a topic type, i.e. something that is published.
    pub fn is_typed_leaf(&self) -> bool {
        self.is_leaf() && self.topic_type.is_some()
    }

    /// True for the synthetic container produced when a tree has no
    /// single top-level namespace.
    pub fn is_container(&self) -> bool {
        self.path == CONTAINER_PATH
            && self.topic_type.is_none()
            && self.children.iter().all(|c| crate::path::depth(&c.path) == 1)
    }

    /// Depth-first search for the node at `path`.
    pub fn find(&self, path: &str) -> Option<&Node> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path))
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut Node> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(path))
    }
}

/// Leaf record of the compact export format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactTopic {
    pub path: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub topic_type: Option<TopicType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub est_mps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Minimal leaf-only serialization of a namespace tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactDocument {
    pub version: String,
    pub topics: Vec<CompactTopic>,
}

impl CompactDocument {
    pub fn new(topics: Vec<CompactTopic>) -> Self {
        Self {
            version: COMPACT_SCHEMA_VERSION.to_string(),
            topics,
        }
    }
}

impl Default for CompactDocument {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
