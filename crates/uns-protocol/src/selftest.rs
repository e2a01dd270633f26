//! Structural health checks over a namespace tree.
//!
//! Rules are evaluated in declaration order and independently of each other,
//! so a failing rule never hides the outcome of the next one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::compact::{from_compact, to_compact};
use crate::constants::DEFAULT_MAX_DEPTH;
use crate::metrics::{collect_leaves, flatten};
use crate::path;
use crate::types::{Node, TopicType};

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfTestResult {
    pub name: String,
    pub pass: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SelfTestResult {
    fn from_offenders(name: &str, offenders: &[String]) -> Self {
        let detail = offenders
            .first()
            .map(|first| format!("{} offending, first: {first}", offenders.len()));
        Self {
            name: name.to_string(),
            pass: offenders.is_empty(),
            detail,
        }
    }
}

pub struct SelfTestRunner {
    max_depth: usize,
}

impl SelfTestRunner {
    pub const PENULTIMATE_MATCHES_TYPE: &'static str = "Penultimate matches node.type";
    pub const PATH_DEPTH: &'static str = "Path depth within limit";
    pub const TEMPLATE_SHALLOW: &'static str = "Template shallow (no arrays)";
    pub const ROUNDTRIP_LEAF_COUNT: &'static str = "Export/Import roundtrip leaf count";
    pub const LEAF_TYPES_VALID: &'static str = "Leaf types valid";
    pub const PATHS_UNIQUE: &'static str = "Paths unique";
    pub const PATHS_EXTEND_PARENT: &'static str = "Child paths extend parent path";

    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn run(&self, root: &Node) -> Vec<SelfTestResult> {
        let results = vec![
            self.penultimate_matches_type(root),
            self.depth_within_limit(root),
            self.templates_shallow(root),
            self.roundtrip_leaf_count(root),
            self.leaf_types_valid(root),
            self.paths_unique(root),
            self.paths_extend_parent(root),
        ];
        let failed = results.iter().filter(|r| !r.pass).count();
        tracing::debug!(rules = results.len(), failed, "self-test finished");
        results
    }

    fn penultimate_matches_type(&self, root: &Node) -> SelfTestResult {
        let offenders: Vec<String> = collect_leaves(root)
            .into_iter()
            .filter(|n| path::type_hint(&n.path) != n.topic_type)
            .map(|n| n.path.clone())
            .collect();
        SelfTestResult::from_offenders(Self::PENULTIMATE_MATCHES_TYPE, &offenders)
    }

    fn depth_within_limit(&self, root: &Node) -> SelfTestResult {
        let offenders: Vec<String> = flatten(root)
            .into_iter()
            .filter(|n| path::depth(&n.path) > self.max_depth)
            .map(|n| n.path.clone())
            .collect();
        let mut result = SelfTestResult::from_offenders(Self::PATH_DEPTH, &offenders);
        result.name = format!("Path depth ≤ {}", self.max_depth);
        result
    }

    fn templates_shallow(&self, root: &Node) -> SelfTestResult {
        let offenders: Vec<String> = flatten(root)
            .into_iter()
            .filter(|n| n.is_leaf())
            .filter(|n| {
                n.template
                    .as_ref()
                    .map(|t| t.values().any(|v| v.is_array()))
                    .unwrap_or(false)
            })
            .map(|n| n.path.clone())
            .collect();
        SelfTestResult::from_offenders(Self::TEMPLATE_SHALLOW, &offenders)
    }

    fn roundtrip_leaf_count(&self, root: &Node) -> SelfTestResult {
        let before = collect_leaves(root).len();
        let (pass, detail) = match from_compact(&to_compact(root)) {
            Ok(rebuilt) => {
                let after = collect_leaves(&rebuilt).len();
                (before == after, (before != after).then(|| format!("{before} → {after}")))
            }
            Err(e) => (false, Some(e.to_string())),
        };
        SelfTestResult {
            name: Self::ROUNDTRIP_LEAF_COUNT.to_string(),
            pass,
            detail,
        }
    }

    fn leaf_types_valid(&self, root: &Node) -> SelfTestResult {
        let offenders: Vec<String> = flatten(root)
            .into_iter()
            .filter(|n| match n.topic_type {
                Some(t) => !n.is_leaf() || !TopicType::ALL.contains(&t),
                None => false,
            })
            .map(|n| n.path.clone())
            .collect();
        SelfTestResult::from_offenders(Self::LEAF_TYPES_VALID, &offenders)
    }

    fn paths_unique(&self, root: &Node) -> SelfTestResult {
        let mut seen = HashSet::new();
        let offenders: Vec<String> = flatten(root)
            .into_iter()
            .filter(|n| !seen.insert(n.path.clone()))
            .map(|n| n.path.clone())
            .collect();
        SelfTestResult::from_offenders(Self::PATHS_UNIQUE, &offenders)
    }

    fn paths_extend_parent(&self, root: &Node) -> SelfTestResult {
        let mut offenders = Vec::new();
        check_parent_chain(root, root.is_container(), &mut offenders);
        SelfTestResult::from_offenders(Self::PATHS_EXTEND_PARENT, &offenders)
    }
}

impl Default for SelfTestRunner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

fn check_parent_chain(node: &Node, is_container: bool, offenders: &mut Vec<String>) {
    for child in &node.children {
        let ok = if is_container {
            path::depth(&child.path) == 1
        } else {
            child.path == format!("{}/{}", node.path, child.name)
        };
        if !ok {
            offenders.push(child.path.clone());
        }
        check_parent_chain(child, false, offenders);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{TopicAttributes, TreeBuilder};
    use serde_json::json;

    fn results_for(root: &Node) -> Vec<SelfTestResult> {
        SelfTestRunner::default().run(root)
    }

    #[test]
    fn test_order_is_stable() {
        let root = TreeBuilder::new().build();
        let names: Vec<String> = results_for(&root).into_iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                SelfTestRunner::PENULTIMATE_MATCHES_TYPE.to_string(),
                "Path depth ≤ 7".to_string(),
                SelfTestRunner::TEMPLATE_SHALLOW.to_string(),
                SelfTestRunner::ROUNDTRIP_LEAF_COUNT.to_string(),
                SelfTestRunner::LEAF_TYPES_VALID.to_string(),
                SelfTestRunner::PATHS_UNIQUE.to_string(),
                SelfTestRunner::PATHS_EXTEND_PARENT.to_string(),
            ]
        );
    }

    #[test]
    fn test_type_at_wrong_position_fails_only_rule_one() {
        let root = TreeBuilder::from_records(vec![(
            "a/b/metrics/x",
            TopicAttributes::typed(TopicType::State),
        )])
        .unwrap();
        let results = results_for(&root);
        assert!(!results[0].pass);
        assert_eq!(results[0].detail.as_deref(), Some("1 offending, first: a/b/metrics/x"));
        assert!(results[1..].iter().all(|r| r.pass));
    }

    #[test]
    fn test_depth_limit() {
        let root = TreeBuilder::from_records(vec![(
            "1/2/3/4/5/6/state/8",
            TopicAttributes::typed(TopicType::State),
        )])
        .unwrap();
        assert!(!results_for(&root)[1].pass);
        assert!(SelfTestRunner::new(8).run(&root)[1].pass);
    }

    #[test]
    fn test_array_template_fails_shallow_rule() {
        let deep = json!({"a": 1, "b": [1, 2]}).as_object().cloned().unwrap();
        let nested = json!({"a": 1, "b": {"c": 2}}).as_object().cloned().unwrap();

        let bad = TreeBuilder::from_records(vec![(
            "a/state/x",
            TopicAttributes::typed(TopicType::State).with_template(deep),
        )])
        .unwrap();
        let good = TreeBuilder::from_records(vec![(
            "a/state/x",
            TopicAttributes::typed(TopicType::State).with_template(nested),
        )])
        .unwrap();

        assert!(!results_for(&bad)[2].pass);
        assert!(results_for(&good)[2].pass);
    }

    #[test]
    fn test_typed_folder_fails_leaf_type_rule() {
        let root = TreeBuilder::from_records(vec![
            ("a/state/x", TopicAttributes::typed(TopicType::State)),
            ("a/state/x/y", TopicAttributes::default()),
        ])
        .unwrap();
        assert!(!results_for(&root)[4].pass);
    }

    #[test]
    fn test_hand_built_duplicates_and_broken_chain() {
        let mut root = Node::folder("a");
        root.children.push(Node::folder("a/b"));
        root.children.push(Node::folder("a/b"));
        root.children.push(Node::folder("z/c"));
        let results = results_for(&root);
        assert!(!results[5].pass);
        assert!(!results[6].pass);
        assert_eq!(results[6].detail.as_deref(), Some("1 offending, first: z/c"));
    }
}
