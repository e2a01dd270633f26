//! Read-only aggregates over a namespace tree and usage counters.

use serde::Serialize;

use crate::types::{Node, TopicType};

/// Typed leaves of the tree, depth-first.
pub fn collect_leaves(root: &Node) -> Vec<&Node> {
    let mut out = Vec::new();
    visit(root, &mut |n| {
        if n.is_typed_leaf() {
            out.push(n);
        }
    });
    out
}

/// Every node of the tree in pre-order.
pub fn flatten(root: &Node) -> Vec<&Node> {
    let mut out = Vec::new();
    visit(root, &mut |n| out.push(n));
    out
}

fn visit<'a>(node: &'a Node, f: &mut impl FnMut(&'a Node)) {
    f(node);
    for child in &node.children {
        visit(child, f);
    }
}

/// Sum of `estMps` over `leaves` of the given type, or of all typed leaves.
/// Missing rates count as zero.
pub fn sum_by_type<'a, I>(leaves: I, topic_type: Option<TopicType>) -> f64
where
    I: IntoIterator<Item = &'a Node>,
{
    leaves
        .into_iter()
        .filter(|n| match (n.topic_type, topic_type) {
            (Some(actual), Some(wanted)) => actual == wanted,
            (Some(_), None) => true,
            (None, _) => false,
        })
        .map(|n| n.est_mps.unwrap_or(0.0))
        .sum()
}

/// Per-type topic counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopicCounts {
    pub metrics: usize,
    pub state: usize,
    pub action: usize,
    pub info: usize,
}

/// Message rate totals shown alongside the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MpsSummary {
    pub total_mps: f64,
    pub metrics_mps: f64,
    /// state + action + info
    pub other_mps: f64,
    pub topic_counts: TopicCounts,
    pub typed_leaves: usize,
    pub nodes: usize,
}

impl MpsSummary {
    pub fn from_tree(root: &Node) -> Self {
        let leaves = collect_leaves(root);
        let mut counts = TopicCounts::default();
        for leaf in &leaves {
            match leaf.topic_type {
                Some(TopicType::Metrics) => counts.metrics += 1,
                Some(TopicType::State) => counts.state += 1,
                Some(TopicType::Action) => counts.action += 1,
                Some(TopicType::Info) => counts.info += 1,
                None => {}
            }
        }

        let metrics_mps = sum_by_type(leaves.iter().copied(), Some(TopicType::Metrics));
        let other_mps: f64 = [TopicType::State, TopicType::Action, TopicType::Info]
            .into_iter()
            .map(|t| sum_by_type(leaves.iter().copied(), Some(t)))
            .sum();

        Self {
            total_mps: sum_by_type(leaves.iter().copied(), None),
            metrics_mps,
            other_mps,
            topic_counts: counts,
            typed_leaves: leaves.len(),
            nodes: flatten(root).len(),
        }
    }
}

/// The `n` largest counters, descending. Equal counts keep their input order.
pub fn top_n<K, I>(counters: I, n: usize) -> Vec<(K, u64)>
where
    I: IntoIterator<Item = (K, u64)>,
{
    let mut entries: Vec<(K, u64)> = counters.into_iter().collect();
    // sort_by is stable
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

/// Inputs of the engagement heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngagementInputs {
    pub feature_events: u64,
    pub avg_session_minutes: f64,
    pub search_count: u64,
}

/// `min(100, round(2 * features + avg_session_minutes + 5 * searches))`,
/// always within `[0, 100]`.
pub fn engagement_score(inputs: &EngagementInputs) -> u8 {
    let minutes = if inputs.avg_session_minutes.is_finite() {
        inputs.avg_session_minutes.max(0.0)
    } else {
        0.0
    };
    let raw = 2.0 * inputs.feature_events as f64 + minutes + 5.0 * inputs.search_count as f64;
    raw.round().clamp(0.0, 100.0) as u8
}

/// Messages per second over a window. A non-positive window yields 0.
pub fn real_time_rate(message_count: u64, window_ms: i64) -> f64 {
    if window_ms <= 0 {
        tracing::debug!(window_ms, "non-positive rate window, reporting 0 msg/s");
        return 0.0;
    }
    message_count as f64 * 1000.0 / window_ms as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{TopicAttributes, TreeBuilder};

    fn sample() -> Node {
        TreeBuilder::from_records(vec![
            ("a/b/state/x", TopicAttributes::typed(TopicType::State).with_est_mps(1.0)),
            ("a/b/action/y", TopicAttributes::typed(TopicType::Action).with_est_mps(0.5)),
            ("a/b/metrics/z", TopicAttributes::typed(TopicType::Metrics).with_est_mps(2.5)),
            ("a/b/info/w", TopicAttributes::typed(TopicType::Info)),
        ])
        .unwrap()
    }

    #[test]
    fn test_sum_by_type() {
        let root = sample();
        let leaves = collect_leaves(&root);
        assert_eq!(sum_by_type(leaves.iter().copied(), Some(TopicType::State)), 1.0);
        assert_eq!(sum_by_type(leaves.iter().copied(), Some(TopicType::Info)), 0.0);
        assert_eq!(sum_by_type(leaves.iter().copied(), None), 4.0);
    }

    #[test]
    fn test_summary() {
        let s = MpsSummary::from_tree(&sample());
        assert_eq!(s.total_mps, 4.0);
        assert_eq!(s.metrics_mps, 2.5);
        assert_eq!(s.other_mps, 1.5);
        assert_eq!(s.topic_counts.info, 1);
        assert_eq!(s.typed_leaves, 4);
        // a, a/b, 4 type folders, 4 leaves
        assert_eq!(s.nodes, 10);
    }

    #[test]
    fn test_top_n_is_stable() {
        let counters = vec![("a", 2), ("b", 5), ("c", 2), ("d", 1)];
        assert_eq!(top_n(counters, 3), vec![("b", 5), ("a", 2), ("c", 2)]);
        assert!(top_n(Vec::<(&str, u64)>::new(), 10).is_empty());
    }

    #[test]
    fn test_engagement_bounds() {
        assert_eq!(engagement_score(&EngagementInputs::default()), 0);
        let heavy = EngagementInputs {
            feature_events: 1_000,
            avg_session_minutes: 90.0,
            search_count: 1_000,
        };
        assert_eq!(engagement_score(&heavy), 100);
        let mid = EngagementInputs {
            feature_events: 3,
            avg_session_minutes: 2.4,
            search_count: 1,
        };
        // 6 + 2.4 + 5 = 13.4
        assert_eq!(engagement_score(&mid), 13);
        let odd = EngagementInputs {
            feature_events: 0,
            avg_session_minutes: f64::NAN,
            search_count: 0,
        };
        assert_eq!(engagement_score(&odd), 0);
    }

    #[test]
    fn test_real_time_rate() {
        assert_eq!(real_time_rate(120, 60_000), 2.0);
        assert_eq!(real_time_rate(5, 0), 0.0);
        assert_eq!(real_time_rate(5, -10), 0.0);
    }
}
