//! Shared application state behind the HTTP API.
//!
//! The static tree is the authoritative namespace (seed or last import).
//! Applying a live snapshot keeps its nodes and serves the merged view until
//! a disconnected or empty snapshot clears it. Every change of the served
//! tree gets a fresh revision id.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use uns_protocol::seed::seed_tree;
use uns_protocol::{
    import_str, live_nodes, merge, to_compact, CompactDocument, LiveConfig, LiveSnapshot,
    MpsSummary, Node, Result, SelfTestResult, SelfTestRunner,
};
use uns_state::{AnalyticsEvent, AnalyticsStore, StatsSnapshot};

use crate::config::ConnectorConfig;

/// Outcome of a successful import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub topics: usize,
    pub revision: Uuid,
}

/// Outcome of applying a live snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSummary {
    pub connected: bool,
    pub live_topics: usize,
    pub revision: Uuid,
}

/// Self-test results with pass counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfTestReport {
    pub max_depth: usize,
    pub passed: usize,
    pub total: usize,
    pub results: Vec<SelfTestResult>,
}

pub struct AppState {
    static_tree: Node,
    live: Vec<Node>,
    merged: Option<Node>,
    revision: Uuid,
    updated_at: DateTime<Utc>,
    seed_on_start: bool,
    runner: SelfTestRunner,
    live_config: LiveConfig,
    pub analytics: AnalyticsStore,
}

impl AppState {
    pub fn new(config: &ConnectorConfig) -> Result<Self> {
        let seed_on_start = config.namespace.seed_on_start;
        Ok(Self {
            static_tree: initial_tree(seed_on_start)?,
            live: Vec::new(),
            merged: None,
            revision: Uuid::new_v4(),
            updated_at: Utc::now(),
            seed_on_start,
            runner: SelfTestRunner::new(config.namespace.max_depth),
            live_config: config.live_config(),
            analytics: AnalyticsStore::new(),
        })
    }

    /// Tree served to clients: merged when live nodes are present.
    pub fn current_tree(&self) -> &Node {
        self.merged.as_ref().unwrap_or(&self.static_tree)
    }

    pub fn static_tree(&self) -> &Node {
        &self.static_tree
    }

    pub fn is_live(&self) -> bool {
        self.merged.is_some()
    }

    pub fn revision(&self) -> Uuid {
        self.revision
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn export(&self) -> CompactDocument {
        to_compact(self.current_tree())
    }

    /// Replace the static tree with `text`. On error nothing changes.
    pub fn import(&mut self, text: &str) -> Result<ImportSummary> {
        let tree = import_str(text)?;
        let topics = uns_protocol::metrics::collect_leaves(&tree).len();
        self.static_tree = tree;
        self.refresh();
        tracing::info!(topics, revision = %self.revision, "namespace imported");
        Ok(ImportSummary {
            topics,
            revision: self.revision,
        })
    }

    pub fn apply_live(&mut self, snapshot: &LiveSnapshot) -> LiveSummary {
        self.live = live_nodes(snapshot, &self.live_config);
        self.refresh();
        tracing::debug!(
            connected = snapshot.connected,
            topics = snapshot.topics.len(),
            messages = snapshot.message_count,
            "live snapshot applied"
        );
        LiveSummary {
            connected: snapshot.connected,
            live_topics: snapshot.topics.len(),
            revision: self.revision,
        }
    }

    /// Back to the startup tree, dropping live nodes.
    pub fn reset(&mut self) -> Result<Uuid> {
        self.static_tree = initial_tree(self.seed_on_start)?;
        self.live.clear();
        self.refresh();
        tracing::info!(revision = %self.revision, "namespace reset");
        Ok(self.revision)
    }

    pub fn self_test(&self) -> SelfTestReport {
        let results = self.runner.run(self.current_tree());
        SelfTestReport {
            max_depth: self.runner.max_depth(),
            passed: results.iter().filter(|r| r.pass).count(),
            total: results.len(),
            results,
        }
    }

    pub fn totals(&self) -> MpsSummary {
        MpsSummary::from_tree(self.current_tree())
    }

    pub fn record_event(&mut self, event: &AnalyticsEvent, user_agent: &str) {
        self.analytics.record(event, user_agent, Utc::now());
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.analytics.snapshot()
    }

    fn refresh(&mut self) {
        self.merged = if self.live.is_empty() {
            None
        } else {
            Some(merge(&self.static_tree, &self.live))
        };
        self.revision = Uuid::new_v4();
        self.updated_at = Utc::now();
    }
}

fn initial_tree(seed: bool) -> Result<Node> {
    if seed {
        seed_tree()
    } else {
        Ok(Node::container(Vec::new()))
    }
}
