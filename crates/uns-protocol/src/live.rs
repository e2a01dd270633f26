//! Conversion of a live MQTT feed snapshot into namespace nodes.
//!
//! The snapshot is collected elsewhere (broker client, browser); this module
//! only turns per-topic counters and latest payloads into typed leaves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::{TopicAttributes, TreeBuilder};
use crate::constants::{LIVE_RATE_WINDOW_MS, MAX_INPUT_SEGMENTS};
use crate::metrics::real_time_rate;
use crate::path;
use crate::types::{Node, Template};

/// Point-in-time view of live traffic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSnapshot {
    pub connected: bool,
    #[serde(default)]
    pub message_count: u64,
    /// topic path → messages seen
    #[serde(default)]
    pub topics: BTreeMap<String, u64>,
    /// topic path → latest raw payload
    #[serde(default)]
    pub payloads: BTreeMap<String, String>,
}

/// How live counters are interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Window the message counts were collected over.
    pub window_ms: i64,
    /// Classify topics by any reserved segment instead of the type position.
    pub legacy_type_scan: bool,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            window_ms: LIVE_RATE_WINDOW_MS,
            legacy_type_scan: false,
        }
    }
}

/// Top-level nodes describing the live feed. Empty when disconnected.
pub fn live_nodes(snapshot: &LiveSnapshot, config: &LiveConfig) -> Vec<Node> {
    if !snapshot.connected || snapshot.topics.is_empty() {
        return Vec::new();
    }

    let mut builder = TreeBuilder::new();
    for (topic, &count) in &snapshot.topics {
        if path::depth(topic) > MAX_INPUT_SEGMENTS {
            tracing::warn!(topic = %topic, max = MAX_INPUT_SEGMENTS, "skipping live topic, too many segments");
            continue;
        }

        let topic_type = if config.legacy_type_scan {
            path::type_hint_any_segment(topic)
        } else {
            path::type_hint(topic)
        };

        let attrs = match topic_type {
            Some(t) => {
                let mut attrs = TopicAttributes::typed(t)
                    .with_est_mps(real_time_rate(count, config.window_ms))
                    .with_description(format!("Real-time topic with {count} messages"));
                attrs.template = snapshot.payloads.get(topic).map(|p| payload_template(p));
                attrs
            }
            None => TopicAttributes::default(),
        };

        if let Err(e) = builder.insert(topic, attrs) {
            tracing::warn!(topic = %topic, error = %e, "skipping live topic");
        }
    }

    builder.into_roots()
}

/// Template for a raw payload: JSON objects are used as-is, anything else is
/// wrapped under `value`.
pub fn payload_template(payload: &str) -> Template {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(map)) => map,
        Ok(other) => wrap(other),
        Err(_) => wrap(Value::String(payload.to_string())),
    }
}

fn wrap(value: Value) -> Template {
    let mut map = Template::new();
    map.insert("value".to_string(), value);
    map
}
