//! UNS Protocol - Namespace tree model and transformations
//!
//! Turns flat MQTT topic paths into a Unified Namespace tree, exports and
//! imports the compact leaf-only JSON document, merges a static reference
//! tree with live traffic and computes read-only metrics and self-tests.

pub mod builder;
pub mod compact;
pub mod constants;
pub mod error;
pub mod live;
pub mod merge;
pub mod metrics;
pub mod path;
pub mod search;
pub mod seed;
pub mod selftest;
pub mod types;

pub use builder::{TopicAttributes, TreeBuilder};
pub use compact::{from_compact, import_str, parse_document, to_compact};
pub use constants::*;
pub use error::*;
pub use live::{live_nodes, LiveConfig, LiveSnapshot};
pub use merge::merge;
pub use metrics::MpsSummary;
pub use search::{filter_tree, matches_search};
pub use selftest::{SelfTestResult, SelfTestRunner};
pub use types::*;
