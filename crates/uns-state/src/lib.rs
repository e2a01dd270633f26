//! UNS State - In-memory usage analytics for the namespace browser
//!
//! Counters are owned by an explicit `AnalyticsStore` that the server
//! injects into request handlers; nothing here is process-global.

pub mod analytics;
pub mod counter;

pub use analytics::{browser_family, AnalyticsError, AnalyticsEvent, AnalyticsStore, StatsSnapshot};
pub use counter::CounterMap;
