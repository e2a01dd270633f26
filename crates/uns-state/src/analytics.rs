//! Usage analytics reported by the browser UI.
//!
//! The UI posts small `{"action": ..., ...}` events; the store folds them into
//! running totals, per-day aggregations and device breakdowns. A snapshot adds
//! the derived figures (averages, engagement score, top lists).

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uns_protocol::metrics::{engagement_score, top_n, EngagementInputs};
use uns_protocol::TOP_RANKING_SIZE;

use crate::counter::CounterMap;

/// Page load samples kept for the average.
pub const MAX_PAGE_LOAD_SAMPLES: usize = 100;

/// Most recent search queries kept for the top terms.
pub const MAX_SEARCH_QUERIES: usize = 1_000;

/// Distinct topics counted in `mostAccessedTopics`. Further topics are
/// ignored once the limit is reached; known ones keep counting.
pub const MAX_TRACKED_TOPICS: usize = 1_000;

/// Features counted in `featureUsage`. Other feature names are ignored.
pub const TRACKED_FEATURES: [&str; 10] = [
    "mqtt_connect",
    "mqtt_disconnect",
    "mqtt_error",
    "search",
    "tree_expand",
    "tree_collapse",
    "tree_select",
    "copy",
    "import",
    "export",
];

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("invalid analytics event: {0}")]
    InvalidEvent(#[from] serde_json::Error),
}

/// One event posted by the UI, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    #[serde(rename_all = "camelCase")]
    Visit {
        screen_resolution: Option<String>,
        timezone: Option<String>,
    },
    /// `duration` in milliseconds.
    SessionEnd { duration: Option<f64> },
    FeatureUsage { feature: Option<String> },
    /// `status`: connect, disconnect or error.
    MqttConnection { status: Option<String> },
    Import,
    Export,
    #[serde(rename_all = "camelCase")]
    Search {
        query: Option<String>,
        results_count: Option<u64>,
    },
    /// `interaction`: expand, collapse or select.
    #[serde(rename_all = "camelCase")]
    TreeInteraction {
        interaction: Option<String>,
        topic_path: Option<String>,
    },
    Copy,
    Error { error: Option<String> },
    Performance {
        metric: Option<String>,
        value: Option<f64>,
    },
    Engagement,
    #[serde(other)]
    Unknown,
}

impl AnalyticsEvent {
    pub fn from_json(body: &[u8]) -> Result<Self, AnalyticsError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Visit { .. } => "visit",
            Self::SessionEnd { .. } => "session_end",
            Self::FeatureUsage { .. } => "feature_usage",
            Self::MqttConnection { .. } => "mqtt_connection",
            Self::Import => "import",
            Self::Export => "export",
            Self::Search { .. } => "search",
            Self::TreeInteraction { .. } => "tree_interaction",
            Self::Copy => "copy",
            Self::Error { .. } => "error",
            Self::Performance { .. } => "performance",
            Self::Engagement => "engagement",
            Self::Unknown => "unknown",
        }
    }
}

/// Browser family from a User-Agent header, first match wins.
pub fn browser_family(user_agent: &str) -> &'static str {
    ["Chrome", "Firefox", "Safari", "Edge"]
        .into_iter()
        .find(|family| user_agent.contains(family))
        .unwrap_or("Other")
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAnalytics {
    pub screen_resolutions: CounterMap,
    pub timezones: CounterMap,
    pub browsers: CounterMap,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStats {
    pub total: u64,
    pub by_type: CounterMap,
}

/// Running analytics state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsStore {
    pub total_visits: u64,
    pub total_imports: u64,
    pub total_exports: u64,
    pub total_sessions: u64,
    /// milliseconds
    pub total_session_duration: f64,
    pub feature_usage: CounterMap,
    pub search_queries: VecDeque<String>,
    pub total_search_results: u64,
    pub most_accessed_topics: CounterMap,
    pub page_load_times: VecDeque<f64>,
    pub total_user_activity: u64,
    pub errors: ErrorStats,
    pub device_analytics: DeviceAnalytics,
    pub daily_visits: BTreeMap<String, u64>,
    pub daily_imports: BTreeMap<String, u64>,
    pub daily_exports: BTreeMap<String, u64>,
    pub daily_sessions: BTreeMap<String, u64>,
    pub daily_durations: BTreeMap<String, f64>,
    pub daily_feature_usage: BTreeMap<String, CounterMap>,
    pub last_visit: Option<DateTime<Utc>>,
    pub last_import: Option<DateTime<Utc>>,
    pub last_export: Option<DateTime<Utc>>,
}

impl Default for AnalyticsStore {
    fn default() -> Self {
        Self {
            total_visits: 0,
            total_imports: 0,
            total_exports: 0,
            total_sessions: 0,
            total_session_duration: 0.0,
            feature_usage: CounterMap::with_keys(TRACKED_FEATURES),
            search_queries: VecDeque::new(),
            total_search_results: 0,
            most_accessed_topics: CounterMap::new(),
            page_load_times: VecDeque::new(),
            total_user_activity: 0,
            errors: ErrorStats::default(),
            device_analytics: DeviceAnalytics::default(),
            daily_visits: BTreeMap::new(),
            daily_imports: BTreeMap::new(),
            daily_exports: BTreeMap::new(),
            daily_sessions: BTreeMap::new(),
            daily_durations: BTreeMap::new(),
            daily_feature_usage: BTreeMap::new(),
            last_visit: None,
            last_import: None,
            last_export: None,
        }
    }
}

/// Store contents plus derived figures, as served by `GET /api/stats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    #[serde(flatten)]
    pub stats: AnalyticsStore,
    /// milliseconds, rounded
    pub average_session_duration: u64,
    /// milliseconds, rounded
    pub average_page_load_time: u64,
    pub engagement_score: u8,
    pub top_search_terms: Vec<(String, u64)>,
    pub top_topics: Vec<(String, u64)>,
}

fn bump(map: &mut BTreeMap<String, u64>, day: &str) {
    *map.entry(day.to_string()).or_insert(0) += 1;
}

impl AnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the store. `at` decides the daily bucket.
    pub fn record(&mut self, event: &AnalyticsEvent, user_agent: &str, at: DateTime<Utc>) {
        let day = at.format("%Y-%m-%d").to_string();
        self.daily_feature_usage.entry(day.clone()).or_default();

        match event {
            AnalyticsEvent::Visit {
                screen_resolution,
                timezone,
            } => {
                self.total_visits += 1;
                self.last_visit = Some(at);
                bump(&mut self.daily_visits, &day);
                if let Some(res) = screen_resolution.as_deref().filter(|s| !s.is_empty()) {
                    self.device_analytics.screen_resolutions.increment(res);
                }
                if let Some(tz) = timezone.as_deref().filter(|s| !s.is_empty()) {
                    self.device_analytics.timezones.increment(tz);
                }
                self.device_analytics.browsers.increment(browser_family(user_agent));
            }
            AnalyticsEvent::SessionEnd { duration } => {
                if let Some(ms) = duration.filter(|d| d.is_finite() && *d > 0.0) {
                    self.total_sessions += 1;
                    self.total_session_duration += ms;
                    bump(&mut self.daily_sessions, &day);
                    *self.daily_durations.entry(day.clone()).or_insert(0.0) += ms;
                }
            }
            AnalyticsEvent::FeatureUsage { feature } => {
                if let Some(feature) = feature.as_deref().filter(|f| self.feature_usage.contains(f)) {
                    self.feature_usage.increment(feature);
                    self.daily_feature(&day, feature);
                }
            }
            AnalyticsEvent::MqttConnection { status } => {
                if let Some(status) = status.as_deref() {
                    let feature = format!("mqtt_{status}");
                    if self.feature_usage.contains(&feature) {
                        self.feature_usage.increment(feature.as_str());
                    }
                    self.daily_feature(&day, &feature);
                }
            }
            AnalyticsEvent::Import => {
                self.total_imports += 1;
                self.last_import = Some(at);
                bump(&mut self.daily_imports, &day);
                self.feature_usage.increment("import");
                self.daily_feature(&day, "import");
            }
            AnalyticsEvent::Export => {
                self.total_exports += 1;
                self.last_export = Some(at);
                bump(&mut self.daily_exports, &day);
                self.feature_usage.increment("export");
                self.daily_feature(&day, "export");
            }
            AnalyticsEvent::Search {
                query,
                results_count,
            } => {
                if let Some(query) = query.as_deref().filter(|q| !q.is_empty()) {
                    self.search_queries.push_back(query.to_string());
                    while self.search_queries.len() > MAX_SEARCH_QUERIES {
                        self.search_queries.pop_front();
                    }
                    self.feature_usage.increment("search");
                    self.total_search_results += results_count.unwrap_or(0);
                    self.daily_feature(&day, "search");
                }
            }
            AnalyticsEvent::TreeInteraction {
                interaction,
                topic_path,
            } => {
                if let Some(interaction) = interaction.as_deref() {
                    let feature = format!("tree_{interaction}");
                    if self.feature_usage.contains(&feature) {
                        self.feature_usage.increment(feature.as_str());
                    }
                    if interaction == "select" {
                        if let Some(topic) = topic_path.as_deref().filter(|p| !p.is_empty()) {
                            if self.most_accessed_topics.contains(topic)
                                || self.most_accessed_topics.len() < MAX_TRACKED_TOPICS
                            {
                                self.most_accessed_topics.increment(topic);
                            } else {
                                tracing::debug!(topic, "topic ranking full, not tracking new topic");
                            }
                        }
                    }
                    self.daily_feature(&day, &feature);
                }
            }
            AnalyticsEvent::Copy => {
                self.feature_usage.increment("copy");
                self.daily_feature(&day, "copy");
            }
            AnalyticsEvent::Error { error } => {
                self.errors.total += 1;
                if let Some(kind) = error.as_deref().filter(|e| !e.is_empty()) {
                    self.errors.by_type.increment(kind);
                }
            }
            AnalyticsEvent::Performance { metric, value } => {
                let sample = value.filter(|v| v.is_finite() && *v > 0.0);
                if let (Some("page_load"), Some(ms)) = (metric.as_deref(), sample) {
                    self.page_load_times.push_back(ms);
                    while self.page_load_times.len() > MAX_PAGE_LOAD_SAMPLES {
                        self.page_load_times.pop_front();
                    }
                }
            }
            AnalyticsEvent::Engagement => self.total_user_activity += 1,
            AnalyticsEvent::Unknown => {
                tracing::debug!("ignoring analytics event with unknown action");
            }
        }
    }

    fn daily_feature(&mut self, day: &str, feature: &str) {
        self.daily_feature_usage
            .entry(day.to_string())
            .or_default()
            .increment(feature);
    }

    /// Average session length in milliseconds, 0 without sessions.
    pub fn average_session_duration(&self) -> f64 {
        if self.total_sessions == 0 {
            return 0.0;
        }
        self.total_session_duration / self.total_sessions as f64
    }

    pub fn average_page_load_time(&self) -> f64 {
        if self.page_load_times.is_empty() {
            return 0.0;
        }
        self.page_load_times.iter().sum::<f64>() / self.page_load_times.len() as f64
    }

    pub fn engagement_score(&self) -> u8 {
        engagement_score(&EngagementInputs {
            feature_events: self.feature_usage.total(),
            avg_session_minutes: self.average_session_duration() / 1000.0 / 60.0,
            search_count: self.search_queries.len() as u64,
        })
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let mut searches = CounterMap::new();
        for query in &self.search_queries {
            searches.increment(query.as_str());
        }
        let owned = |(k, v): (&str, u64)| (k.to_string(), v);

        StatsSnapshot {
            stats: self.clone(),
            average_session_duration: self.average_session_duration().round() as u64,
            average_page_load_time: self.average_page_load_time().round() as u64,
            engagement_score: self.engagement_score(),
            top_search_terms: top_n(searches.iter().map(owned), TOP_RANKING_SIZE),
            top_topics: top_n(self.most_accessed_topics.iter().map(owned), TOP_RANKING_SIZE),
        }
    }
}
