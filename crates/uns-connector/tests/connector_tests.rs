//! Connector integration tests: config loading, app state and web root
//! resolution, without opening sockets.

use std::collections::BTreeMap;

use uns_connector::config::{ConfigError, ConnectorConfig};
use uns_connector::file_server::resolve_web_root;
use uns_connector::AppState;
use uns_protocol::metrics::collect_leaves;
use uns_protocol::LiveSnapshot;
use uns_state::AnalyticsEvent;

fn snapshot(connected: bool, topics: &[(&str, u64)]) -> LiveSnapshot {
    LiveSnapshot {
        connected,
        message_count: topics.iter().map(|(_, c)| c).sum(),
        topics: topics.iter().map(|(t, c)| (t.to_string(), *c)).collect(),
        payloads: BTreeMap::new(),
    }
}

// ─── Config ─────────────────────────────────────────────────────────────────

#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConnectorConfig::load(&dir.path().join("nope.toml")).unwrap();
    assert_eq!(cfg, ConnectorConfig::default());
}

#[test]
fn test_config_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
bind_addr = "0.0.0.0:8080"

[namespace]
max_depth = 9
seed_on_start = false

[live]
window_ms = 30000
"#,
    )
    .unwrap();

    let cfg = ConnectorConfig::load(&path).unwrap();
    assert_eq!(cfg.server.bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.namespace.max_depth, 9);
    assert!(!cfg.namespace.seed_on_start);
    assert_eq!(cfg.live_config().window_ms, 30_000);
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn test_invalid_config_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server\nbind_addr = 1").unwrap();

    let err = ConnectorConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}

// ─── App state ──────────────────────────────────────────────────────────────

#[test]
fn test_live_snapshot_merges_and_clears() {
    let mut state = AppState::new(&ConnectorConfig::default()).unwrap();
    let seed_leaves = collect_leaves(state.current_tree()).len();

    let summary = state.apply_live(&snapshot(
        true,
        &[
            ("v1/FY-Fab/sm/LASER1/metrics/cycle_ms", 600),
            ("v1/FY-Fab/sm/LASER1/metrics/power_kw", 60),
        ],
    ));
    assert!(summary.connected);
    assert!(state.is_live());

    let tree = state.current_tree();
    assert_eq!(tree.find("v1/FY-Fab/sm/LASER1/metrics/cycle_ms").unwrap().est_mps, Some(10.0));
    assert!(tree.find("v1/FY-Fab/sm/LASER1/metrics/power_kw").is_some());
    assert_eq!(collect_leaves(tree).len(), seed_leaves + 1);
    // static tree untouched
    assert_eq!(
        state
            .static_tree()
            .find("v1/FY-Fab/sm/LASER1/metrics/cycle_ms")
            .unwrap()
            .est_mps,
        Some(2.5)
    );

    state.apply_live(&snapshot(false, &[("v1/FY-Fab/sm/LASER1/metrics/cycle_ms", 1)]));
    assert!(!state.is_live());
    assert_eq!(collect_leaves(state.current_tree()).len(), seed_leaves);
}

#[test]
fn test_import_keeps_live_overlay() {
    let mut state = AppState::new(&ConnectorConfig::default()).unwrap();
    state.apply_live(&snapshot(true, &[("plant/line/state/status", 60)]));
    state
        .import(r#"{"version":"v1","topics":[{"path":"plant/line/state/status","type":"state","estMps":0.1}]}"#)
        .unwrap();

    let node = state.current_tree().find("plant/line/state/status").unwrap();
    assert_eq!(node.est_mps, Some(1.0));
    assert_eq!(state.totals().total_mps, 1.0);
}

#[test]
fn test_reset_restores_seed() {
    let mut state = AppState::new(&ConnectorConfig::default()).unwrap();
    state
        .import(r#"{"version":"v1","topics":[{"path":"a/state/x","type":"state"}]}"#)
        .unwrap();
    state.apply_live(&snapshot(true, &[("a/state/y", 6)]));

    state.reset().unwrap();
    assert!(!state.is_live());
    assert_eq!(state.current_tree().path, "v1");
    assert_eq!(state.self_test().passed, state.self_test().total);
}

#[test]
fn test_export_follows_current_view() {
    let mut state = AppState::new(&ConnectorConfig::default()).unwrap();
    let before = state.export().topics.len();
    state.apply_live(&snapshot(true, &[("v1/FY-Fab/wh/site/state/new_bin", 6)]));
    assert_eq!(state.export().topics.len(), before + 1);
}

#[test]
fn test_self_test_uses_configured_depth() {
    let mut config = ConnectorConfig::default();
    config.namespace.max_depth = 5;
    let state = AppState::new(&config).unwrap();
    let report = state.self_test();
    assert_eq!(report.max_depth, 5);
    assert_eq!(report.results[1].name, "Path depth ≤ 5");
    assert!(!report.results[1].pass);
}

#[test]
fn test_analytics_recorded_through_state() {
    let mut state = AppState::new(&ConnectorConfig::default()).unwrap();
    let visit = AnalyticsEvent::from_json(br#"{"action":"visit","timezone":"UTC"}"#).unwrap();
    state.record_event(&visit, "Mozilla/5.0 Chrome/120.0");
    state.record_event(&AnalyticsEvent::Export, "");

    let stats = state.stats();
    assert_eq!(stats.stats.total_visits, 1);
    assert_eq!(stats.stats.total_exports, 1);
    assert_eq!(stats.stats.device_analytics.browsers.get("Chrome"), 1);
    assert_eq!(stats.engagement_score, 2);
}

// ─── Web root ───────────────────────────────────────────────────────────────

#[test]
fn test_web_root_resolution_order() {
    let cwd = tempfile::tempdir().unwrap();
    let configured = tempfile::tempdir().unwrap();
    let from_env = tempfile::tempdir().unwrap();

    // nothing built yet: falls back to cwd
    assert_eq!(resolve_web_root(None, None, cwd.path()), cwd.path());

    std::fs::create_dir_all(cwd.path().join("webapp/dist")).unwrap();
    std::fs::write(cwd.path().join("webapp/dist/index.html"), "<html></html>").unwrap();
    assert_eq!(
        resolve_web_root(None, None, cwd.path()),
        cwd.path().join("webapp/dist")
    );

    std::fs::write(from_env.path().join("index.html"), "<html></html>").unwrap();
    let env_value = Some(from_env.path().display().to_string());
    assert_eq!(
        resolve_web_root(None, env_value.clone(), cwd.path()),
        from_env.path()
    );

    std::fs::write(configured.path().join("index.html"), "<html></html>").unwrap();
    assert_eq!(
        resolve_web_root(Some(configured.path()), env_value, cwd.path()),
        configured.path()
    );
}
