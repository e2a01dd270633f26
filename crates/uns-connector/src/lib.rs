//! UNS Connector - HTTP server for the namespace browser
//!
//! Serves the namespace tree, compact import/export, self-test results,
//! live-feed merging and usage analytics over a small JSON API, plus the
//! static web UI.

pub mod config;
pub mod file_server;
pub mod state;

pub use config::ConnectorConfig;
pub use file_server::FileServer;
pub use state::AppState;
