//! UNS Connector binary
//!
//! Loads the configuration, builds the initial namespace and serves the
//! browser API and web UI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uns_connector::{AppState, ConnectorConfig, FileServer};

#[derive(Debug, Parser)]
#[command(name = "uns-connector", version, about = "Unified Namespace browser server")]
struct Cli {
    /// Config file (default: <config dir>/uns/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:3000
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory with the built web UI
    #[arg(long)]
    web_root: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Start with an empty namespace instead of the FY-Fab reference tree
    #[arg(long)]
    no_seed: bool,

    /// Classify live topics by any reserved segment
    #[arg(long)]
    legacy_type_scan: bool,
}

impl Cli {
    fn apply(&self, config: &mut ConnectorConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind_addr = bind.clone();
        }
        if let Some(root) = &self.web_root {
            config.server.web_root = Some(root.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.no_seed {
            config.namespace.seed_on_start = false;
        }
        if self.legacy_type_scan {
            config.live.legacy_type_scan = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(ConnectorConfig::default_path);
    let mut config = match &config_path {
        Some(path) => ConnectorConfig::load(path)?,
        None => ConnectorConfig::default(),
    };
    cli.apply(&mut config);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = &config_path {
        tracing::info!(path = %path.display(), "configuration loaded");
    }

    let state = AppState::new(&config).context("failed to build initial namespace")?;
    tracing::info!(
        root = %state.current_tree().path,
        revision = %state.revision(),
        max_depth = config.namespace.max_depth,
        "namespace ready"
    );

    let server = FileServer::new(
        config.server.bind_addr.clone(),
        Arc::new(RwLock::new(state)),
        config.server.web_root.as_deref(),
    );
    if !server.web_root().join("index.html").exists() {
        tracing::warn!(web_root = %server.web_root().display(), "no built web UI found, serving API only");
    }
    server.run().await
}
