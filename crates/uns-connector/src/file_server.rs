//! HTTP server for the namespace API and web UI assets.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::services::{ServeDir, ServeFile};

use uns_protocol::{filter_tree, LiveSnapshot, Node};
use uns_state::AnalyticsEvent;

use crate::state::AppState;

#[derive(Clone)]
struct WebState {
    state: Arc<RwLock<AppState>>,
}

pub struct FileServer {
    bind_addr: String,
    state: Arc<RwLock<AppState>>,
    web_root: PathBuf,
}

impl FileServer {
    pub fn new(
        bind_addr: String,
        state: Arc<RwLock<AppState>>,
        configured_root: Option<&Path>,
    ) -> Self {
        Self {
            bind_addr,
            state,
            web_root: detect_web_root(configured_root),
        }
    }

    pub fn web_root(&self) -> &Path {
        &self.web_root
    }

    pub async fn run(self) -> Result<(), anyhow::Error> {
        let app = router(self.state, &self.web_root);

        let listener = tokio::net::TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(
            addr = %self.bind_addr,
            web_root = %self.web_root.display(),
            "UNS browser listening"
        );
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// API routes with the static UI as fallback.
pub fn router(state: Arc<RwLock<AppState>>, web_root: &Path) -> Router {
    let index_file = web_root.join("index.html");
    let static_service = ServeDir::new(web_root).not_found_service(ServeFile::new(index_file));

    Router::new()
        .route("/api/health", get(api_health))
        .route("/api/namespace", get(api_namespace))
        .route("/api/namespace/export", get(api_export))
        .route("/api/namespace/import", post(api_import))
        .route("/api/namespace/selftest", get(api_selftest))
        .route("/api/namespace/totals", get(api_totals))
        .route("/api/namespace/live", post(api_live))
        .route("/api/namespace/reset", post(api_reset))
        .route("/api/stats", get(api_stats).post(api_record_stat))
        .fallback_service(static_service)
        .with_state(WebState { state })
}

/// First existing web root: configured, `UNS_WEBAPP_DIR`, then the usual
/// build output locations. Falls back to the working directory.
pub fn detect_web_root(configured: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_web_root(configured, std::env::var("UNS_WEBAPP_DIR").ok(), &cwd)
}

pub fn resolve_web_root(configured: Option<&Path>, env_dir: Option<String>, cwd: &Path) -> PathBuf {
    let mut candidates: Vec<PathBuf> = Vec::new();
    candidates.extend(configured.map(Path::to_path_buf));
    candidates.extend(env_dir.filter(|d| !d.trim().is_empty()).map(PathBuf::from));
    candidates.push(cwd.join("webapp/dist"));
    candidates.push(cwd.join("dist"));
    candidates.push(Path::new(env!("CARGO_MANIFEST_DIR")).join("../../webapp/dist"));

    candidates
        .into_iter()
        .find(|c| c.join("index.html").exists())
        .unwrap_or_else(|| cwd.to_path_buf())
}

async fn api_health() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": "uns-connector",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct NamespaceQuery {
    q: Option<String>,
}

async fn api_namespace(
    State(web): State<WebState>,
    Query(query): Query<NamespaceQuery>,
) -> Json<serde_json::Value> {
    let s = web.state.read().await;
    let tree = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => {
            let root = s.current_tree();
            let filtered = filter_tree(root, q).unwrap_or_else(|| Node {
                children: Vec::new(),
                ..root.clone()
            });
            serde_json::to_value(filtered).unwrap_or_default()
        }
        None => serde_json::to_value(s.current_tree()).unwrap_or_default(),
    };
    Json(json!({
        "revision": s.revision(),
        "updatedAt": s.updated_at(),
        "live": s.is_live(),
        "query": query.q,
        "tree": tree,
    }))
}

async fn api_export(State(web): State<WebState>) -> Response {
    let doc = web.state.read().await.export();
    (
        [(header::CONTENT_DISPOSITION, "attachment; filename=\"uns_export.json\"")],
        Json(doc),
    )
        .into_response()
}

async fn api_import(State(web): State<WebState>, body: String) -> Response {
    let mut s = web.state.write().await;
    match s.import(&body) {
        Ok(summary) => (StatusCode::OK, Json(json!({"ok": true, "import": summary}))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "rejected namespace import");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"ok": false, "error": e.to_string()})),
            )
                .into_response()
        }
    }
}

async fn api_selftest(State(web): State<WebState>) -> Response {
    Json(web.state.read().await.self_test()).into_response()
}

async fn api_totals(State(web): State<WebState>) -> Response {
    Json(web.state.read().await.totals()).into_response()
}

async fn api_live(State(web): State<WebState>, body: String) -> Response {
    let snapshot: LiveSnapshot = match serde_json::from_str(&body) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"ok": false, "error": format!("invalid live snapshot: {e}")})),
            )
                .into_response()
        }
    };
    let summary = web.state.write().await.apply_live(&snapshot);
    Json(json!({"ok": true, "live": summary})).into_response()
}

async fn api_reset(State(web): State<WebState>) -> Response {
    match web.state.write().await.reset() {
        Ok(revision) => Json(json!({"ok": true, "revision": revision})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": e.to_string()})),
        )
            .into_response(),
    }
}

async fn api_stats(State(web): State<WebState>) -> Json<serde_json::Value> {
    let s = web.state.read().await;
    Json(json!({"success": true, "data": s.stats()}))
}

async fn api_record_stat(
    State(web): State<WebState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let event = match AnalyticsEvent::from_json(body.as_bytes()) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(error = %e, "rejected analytics event");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "error": "Invalid request"})),
            )
                .into_response();
        }
    };
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let mut s = web.state.write().await;
    s.record_event(&event, user_agent);
    Json(json!({
        "success": true,
        "message": format!("Stats updated for {}", event.name()),
    }))
    .into_response()
}
