//! Shared fixtures: an in-process fake engine and fake engine binaries.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wikilite_core::config::AppConfig;
use wikilite_core::DatabasePath;

/// Records what the client sent to the fake engine.
#[derive(Default)]
pub struct FakeEngine {
    searches: Mutex<Vec<(String, Value)>>,
    article_fetches: AtomicUsize,
}

impl FakeEngine {
    /// Search requests received, as `(mode, body)`.
    pub fn searches(&self) -> Vec<(String, Value)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn article_fetches(&self) -> usize {
        self.article_fetches.load(Ordering::SeqCst)
    }
}

fn hit(id: u64, title: &str, snippet: &str, text: &str) -> Value {
    json!({"article_id": id, "title": title, "snippet": snippet, "text": text})
}

/// Per mode:
/// - `title`: two hits for "light", one (article 42) for "one", none otherwise
/// - `lexical`: article 42 with its title highlighted, for "light"
/// - `semantic`: an error envelope
/// - `distance`: HTTP 500
async fn search(
    State(engine): State<Arc<FakeEngine>>,
    Path(mode): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    engine
        .searches
        .lock()
        .unwrap()
        .push((mode.clone(), body.clone()));
    let query = body["query"].as_str().unwrap_or_default();

    let results = match (mode.as_str(), query) {
        ("title", "light") => vec![
            hit(1, "Light", "<mark>Light</mark>", "Light is radiation."),
            hit(2, "Lightning", "<mark>Light</mark>ning", "Lightning is a discharge."),
        ],
        ("title", "one") => vec![hit(42, "Light", "<mark>Light</mark>", "Light is radiation.")],
        ("title", _) => vec![],
        ("lexical", "light") => vec![hit(
            42,
            "Light",
            "<mark>Light</mark>",
            "Light is electromagnetic radiation.",
        )],
        ("lexical", _) => vec![],
        ("semantic", _) => {
            return Json(json!({"status": "error", "message": "embeddings not loaded"}))
                .into_response()
        }
        _ => return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    };

    Json(json!({"status": "success", "results": results})).into_response()
}

async fn article(
    State(engine): State<Arc<FakeEngine>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    engine.article_fetches.fetch_add(1, Ordering::SeqCst);
    match params.get("id").map(String::as_str) {
        Some("42") => Json(json!({
            "status": "success",
            "article": {
                "id": 42,
                "title": "Light",
                "sections": [
                    {"title": "Introduction", "content": "Light is electromagnetic radiation."},
                    {"title": "Speed", "content": "About 300000 km/s."}
                ]
            }
        })),
        _ => Json(json!({"status": "error", "message": "article not found"})),
    }
}

/// Serve the fake engine on an ephemeral loopback port.
pub async fn spawn_fake_engine() -> (SocketAddr, Arc<FakeEngine>) {
    let engine = Arc::new(FakeEngine::default());
    let app = Router::new()
        .route("/", get(|| async { Html("<!doctype html><title>wikilite</title>") }))
        .route("/api/search/:mode", post(search))
        .route("/api/article", get(article))
        .with_state(Arc::clone(&engine));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, engine)
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Create an empty content database in `dir`.
pub fn create_database(dir: &std::path::Path) -> DatabasePath {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(AppConfig::DB_FILENAME);
    std::fs::write(&path, b"SQLite format 3\0").unwrap();
    DatabasePath::new(path).unwrap()
}

/// Write an executable shell script standing in for the engine binary.
#[cfg(unix)]
pub fn write_engine_script(temp_dir: &TempDir, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin_dir = temp_dir.path().join("bin");
    std::fs::create_dir_all(&bin_dir).unwrap();
    let path = bin_dir.join("wikilite");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
