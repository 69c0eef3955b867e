//! Service binary: loads an entity snapshot and serves the accounting
//! engine read-only over HTTP.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hourbook_core::api::{build_router, AppState};
use hourbook_core::store::{load_snapshot, EntityStore, InMemoryStore};

#[derive(Debug, Deserialize)]
struct AppConfig {
    /// Socket address the HTTP server binds to (`HOURBOOK_BIND`).
    #[serde(default = "default_bind")]
    hourbook_bind: String,
    /// Path of the JSON entity snapshot (`HOURBOOK_DATA`).
    #[serde(default = "default_data")]
    hourbook_data: PathBuf,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_data() -> PathBuf {
    PathBuf::from("fixtures/demo.json")
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- Setup ---
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config: AppConfig =
        envy::from_env().context("reading configuration from environment")?;
    info!(
        "Configuration loaded: bind={}, data={}",
        config.hourbook_bind,
        config.hourbook_data.display()
    );

    // --- Load the entity snapshot and holiday calendar ---
    let snapshot = load_snapshot(&config.hourbook_data)?;
    let (store, calendar) = InMemoryStore::from_snapshot(snapshot);
    info!(
        "Snapshot ready: {} employees, holiday years {:?}",
        store.employees().len(),
        calendar.years().collect::<Vec<_>>()
    );

    let state = AppState {
        store: Arc::new(store),
        calendar: Arc::new(calendar),
    };

    // --- Run web server ---
    let app = build_router(state).layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(&config.hourbook_bind)
        .await
        .with_context(|| format!("binding {}", config.hourbook_bind))?;
    info!("Listening on http://{}", config.hourbook_bind);
    axum::serve(listener, app).await.context("serving HTTP")?;

    Ok(())
}
