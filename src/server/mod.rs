//! HTTP service for the expense tracker
//!
//! Serves the daily expense page, the SMS ingest endpoints, and the static
//! assets the cache gate preloads.

pub mod routes;
pub mod state;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::persistence::TransactionStore;
use state::AppState;

/// Build the application router over shared state
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        .route("/", get(routes::pages::home))
        .route("/ingest", post(routes::transactions::ingest))
        .route("/ingest-json", post(routes::transactions::ingest_json))
        .route("/seed", get(routes::transactions::seed))
        .route("/api/health", get(routes::health::health_check))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP service
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let store = match &config.database.path {
        Some(path) => TransactionStore::open(path).await?,
        None => TransactionStore::new().await?,
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let state = Arc::new(AppState::new(config, store));
    let app = build_router(state);

    tracing::info!(%addr, "expense tracker listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
