//! HTTP Gateway
//!
//! ```text
//! GET  /                        operator page
//! POST /jetton/transfer         {dest, chatID} -> text reply
//! GET  /api/v1/health
//! GET  /api-docs/openapi.json
//! ```

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;

pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/jetton/transfer", post(handlers::jetton_transfer))
        .route("/api/v1/health", get(handlers::health_check))
        .with_state(state)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        )
}

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port in use?)", addr))?;

    info!("Gateway listening on http://{}", addr);
    info!("API Docs: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await.context("Server error")
}
