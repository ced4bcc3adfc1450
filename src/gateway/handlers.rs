//! HTTP handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::{info, warn};

use super::state::AppState;
use super::types::{ApiResponse, HealthResponse, JettonTransferRequest};

/// Request a jetton airdrop
///
/// Replies with plain text: `ok` once the transfer is broadcast, otherwise
/// `invalid address`, `service is busy`, `not enough balance` or
/// `transfer failed`. Progress is pushed to `chatID`.
#[utoipa::path(
    post,
    path = "/jetton/transfer",
    request_body = JettonTransferRequest,
    responses(
        (status = 200, description = "Transfer outcome", body = String, content_type = "text/plain")
    ),
    tag = "Jetton"
)]
pub async fn jetton_transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JettonTransferRequest>,
) -> &'static str {
    let caller = req.caller();
    if caller.as_str().is_empty() {
        warn!("Transfer request without chatID, progress will not reach anyone");
    }
    let dest = req.dest.as_deref().unwrap_or_default();
    info!(dest, caller = %caller, "HTTP transfer request");

    state
        .kernel
        .transfer(dest, state.transfer_amount, &caller)
        .await
        .reply()
}

/// Operator page
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let path = state.public_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Operator page not found");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let kernel = &state.kernel;
    (
        StatusCode::OK,
        Json(ApiResponse::success(HealthResponse {
            timestamp_ms: now_ms,
            wallet_address: kernel.session().display_address(),
            network: kernel.network().to_string(),
            version: env!("GIT_HASH").to_string(),
        })),
    )
}
