//! Health check endpoint.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    nodes: usize,
    uptime_secs: u64,
}

/// Basic health check (is the server running, how many members)
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        nodes: state.registry.len().await,
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
