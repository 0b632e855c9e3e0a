//! Health and introspection endpoints.

use axum::{Json, extract::State};
use serde::Serialize;

use coordinet_common::Position;

use crate::state::NodeState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    node_id: String,
    uptime_secs: u64,
}

/// Basic health check (is the server running?)
pub async fn health_check(State(state): State<NodeState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        node_id: state.identity.id.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
pub struct CoordinatesResponse {
    node_id: String,
    address: String,
    position: Position,
    error: f64,
}

/// Current coordinate state
pub async fn coordinates(State(state): State<NodeState>) -> Json<CoordinatesResponse> {
    let coordinates = state.coordinates().await;
    Json(CoordinatesResponse {
        node_id: state.identity.id.clone(),
        address: state.identity.address.clone(),
        position: coordinates.position,
        error: coordinates.error,
    })
}

#[derive(Serialize)]
pub struct PeerEstimate {
    id: String,
    address: String,
    position: Position,
    estimated_rtt_ms: f64,
}

#[derive(Serialize)]
pub struct PeersResponse {
    node_id: String,
    peers: Vec<PeerEstimate>,
}

/// Peers from the last gossip round, with the latency the model predicts
pub async fn peers(State(state): State<NodeState>) -> Json<PeersResponse> {
    let own = state.coordinates().await.position;
    let peers = state
        .peers
        .read()
        .await
        .iter()
        .map(|peer| PeerEstimate {
            id: peer.id.clone(),
            address: peer.address.clone(),
            position: peer.position,
            estimated_rtt_ms: own.estimated_rtt(&peer.position),
        })
        .collect();

    Json(PeersResponse {
        node_id: state.identity.id.clone(),
        peers,
    })
}
