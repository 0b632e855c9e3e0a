//! Register, heartbeat, and list endpoints.
//!
//! Parameters arrive as query strings; everything is validated before the
//! registry lock is taken.

use axum::extract::{Query, State};
use serde::Deserialize;

use coordinet_common::wire;

use super::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterQuery {
    id: Option<String>,
    address: Option<String>,
    ip: Option<String>,
    x: Option<String>,
    y: Option<String>,
    h: Option<String>,
}

/// Register (or re-register) a node
///
/// Returns:
/// - 200: Registered
/// - 400: Missing or malformed parameter
pub async fn register(
    State(state): State<AppState>,
    Query(params): Query<RegisterQuery>,
) -> Result<&'static str, ApiError> {
    let id = wire::require_field("id", params.id.as_deref())?;
    let address = wire::require_field("address", params.address.as_deref())?;
    let ip = wire::require_field("ip", params.ip.as_deref())?;
    let position = wire::require_position(
        params.x.as_deref(),
        params.y.as_deref(),
        params.h.as_deref(),
    )?;

    state.registry.register(id, address, ip, position).await;
    Ok("Node registered\n")
}

#[derive(Deserialize)]
pub struct PingQuery {
    id: Option<String>,
    x: Option<String>,
    y: Option<String>,
    h: Option<String>,
}

/// Heartbeat from a registered node
///
/// Returns:
/// - 200: Refreshed
/// - 400: Missing or malformed parameter
/// - 404: Unknown node, must register first
pub async fn heartbeat(
    State(state): State<AppState>,
    Query(params): Query<PingQuery>,
) -> Result<&'static str, ApiError> {
    let id = wire::require_field("id", params.id.as_deref())?;
    let position = wire::require_position(
        params.x.as_deref(),
        params.y.as_deref(),
        params.h.as_deref(),
    )?;

    if let Err(e) = state.registry.heartbeat(id, position).await {
        tracing::warn!(node = %id, error = %e, "Heartbeat rejected");
        return Err(e.into());
    }
    Ok("Ping received\n")
}

/// One `id,address,ip,x,y,h` line per active node
pub async fn list_nodes(State(state): State<AppState>) -> String {
    let nodes = state.registry.list_active().await;
    wire::encode_node_list(&nodes)
}
