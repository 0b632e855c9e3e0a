//! RTT probe endpoint.

use axum::extract::State;

use coordinet_common::wire;

use crate::state::NodeState;

/// Answer a probe with our current `x,y,h,error`.
///
/// The caller times the round trip. Only the engine read lock is taken.
pub async fn probe(State(state): State<NodeState>) -> String {
    let coordinates = state.coordinates().await;
    tracing::trace!(error = coordinates.error, "Probe answered");
    wire::encode_probe(&coordinates)
}
