//! HTTP route handlers for the node.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use coordinet_common::constants::paths;

use crate::state::NodeState;

mod health;
mod probe;

/// Create the probe server router
pub fn create_router(state: NodeState) -> Router {
    Router::new()
        // Health & Status
        .route(paths::HEALTH, get(health::health_check))
        .route(paths::COORDINATES, get(health::coordinates))
        .route(paths::PEERS, get(health::peers))

        // RTT probe
        .route(paths::PING, get(probe::probe))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use coordinet_common::{CoordinateState, PeerRecord, Position, VivaldiEngine, wire};
    use tower::ServiceExt;

    use crate::identity::NodeIdentity;

    fn state() -> NodeState {
        NodeState::with_engine(
            NodeIdentity::new("node1", "10.0.0.1".parse().unwrap(), 8001),
            VivaldiEngine::from_state(CoordinateState::new(Position::new(3.0, 4.0, 0.0), 2.5)),
        )
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_probe_reports_state() {
        let (status, body) = get(create_router(state()), "/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "3,4,0,2.5");

        let parsed = wire::parse_probe(&body).unwrap();
        assert_eq!(parsed, CoordinateState::new(Position::new(3.0, 4.0, 0.0), 2.5));
    }

    #[tokio::test]
    async fn test_coordinates_json() {
        let (status, body) = get(create_router(state()), "/coordinates").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["node_id"], "node1");
        assert_eq!(json["position"]["x"], 3.0);
        assert_eq!(json["error"], 2.5);
    }

    #[tokio::test]
    async fn test_peers_with_estimates() {
        let state = state();
        state
            .set_peers(vec![
                PeerRecord::new("node2", "10.0.0.2:8002", "10.0.0.2", Position::ORIGIN),
                PeerRecord::new(
                    "node3",
                    "10.0.0.3:8003",
                    "10.0.0.3",
                    Position::new(3.0, 4.0, 12.0),
                ),
            ])
            .await;

        let (status, body) = get(create_router(state), "/peers").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let peers = json["peers"].as_array().unwrap();
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[0]["id"], "node2");
        assert_eq!(peers[0]["estimated_rtt_ms"], 5.0);
        assert_eq!(peers[1]["estimated_rtt_ms"], 12.0);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(create_router(state()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["node_id"], "node1");
    }
}
