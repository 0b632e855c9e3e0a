//! HTTP route handlers for the registry.

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use coordinet_common::CoordinetError;
use coordinet_common::constants::paths;

use crate::state::AppState;

mod health;
mod membership;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route(paths::HEALTH, get(health::health_check))

        // Membership
        .route(paths::REGISTER, get(membership::register))
        .route(paths::PING, get(membership::heartbeat))
        .route(paths::NODES, get(membership::list_nodes))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Maps the common error taxonomy onto HTTP responses
pub struct ApiError(pub CoordinetError);

impl From<CoordinetError> for ApiError {
    fn from(err: CoordinetError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, format!("{}\n", self.0)).into_response()
    }
}
