//! Application state and shared resources.

use std::sync::Arc;
use std::time::Instant;

use crate::membership::Registry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Membership table, one per process
    pub registry: Arc<Registry>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            started_at: Instant::now(),
        }
    }
}
