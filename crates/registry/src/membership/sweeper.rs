//! Liveness sweeper.
//!
//! Runs as a background task owned by the registry process. Every
//! `interval` it takes the registry lock and drops entries whose last
//! heartbeat is older than the registry TTL.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::table::Registry;

impl Registry {
    /// Run sweep passes until `shutdown` fires
    pub async fn run_sweeper(&self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?interval,
            ttl = ?self.ttl(),
            "🧹 Liveness sweeper started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    let evicted = self.evict_stale().await;
                    if !evicted.is_empty() {
                        tracing::info!(
                            count = evicted.len(),
                            nodes = ?evicted,
                            "Sweep evicted stale nodes"
                        );
                    } else {
                        tracing::trace!("Sweep pass found nothing stale");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("🧹 Liveness sweeper shutting down");
                    break;
                }
            }
        }
    }

    /// Spawn the sweeper on the current runtime
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            registry.run_sweeper(interval, shutdown).await;
        })
    }
}
