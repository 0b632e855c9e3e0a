//! Node state shared between the control loop and the HTTP handlers.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use coordinet_common::{CoordinateState, PeerRecord, VivaldiEngine};

use crate::identity::NodeIdentity;

/// Shared node state
///
/// The control loop is the only writer of the engine; probe handlers take
/// a read lock so they never observe a half-applied update.
#[derive(Clone)]
pub struct NodeState {
    /// Who we are
    pub identity: Arc<NodeIdentity>,

    /// Local coordinate engine
    pub engine: Arc<RwLock<VivaldiEngine>>,

    /// Peers seen in the last gossip round (self excluded)
    pub peers: Arc<RwLock<Vec<PeerRecord>>>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl NodeState {
    pub fn new(identity: NodeIdentity) -> Self {
        Self::with_engine(identity, VivaldiEngine::new())
    }

    pub fn with_engine(identity: NodeIdentity, engine: VivaldiEngine) -> Self {
        Self {
            identity: Arc::new(identity),
            engine: Arc::new(RwLock::new(engine)),
            peers: Arc::new(RwLock::new(Vec::new())),
            started_at: Instant::now(),
        }
    }

    /// Consistent snapshot of position and error
    pub async fn coordinates(&self) -> CoordinateState {
        self.engine.read().await.state()
    }

    pub async fn set_peers(&self, peers: Vec<PeerRecord>) {
        *self.peers.write().await = peers;
    }
}
