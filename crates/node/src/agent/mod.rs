//! Node agent control loop.
//!
//! `Unregistered → Active`. Each period, run sequentially:
//! 1. heartbeat our position to the registry (re-register on 404)
//! 2. list active nodes and pick one peer at random
//! 3. probe it for RTT and its coordinate state
//! 4. feed the sample into the Vivaldi engine
//!
//! Every failure inside a round is logged and the round is dropped; only
//! the initial registration is fatal.

mod gossip;

pub use gossip::{candidates, select_peer};

use rand::rngs::StdRng;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use coordinet_common::{CoordinateState, CoordinetError, Position};

use crate::client::{Prober, RegistryApi};
use crate::state::NodeState;

/// Registration state of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    Unregistered,
    Active,
}

/// Outcome of one applied gossip round
#[derive(Debug, Clone, PartialEq)]
pub struct GossipSample {
    /// Peer that was probed
    pub peer_id: String,
    /// Measured round trip (milliseconds)
    pub rtt_ms: f64,
    /// Peer state as reported in the probe reply
    pub peer: CoordinateState,
    /// Our state after the update
    pub local: CoordinateState,
}

/// Per-node control loop
pub struct Agent<R, P> {
    state: NodeState,
    registry: R,
    prober: P,
    rng: StdRng,
    phase: AgentPhase,
}

impl<R: RegistryApi, P: Prober> Agent<R, P> {
    /// `rng` drives peer selection; seed it for reproducible runs
    pub fn new(state: NodeState, registry: R, prober: P, rng: StdRng) -> Self {
        Self {
            state,
            registry,
            prober,
            rng,
            phase: AgentPhase::Unregistered,
        }
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    async fn position(&self) -> Position {
        self.state.engine.read().await.position()
    }

    /// Announce ourselves to the registry
    pub async fn register(&mut self) -> Result<(), CoordinetError> {
        let position = self.position().await;
        self.registry.register(&self.state.identity, position).await?;
        self.phase = AgentPhase::Active;

        tracing::info!(
            node = %self.state.identity.id,
            address = %self.state.identity.address,
            "Registered with registry"
        );
        Ok(())
    }

    /// Report our position; re-register if the registry forgot us
    pub async fn heartbeat(&mut self) {
        if self.phase == AgentPhase::Unregistered {
            if let Err(e) = self.register().await {
                tracing::warn!(error = %e, "Re-registration failed");
            }
            return;
        }

        let position = self.position().await;
        match self.registry.heartbeat(&self.state.identity.id, position).await {
            Ok(()) => tracing::debug!(position = ?position, "Heartbeat sent"),
            Err(CoordinetError::NotFound(_)) => {
                tracing::warn!("Registry does not know us, re-registering");
                self.phase = AgentPhase::Unregistered;
                if let Err(e) = self.register().await {
                    tracing::warn!(error = %e, "Re-registration failed");
                }
            }
            Err(e) => tracing::warn!(
                error = %e,
                retryable = e.is_retryable(),
                "Error sending ping to registry"
            ),
        }
    }

    /// One gossip exchange. `None` if the round contributed nothing.
    pub async fn gossip_round(&mut self) -> Option<GossipSample> {
        let listed = match self.registry.list_active().await {
            Ok(peers) => peers,
            Err(e) => {
                tracing::warn!(error = %e, "Error getting node list");
                return None;
            }
        };

        let others: Vec<_> = candidates(&listed, &self.state.identity)
            .into_iter()
            .cloned()
            .collect();
        self.state.set_peers(others.clone()).await;

        let peer = match select_peer(&others, &self.state.identity, &mut self.rng) {
            Some(peer) => peer.clone(),
            None => {
                tracing::debug!("No other active nodes found to gossip with");
                return None;
            }
        };

        let sample = match self.prober.probe(&peer).await {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!(
                    peer = %peer.id,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Probe failed, skipping round"
                );
                return None;
            }
        };

        let rtt_ms = sample.rtt_ms();
        let local = {
            let mut engine = self.state.engine.write().await;
            engine.update(rtt_ms, sample.peer.position, sample.peer.error);
            engine.state()
        };

        tracing::debug!(
            peer = %peer.id,
            rtt_ms = rtt_ms,
            peer_error = sample.peer.error,
            position = ?local.position,
            error = local.error,
            "Coordinates updated"
        );

        Some(GossipSample {
            peer_id: peer.id,
            rtt_ms,
            peer: sample.peer,
            local,
        })
    }

    /// One full period: heartbeat, then gossip
    pub async fn tick(&mut self) -> Option<GossipSample> {
        self.heartbeat().await;
        if self.phase != AgentPhase::Active {
            return None;
        }
        self.gossip_round().await
    }

    /// Run periods until `shutdown` fires. Rounds never overlap.
    pub async fn run(mut self, period: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; registration just happened
        ticker.tick().await;

        tracing::info!(period = ?period, "🛰️ Gossip loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("🛰️ Gossip loop shutting down");
                    break;
                }
            }
        }
    }
}

impl<R, P> Agent<R, P>
where
    R: RegistryApi + 'static,
    P: Prober + 'static,
{
    /// Spawn the control loop on the current runtime
    pub fn spawn(self, period: Duration, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(period, shutdown))
    }
}
