//! # Coordinet Node
//!
//! One participant of the coordinate system. The agent registers with the
//! registry, then every period heartbeats its position, picks a random
//! peer, measures the round trip to it, and feeds the sample into its
//! Vivaldi engine. The same process answers probes from other nodes.
//!
//! ## Architecture
//! ```text
//!            ┌──────── control loop (15s) ────────┐
//! Registry ◀─┤ heartbeat → list → pick → probe ───┼─▶ peer /ping
//!            └──────────────┬─────────────────────┘
//!                           ▼
//!              RwLock<VivaldiEngine> ◀── /ping, /coordinates, /peers
//! ```

pub mod agent;
pub mod client;
pub mod config;
pub mod identity;
pub mod routes;
pub mod simulation;
pub mod state;

pub use agent::{Agent, AgentPhase, GossipSample};
pub use client::{HttpProber, HttpRegistryClient, ProbeSample, Prober, RegistryApi};
pub use identity::NodeIdentity;
pub use state::NodeState;
