//! # Coordinet Registry
//!
//! Process-wide membership table. Nodes register once, heartbeat with
//! their latest coordinates, and list each other to pick gossip partners.
//! A background sweeper evicts nodes that stop heartbeating.
//!
//! ## Architecture
//! ```text
//! node ──register/ping/nodes──▶ routes ──▶ Registry (Mutex<BTreeMap>)
//!                                              ▲
//!                                   sweeper ───┘ (every 30s, TTL 60s)
//! ```

pub mod config;
pub mod membership;
pub mod routes;
pub mod state;

pub use membership::{NodeInfo, Registry};
pub use state::AppState;
