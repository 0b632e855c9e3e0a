//! Shared constants for Coordinet components.

/// Default registry listen address
pub const DEFAULT_REGISTRY_LISTEN_ADDR: &str = "0.0.0.0:2020";

/// Default registry address as seen from a node
pub const DEFAULT_REGISTRY_ADDR: &str = "registry:2020";

/// Base of the node port range; `node<n>` listens on `NODE_PORT_BASE + n`
pub const NODE_PORT_BASE: u16 = 8000;

/// Liveness sweep period (seconds)
pub const SWEEP_INTERVAL_SECS: u64 = 30;

/// Registry entry time-to-live (seconds)
pub const NODE_TTL_SECS: u64 = 60;

/// Node heartbeat + gossip period (seconds)
pub const GOSSIP_INTERVAL_SECS: u64 = 15;

/// Timeout applied to every registry call and probe (milliseconds)
pub const REQUEST_TIMEOUT_MS: u64 = 5_000;

/// HTTP paths
pub mod paths {
    /// Registry: register a node
    pub const REGISTER: &str = "/register";

    /// Registry: heartbeat. Node: RTT probe.
    pub const PING: &str = "/ping";

    /// Registry: list active nodes
    pub const NODES: &str = "/nodes";

    /// Liveness of the HTTP server itself
    pub const HEALTH: &str = "/health";

    /// Node: current coordinate context as JSON
    pub const COORDINATES: &str = "/coordinates";

    /// Node: peers from the last gossip round with estimated RTTs
    pub const PEERS: &str = "/peers";
}
