//! Core types shared across Coordinet components.

use serde::{Deserialize, Serialize};

use crate::coords::Position;

pub use crate::vivaldi::CoordinateState;

/// A registry entry as published by ListActive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerRecord {
    /// Unique node identifier
    pub id: String,

    /// Advertised `ip:port` the node serves probes on
    pub address: String,

    /// Source IP the node reported at registration
    pub ip: String,

    /// Last position the node reported
    pub position: Position,
}

impl PeerRecord {
    pub fn new(
        id: impl Into<String>,
        address: impl Into<String>,
        ip: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            ip: ip.into(),
            position,
        }
    }

    /// Probe URL for this peer
    pub fn probe_url(&self) -> String {
        let base = if self.address.starts_with("http://") || self.address.starts_with("https://") {
            self.address.clone()
        } else {
            format!("http://{}", self.address)
        };
        format!("{}{}", base, crate::constants::paths::PING)
    }
}
