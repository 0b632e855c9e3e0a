//! Local network identity: node id, advertised IP, and probe port.

use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use tokio::net::UdpSocket;

use coordinet_common::CoordinetError;
use coordinet_common::constants::NODE_PORT_BASE;

/// Who this node is on the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// Unique node identifier
    pub id: String,
    /// IP reported to the registry
    pub ip: IpAddr,
    /// Port the probe server listens on
    pub port: u16,
    /// `ip:port` advertised to peers
    pub address: String,
}

impl NodeIdentity {
    pub fn new(id: impl Into<String>, ip: IpAddr, port: u16) -> Self {
        Self {
            id: id.into(),
            ip,
            port,
            address: SocketAddr::new(ip, port).to_string(),
        }
    }
}

/// Port for a node id with a numeric suffix: `node3` listens on 8003.
pub fn derive_port(id: &str) -> Result<u16, CoordinetError> {
    let digits_start = id
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    let suffix = &id[digits_start..];

    if suffix.is_empty() {
        return Err(CoordinetError::Config(format!(
            "node id {id:?} has no numeric suffix; set listen_port explicitly"
        )));
    }

    suffix
        .parse::<u16>()
        .ok()
        .and_then(|n| NODE_PORT_BASE.checked_add(n))
        .ok_or_else(|| {
            CoordinetError::Config(format!("node id {id:?} maps outside the port range"))
        })
}

/// IP of the interface that routes to the outside world.
///
/// Connecting a UDP socket sends nothing; it only makes the kernel pick a
/// source address.
pub async fn detect_local_ip() -> Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .context("Failed to bind probe socket for IP detection")?;
    socket
        .connect("8.8.8.8:80")
        .await
        .context("No route to determine local IP")?;
    let local = socket
        .local_addr()
        .context("Failed to read local socket address")?;
    Ok(local.ip())
}
