//! Configuration management for the node agent.

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use coordinet_common::constants::{
    DEFAULT_REGISTRY_ADDR, GOSSIP_INTERVAL_SECS, REQUEST_TIMEOUT_MS,
};

use crate::identity::derive_port;
use crate::simulation::NetworkDelay;

/// Coordinet Node - Vivaldi coordinate agent
#[derive(Parser, Debug, Default)]
#[command(name = "node")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/node.toml")]
    pub config: String,

    /// Node identifier (overrides config)
    #[arg(long, env = "NODE_ID")]
    pub node_id: Option<String>,

    /// Registry address host:port (overrides config)
    #[arg(short, long, env = "REGISTRY_ADDR")]
    pub registry: Option<String>,

    /// Probe server port (overrides the port derived from the node id)
    #[arg(short, long, env = "NODE_PORT")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    pub json_logs: bool,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// This node's unique ID
    #[serde(default)]
    pub node_id: Option<String>,

    /// Registry `host:port`
    #[serde(default = "default_registry_addr")]
    pub registry_addr: String,

    /// Probe server port; derived from the node id when unset
    #[serde(default)]
    pub listen_port: Option<u16>,

    /// Interface the probe server binds to
    #[serde(default = "default_bind_ip")]
    pub bind_ip: IpAddr,

    /// IP reported to the registry; detected when unset
    #[serde(default)]
    pub advertise_ip: Option<IpAddr>,

    /// Seconds between heartbeat + gossip rounds
    #[serde(default = "default_gossip_interval")]
    pub gossip_interval_secs: u64,

    /// Timeout for registry calls and probes
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Artificial delay for single-host testbeds
    #[serde(default)]
    pub simulation: NetworkDelay,
}

// Default value functions
fn default_registry_addr() -> String { DEFAULT_REGISTRY_ADDR.to_string() }
fn default_bind_ip() -> IpAddr { IpAddr::from([0, 0, 0, 0]) }
fn default_gossip_interval() -> u64 { GOSSIP_INTERVAL_SECS }
fn default_request_timeout() -> u64 { REQUEST_TIMEOUT_MS }

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref node_id) = args.node_id {
            config.node_id = Some(node_id.clone());
        }
        if let Some(ref registry) = args.registry {
            config.registry_addr = registry.clone();
        }
        if let Some(port) = args.port {
            config.listen_port = Some(port);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.gossip_interval_secs == 0 {
            bail!("gossip_interval_secs must be greater than zero");
        }
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        self.simulation.validate()?;
        Ok(())
    }

    /// Node id; required
    pub fn node_id(&self) -> Result<&str> {
        match self.node_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(id.trim()),
            _ => bail!("NODE_ID is not set"),
        }
    }

    /// Explicit port, or the one derived from the node id
    pub fn listen_port(&self) -> Result<u16> {
        if let Some(port) = self.listen_port {
            return Ok(port);
        }
        Ok(derive_port(self.node_id()?)?)
    }

    pub fn gossip_interval(&self) -> Duration {
        Duration::from_secs(self.gossip_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: None,
            registry_addr: default_registry_addr(),
            listen_port: None,
            bind_ip: default_bind_ip(),
            advertise_ip: None,
            gossip_interval_secs: default_gossip_interval(),
            request_timeout_ms: default_request_timeout(),
            simulation: NetworkDelay::default(),
        }
    }
}
