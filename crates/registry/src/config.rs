//! Configuration management for the registry.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use coordinet_common::constants::{DEFAULT_REGISTRY_LISTEN_ADDR, NODE_TTL_SECS, SWEEP_INTERVAL_SECS};

/// Coordinet Registry - node membership and liveness
#[derive(Parser, Debug, Default)]
#[command(name = "registry")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/registry.toml")]
    pub config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    pub listen: Option<String>,

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
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Seconds between liveness sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Seconds without a heartbeat before a node is evicted
    #[serde(default = "default_node_ttl")]
    pub node_ttl_secs: u64,
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_REGISTRY_LISTEN_ADDR.to_string() }
fn default_sweep_interval() -> u64 { SWEEP_INTERVAL_SECS }
fn default_node_ttl() -> u64 { NODE_TTL_SECS }

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

        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.sweep_interval_secs == 0 {
            anyhow::bail!("sweep_interval_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn node_ttl(&self) -> Duration {
        Duration::from_secs(self.node_ttl_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            sweep_interval_secs: default_sweep_interval(),
            node_ttl_secs: default_node_ttl(),
        }
    }
}
