//! # Coordinet Node
//!
//! Registers with the registry, then keeps its network coordinate fresh by
//! gossiping with random peers. Serves `/ping` so peers can measure it.

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::net::SocketAddr;
use tracing::info;

use coordinet_common::telemetry::init_logging;
use node::config::{AppConfig, Args};
use node::identity::{NodeIdentity, detect_local_ip};
use node::{Agent, HttpProber, HttpRegistryClient, NodeState, routes};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("🌐 Starting Coordinet Node v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;
    info!("📋 Configuration loaded from {}", args.config);

    // Resolve identity
    let node_id = config.node_id()?.to_string();
    let port = config.listen_port()?;
    let ip = match config.advertise_ip {
        Some(ip) => ip,
        None => detect_local_ip().await.context("Error getting local IP address")?,
    };
    let identity = NodeIdentity::new(node_id, ip, port);
    info!(node = %identity.id, address = %identity.address, "🪪 Identity resolved");

    let state = NodeState::new(identity);

    // Bind before registering so peers can probe us as soon as we are listed
    let bind_addr = SocketAddr::new(config.bind_ip, state.identity.port);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;

    // Outbound clients
    let registry = HttpRegistryClient::new(&config.registry_addr, config.request_timeout())?
        .with_delay(config.simulation);
    let prober = HttpProber::new(config.request_timeout())?.with_delay(config.simulation);

    let mut agent = Agent::new(state.clone(), registry, prober, StdRng::from_os_rng());
    agent
        .register()
        .await
        .with_context(|| format!("Error registering node with {}", config.registry_addr))?;
    info!(
        "✅ Node {} registered successfully at address {}",
        state.identity.id, state.identity.address
    );

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    // Spawn control loop
    let control_loop = agent.spawn(config.gossip_interval(), shutdown_tx.subscribe());

    // Start probe server
    let app = routes::create_router(state);
    info!("🚀 Node listening on {}", bind_addr);

    // Handle graceful shutdown
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
        info!("🛑 Shutdown signal received");
        let _ = shutdown_tx.send(());
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    let _ = control_loop.await;

    info!("👋 Node shutdown complete");
    Ok(())
}
