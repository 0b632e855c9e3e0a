//! # Coordinet Registry
//!
//! Membership service for the coordinate system. Nodes register, heartbeat
//! their latest position, and list each other for gossip.
//!
//! ## Architecture
//! ```text
//! node-1 ─┐
//! node-2 ─┼─ HTTP :2020 ─▶ Registry ◀─ sweeper (30s / TTL 60s)
//! node-n ─┘
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use coordinet_common::telemetry::init_logging;
use registry::config::{AppConfig, Args};
use registry::{AppState, Registry, routes};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!(
        "📍 Starting Coordinet Registry v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;
    info!("📋 Configuration loaded from {}", args.config);

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    let registry = Arc::new(Registry::new(config.node_ttl()));

    // Spawn liveness sweeper
    let sweeper = registry.spawn_sweeper(config.sweep_interval(), shutdown_tx.subscribe());

    // Build router
    let app = routes::create_router(AppState::new(registry));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("🚀 Registry listening on {}", config.listen_addr);

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

    let _ = sweeper.await;

    info!("👋 Registry shutdown complete");
    Ok(())
}
