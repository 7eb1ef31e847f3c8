//! Nanogame - minimal game server
//!
//! Main server binary

use anyhow::Context;
use nanogame_config::{ServerConfig as GameServerConfig, DEFAULT_CONFIG_PATH};
use nanogame_game::PlayerRegistry;
use nanogame_network::{GameServer, ServerConfig as NetworkConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(
        "Nanogame starting up (protocol {} / {})",
        nanogame_protocol::PROTOCOL_VERSION,
        nanogame_protocol::VERSION_NAME
    );

    let game_config = if Path::new(DEFAULT_CONFIG_PATH).exists() {
        info!("Loading configuration from {}", DEFAULT_CONFIG_PATH);
        GameServerConfig::load_default().context("failed to load server options")?
    } else {
        warn!("{} not found, using default configuration", DEFAULT_CONFIG_PATH);
        GameServerConfig::default()
    };
    game_config.display();

    let network_config = network_config(&game_config);
    let registry = Arc::new(PlayerRegistry::new());
    let server = GameServer::new(network_config, registry)
        .await
        .context("failed to start listener")?;

    info!("Server is ready to accept connections");
    server.run().await.context("server error")?;

    info!("Server shutting down");
    Ok(())
}

/// Convert server options into the listener's runtime configuration
fn network_config(options: &GameServerConfig) -> NetworkConfig {
    NetworkConfig {
        bind_address: options.bind_address(),
        max_connections: options.max_connections,
        idle_timeout: (options.idle_timeout_secs > 0)
            .then(|| Duration::from_secs(options.idle_timeout_secs)),
        max_players: options.max_players,
        description: options.description.clone(),
        description_color: options.description_color.clone(),
        demo_world: options.demo_world,
        ..Default::default()
    }
}
