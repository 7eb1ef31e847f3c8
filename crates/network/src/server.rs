//! # GameServer - Listener
//!
//! Accepts TCP connections and runs one [`Session`] task per connection.
//!
//! # Thread Safety
//!
//! - Player registry: shared `Arc<PlayerRegistry>`, injected at construction
//! - Connection count: `AtomicUsize`, decremented when a session task ends
//!
//! # Example
//!
//! ```rust,no_run
//! use nanogame_game::PlayerRegistry;
//! use nanogame_network::{GameServer, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(PlayerRegistry::new());
//!     let server = GameServer::new(ServerConfig::default(), registry).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use crate::{config::ServerConfig, session::Session};
use nanogame_core::{NanoError, Result};
use nanogame_game::PlayerRegistry;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Main server instance
///
/// # Shutdown
///
/// The accept loop runs until:
/// - Ctrl-C (`run`)
/// - the given future completes (`run_until`)
///
/// Sessions already running are left to finish on their own.
pub struct GameServer {
    config: Arc<ServerConfig>,
    listener: TcpListener,
    registry: Arc<PlayerRegistry>,
    active: Arc<AtomicUsize>,
}

/// Decrements the live connection count when a session task ends
struct ConnectionSlot(Arc<AtomicUsize>);

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl GameServer {
    /// Validate `config` and bind the listener
    ///
    /// # Errors
    /// Returns an error if:
    /// - Configuration is invalid
    /// - TCP listener cannot be bound to the specified address
    pub async fn new(config: ServerConfig, registry: Arc<PlayerRegistry>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| NanoError::Config(format!("Invalid configuration: {}", e)))?;

        let listener = TcpListener::bind(config.bind_address).await.map_err(|e| {
            NanoError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind to {}: {}", config.bind_address, e),
            ))
        })?;

        tracing::info!("Listening on {}", listener.local_addr()?);
        tracing::info!(
            "Configuration: max_connections={}, max_players={}, idle_timeout={:?}",
            config.max_connections,
            config.max_players,
            config.idle_timeout
        );

        Ok(Self {
            config: Arc::new(config),
            listener,
            registry,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of open connections
    pub fn connection_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Accept connections until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        self.run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Ctrl-C received, initiating shutdown"),
                Err(e) => {
                    tracing::error!("Unable to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
    }

    /// Accept connections until `shutdown` completes
    ///
    /// # Lifecycle
    ///
    /// ```text
    /// 1. Accept incoming connection
    /// 2. Check connection limit
    /// 3. Spawn session task
    /// 4. Repeat until shutdown
    /// ```
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!("Accept loop started");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((socket, addr)) => self.admit(socket, addr).await,
                        Err(e) => tracing::error!("Error accepting connection: {:?}", e),
                    }
                }

                _ = &mut shutdown => break,
            }
        }

        tracing::info!(
            "Accept loop ended, {} connections still open",
            self.connection_count()
        );
        Ok(())
    }

    async fn admit(&self, mut socket: tokio::net::TcpStream, addr: SocketAddr) {
        let open = self.active.fetch_add(1, Ordering::SeqCst);
        let slot = ConnectionSlot(self.active.clone());

        if open >= self.config.max_connections {
            tracing::warn!("Connection from {} rejected: server full ({} connections)", addr, open);
            drop(slot);
            let _ = socket.shutdown().await;
            return;
        }

        if let Err(e) = socket.set_nodelay(true) {
            tracing::debug!("Failed to set TCP_NODELAY for {}: {}", addr, e);
        }
        tracing::debug!("New connection from {}", addr);

        let session = Session::new(socket, addr, self.registry.clone(), self.config.clone());
        tokio::spawn(async move {
            let _slot = slot;
            match session.run().await {
                Ok(()) => {}
                Err(e) if e.is_transport() => {
                    tracing::debug!("Connection {} dropped: {}", addr, e);
                }
                Err(e) => {
                    tracing::warn!("Connection {} closed: {}", addr, e);
                }
            }
        });
    }
}
