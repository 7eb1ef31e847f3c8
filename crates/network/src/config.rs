//! # Server Configuration
//!
//! Runtime configuration for the Nanogame networking layer.
//!
//! # Example
//!
//! ```rust
//! use nanogame_network::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig {
//!     bind_address: "127.0.0.1:6969".parse().unwrap(),
//!     idle_timeout: Some(Duration::from_secs(30)),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use nanogame_game::{PlayRules, MAX_CHAT_LENGTH};
use nanogame_protocol::{ChatComponent, StatusResponse, MAX_STRING_LEN};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Port the server listens on unless configured otherwise
pub const DEFAULT_PORT: u16 = 6969;

/// Server configuration options
///
/// # Default Values
///
/// The defaults reproduce a stock server:
/// - Port 6969 on all interfaces
/// - 69 player slots, aqua description
/// - 1000 concurrent connections
/// - No idle timeout
/// - Demo chunk sent after login
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address and port to bind the TCP listener to
    ///
    /// # Default
    /// `0.0.0.0:6969`
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections allowed
    ///
    /// # Default
    /// 1000 connections
    ///
    /// # Notes
    /// - Counts every open socket, including ones still in handshake
    /// - Connections over the limit are closed right after accept
    pub max_connections: usize,

    /// Close a play session after this long without an inbound frame
    ///
    /// # Default
    /// `None` (sessions only end on disconnect or protocol error)
    pub idle_timeout: Option<Duration>,

    /// Time a closing session's outbound task gets to flush its queue
    ///
    /// # Default
    /// 10 seconds
    pub write_timeout: Duration,

    /// Longest accepted chat message in bytes
    ///
    /// # Default
    /// 100 bytes; longer messages end the session
    pub max_chat_length: usize,

    /// Slot count reported in status responses and join-game
    ///
    /// # Default
    /// 69
    pub max_players: u8,

    /// Status description text
    pub description: String,

    /// Status description color name
    ///
    /// # Default
    /// `"aqua"`
    pub description_color: String,

    /// Whether the demo chunk is sent after login
    ///
    /// # Default
    /// `true`
    pub demo_world: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            max_connections: 1000,
            idle_timeout: None,
            write_timeout: Duration::from_secs(10),
            max_chat_length: MAX_CHAT_LENGTH,
            max_players: 69,
            description: "A nanogame server".to_string(),
            description_color: "aqua".to_string(),
            demo_world: true,
        }
    }
}

impl ServerConfig {
    /// Validate the configuration
    ///
    /// # Returns
    /// `Ok(())` if configuration is valid, `Err(String)` otherwise
    ///
    /// # Checks
    /// - `max_connections` must be > 0
    /// - `idle_timeout`, when set, must be > 0
    /// - `write_timeout` must be > 0
    /// - `max_chat_length` must be > 0
    /// - the status JSON built from `description` must fit in one protocol
    ///   string (32767 bytes)
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("max_connections must be > 0".to_string());
        }

        if self.idle_timeout.is_some_and(|t| t.is_zero()) {
            return Err("idle_timeout must be > 0 when set".to_string());
        }

        if self.write_timeout.is_zero() {
            return Err("write_timeout must be > 0".to_string());
        }

        if self.max_chat_length == 0 {
            return Err("max_chat_length must be > 0".to_string());
        }

        let status_len = self.status_json_len()?;
        if status_len > MAX_STRING_LEN as usize {
            return Err(format!(
                "description too long: status response is {} bytes, limit is {}",
                status_len, MAX_STRING_LEN
            ));
        }

        if usize::from(self.max_players) > self.max_connections {
            tracing::warn!(
                "max_players ({}) exceeds max_connections ({})",
                self.max_players,
                self.max_connections
            );
        }

        Ok(())
    }

    /// Length of the status JSON at the widest possible online count
    fn status_json_len(&self) -> Result<usize, String> {
        let response = StatusResponse::new(
            usize::MAX,
            usize::from(self.max_players),
            ChatComponent::colored(self.description.clone(), self.description_color.clone()),
        );
        serde_json::to_string(&response)
            .map(|json| json.len())
            .map_err(|e| format!("status response not serializable: {}", e))
    }

    /// Limits applied to play-state packets
    pub fn play_rules(&self) -> PlayRules {
        PlayRules {
            max_chat_length: self.max_chat_length,
        }
    }
}
