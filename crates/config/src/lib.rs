//! Nanogame Configuration Management
//!
//! Loads server options from `serveroptions.txt`. Every option has a
//! default, so a missing file or a missing key yields a stock server.
//!
//! # Format
//!
//! ```text
//! # comment
//! serverport = 6969
//! maxplayers = 20
//! description = My server
//! ```

use nanogame_core::{NanoError, Result};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

/// File read by [`ServerConfig::load_default`], relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "serveroptions.txt";

const DEFAULT_PORT: u16 = 6969;
const DEFAULT_MAX_PLAYERS: u8 = 69;
const DEFAULT_MAX_CONNECTIONS: usize = 1000;

/// Server options from serveroptions.txt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    // Network configuration
    /// Address to listen on (from "serverip" option)
    pub server_ip: String,
    /// Port to listen on (from "serverport" option, default: 6969)
    pub server_port: u16,
    /// Open connection limit (from "maxconnections" option)
    pub max_connections: usize,
    /// Seconds without input before a player is dropped, 0 disables
    /// (from "idletimeout" option)
    pub idle_timeout_secs: u64,

    // Server listing
    /// Slots reported to clients (from "maxplayers" option)
    pub max_players: u8,
    /// Status description (from "description" option)
    pub description: String,
    /// Status description color (from "descriptioncolor" option)
    pub description_color: String,

    // World
    /// Send the demo chunk after login (from "demoworld" option)
    pub demo_world: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_ip: "0.0.0.0".into(),
            server_port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            idle_timeout_secs: 0,
            max_players: DEFAULT_MAX_PLAYERS,
            description: "A nanogame server".into(),
            description_color: "aqua".into(),
            demo_world: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a serveroptions.txt file
    ///
    /// # Errors
    /// `Config` if the file cannot be read
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            NanoError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&content))
    }

    /// Load `./serveroptions.txt`
    pub fn load_default() -> Result<Self> {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Parse serveroptions.txt content
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                config.parse_option(&key.trim().to_lowercase(), value.trim());
            }
        }

        config
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        match key {
            "serverip" => self.server_ip = value.into(),
            "serverport" => {
                self.server_port = parse_or(key, value, DEFAULT_PORT);
            }
            "maxconnections" => {
                self.max_connections = parse_or(key, value, DEFAULT_MAX_CONNECTIONS);
            }
            "idletimeout" => {
                self.idle_timeout_secs = parse_or(key, value, 0);
            }
            "maxplayers" => {
                self.max_players = parse_or(key, value, DEFAULT_MAX_PLAYERS);
            }
            "description" => self.description = value.into(),
            "descriptioncolor" => self.description_color = value.into(),
            "demoworld" => {
                self.demo_world = parse_or(key, value, true);
            }
            _ => {
                tracing::debug!("Ignoring unknown server option: {}", key);
            }
        }
    }

    /// Get the bind address for the TCP listener
    ///
    /// An unparsable `serverip` falls back to all interfaces.
    pub fn bind_address(&self) -> SocketAddr {
        let ip = self.server_ip.parse::<IpAddr>().unwrap_or_else(|_| {
            tracing::warn!("Invalid serverip {:?}, listening on all interfaces", self.server_ip);
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        });
        SocketAddr::new(ip, self.server_port)
    }

    /// Display configuration summary
    pub fn display(&self) {
        tracing::info!("Server configuration:");
        tracing::info!("  Bind: {}", self.bind_address());
        tracing::info!("  Max connections: {}", self.max_connections);
        tracing::info!("  Max players: {}", self.max_players);
        tracing::info!("  Description: {} ({})", self.description, self.description_color);
        if self.idle_timeout_secs == 0 {
            tracing::info!("  Idle timeout: off");
        } else {
            tracing::info!("  Idle timeout: {}s", self.idle_timeout_secs);
        }
        tracing::info!("  Demo world: {}", self.demo_world);
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: &str, default: T) -> T {
    value.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid value {:?} for {}, using default", value, key);
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server_port, 6969);
        assert_eq!(config.max_players, 69);
        assert_eq!(config.description_color, "aqua");
        assert_eq!(config.bind_address(), "0.0.0.0:6969".parse().unwrap());
    }

    #[test]
    fn test_parse_simple_config() {
        let config_text = r#"
# local test server
serverport = 9999
maxplayers = 50
description = Test Server
IdleTimeout = 30
demoworld = false
"#;
        let config = ServerConfig::parse(config_text);
        assert_eq!(config.server_port, 9999);
        assert_eq!(config.max_players, 50);
        assert_eq!(config.description, "Test Server");
        assert_eq!(config.idle_timeout_secs, 30);
        assert!(!config.demo_world);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = ServerConfig::parse("serverport = lots\nmaxplayers = 1000\nnosuchkey = 1");
        assert_eq!(config.server_port, 6969);
        assert_eq!(config.max_players, 69);
    }

    #[test]
    fn test_value_may_contain_equals() {
        let config = ServerConfig::parse("description = a=b");
        assert_eq!(config.description, "a=b");
    }

    #[test]
    fn test_bind_address() {
        let config = ServerConfig::parse("serverip = 127.0.0.1\nserverport = 7000");
        assert_eq!(config.bind_address(), "127.0.0.1:7000".parse().unwrap());

        let config = ServerConfig::parse("serverip = AUTO");
        assert_eq!(config.bind_address().ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "serverport = 25565").unwrap();
        writeln!(file, "descriptioncolor = gold").unwrap();

        let config = ServerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.server_port, 25565);
        assert_eq!(config.description_color, "gold");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServerConfig::load_from_file(dir.path().join("serveroptions.txt"));
        assert!(matches!(result, Err(NanoError::Config(_))));
    }
}
