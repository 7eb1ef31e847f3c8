//! # Nanogame Networking Layer
//!
//! This crate provides Tokio-based async networking for the Nanogame server.
//!
//! ## Modules
//!
//! - [`config`] - Server configuration options
//! - [`session`] - Per-connection protocol state machine
//! - [`server`] - TCP listener

pub mod config;
pub mod session;
pub mod server;

// Re-export commonly used items
pub use config::{ServerConfig, DEFAULT_PORT};
pub use session::Session;
pub use server::GameServer;
