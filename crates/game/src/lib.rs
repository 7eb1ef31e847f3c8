//! # Nanogame Game Logic Layer
//!
//! This crate contains the shared game state of the server.
//!
//! ## Modules
//!
//! - `player` - Player state and outbound queue
//! - `registry` - Name-keyed registry of logged-in players with broadcast
//! - `handlers` - Play-state packet handlers

pub mod player;
pub mod registry;
pub mod handlers;

// Re-export commonly used types
pub use player::{OutboundReceiver, OutboundSender, Player, SPAWN};
pub use registry::PlayerRegistry;
pub use handlers::{announce_join, announce_leave, handle_chat, handle_packet, PlayRules, MAX_CHAT_LENGTH};
