//! # Play-State Handlers
//!
//! Game logic for decoded play-state packets: movement updates the sender's
//! own location, chat is relayed to every registered player (the sender
//! included), and join/leave notices are broadcast.

use crate::{Player, PlayerRegistry};
use bytes::BytesMut;
use nanogame_core::{NanoError, Result};
use nanogame_protocol::{build_join_notice, build_leave_notice, build_player_chat, InboundPacket};

/// Longest chat message accepted from a client, in bytes
pub const MAX_CHAT_LENGTH: usize = 100;

/// Limits applied to play-state input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayRules {
    pub max_chat_length: usize,
}

impl Default for PlayRules {
    fn default() -> Self {
        Self {
            max_chat_length: MAX_CHAT_LENGTH,
        }
    }
}

/// Apply one decoded packet from `player`
///
/// # Errors
/// Any error is fatal to the player's session.
pub fn handle_packet(
    player: &Player,
    registry: &PlayerRegistry,
    rules: &PlayRules,
    packet: InboundPacket,
) -> Result<()> {
    match packet {
        InboundPacket::Chat { message } => {
            handle_chat(player, registry, rules, &message)?;
        }
        InboundPacket::KeepAlive => {}
        InboundPacket::Position { x, y, z, on_ground } => {
            player.set_position(x, y, z, on_ground);
        }
        InboundPacket::Look { yaw, pitch, on_ground } => {
            player.set_look(yaw, pitch, on_ground);
        }
        InboundPacket::PositionLook { x, y, z, yaw, pitch, on_ground } => {
            player.set_position(x, y, z, on_ground);
            player.set_look(yaw, pitch, on_ground);
        }
        InboundPacket::Unknown { id } => {
            tracing::debug!("{}: ignored packet 0x{:02X}", player.name, id);
        }
    }
    Ok(())
}

/// Relay a chat message to every registered player
///
/// # Returns
/// The number of players the message reached
///
/// Invalid UTF-8 is relayed with replacement characters.
///
/// # Errors
/// `Protocol` if the raw message exceeds `rules.max_chat_length` bytes
pub fn handle_chat(
    player: &Player,
    registry: &PlayerRegistry,
    rules: &PlayRules,
    raw: &[u8],
) -> Result<usize> {
    if raw.len() > rules.max_chat_length {
        return Err(NanoError::Protocol(format!(
            "chat message too long: {} bytes",
            raw.len()
        )));
    }
    let message = String::from_utf8_lossy(raw);

    tracing::info!("<{}> {}", player.name, message);

    let mut buf = BytesMut::new();
    build_player_chat(&mut buf, player.name.get(), &message)?;
    Ok(registry.broadcast(buf.freeze()))
}

/// Tell every registered player that `name` joined
pub fn announce_join(registry: &PlayerRegistry, name: &str) -> Result<usize> {
    let mut buf = BytesMut::new();
    build_join_notice(&mut buf, name)?;
    Ok(registry.broadcast(buf.freeze()))
}

/// Tell every registered player that `name` left
pub fn announce_leave(registry: &PlayerRegistry, name: &str) -> Result<usize> {
    let mut buf = BytesMut::new();
    build_leave_notice(&mut buf, name)?;
    Ok(registry.broadcast(buf.freeze()))
}
