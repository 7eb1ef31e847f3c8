//! # Packet Data Structures
//!
//! Typed contents of the outbound packets: the JSON documents carried by
//! status and chat packets, and the fixed fields of join-game and
//! position-and-look.

use serde::Serialize;

/// Status response document
///
/// # JSON
/// ```text
/// {"version":{"name":"1.8.8","protocol":47},
///  "players":{"online":1,"max":69},
///  "description":{"text":"...","color":"aqua"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusResponse {
    pub version: StatusVersion,
    pub players: StatusPlayers,
    pub description: ChatComponent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusVersion {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPlayers {
    pub online: usize,
    pub max: usize,
}

impl StatusResponse {
    /// Status for this protocol version with the given counts and MOTD
    pub fn new(online: usize, max: usize, description: ChatComponent) -> Self {
        Self {
            version: StatusVersion {
                name: crate::VERSION_NAME.to_string(),
                protocol: crate::PROTOCOL_VERSION,
            },
            players: StatusPlayers { online, max },
            description,
        }
    }
}

/// One styled segment of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatComponent {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ChatComponent {
    /// Plain segment; legacy `§` formatting codes inside `text` still apply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    pub fn colored(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Some(color.into()),
        }
    }
}

/// Join-game fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinGame {
    pub entity_id: i32,
    pub game_mode: u8,
    pub dimension: i8,
    pub difficulty: u8,
    pub max_players: u8,
    pub level_type: String,
    pub reduced_debug_info: bool,
}

impl JoinGame {
    /// Creative mode in a flat overworld, peaceful
    pub fn flat_world(max_players: u8) -> Self {
        Self {
            entity_id: 123,
            game_mode: 1,
            dimension: 0,
            difficulty: 0,
            max_players,
            level_type: "flat".to_string(),
            reduced_debug_info: false,
        }
    }
}

/// Position-and-look fields
///
/// Bits set in `flags` make the matching field relative to the client's
/// current value (0x01 x, 0x02 y, 0x04 z, 0x08 pitch, 0x10 yaw).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionLook {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub flags: u8,
}

impl PositionLook {
    pub const fn absolute(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
            flags: 0,
        }
    }
}
