//! # Packet Identifiers
//!
//! Numeric packet ids for protocol version 47 (client release 1.8.8).
//! Ids are scoped by connection state: the same byte means different
//! packets during handshake, status, login and play.
//!
//! Only the packets this server reads or writes are listed. Any other
//! inbound play id is decoded as [`crate::InboundPacket::Unknown`] and
//! ignored.

/// Game version reported in status responses
pub const VERSION_NAME: &str = "1.8.8";

/// Protocol number reported in status responses
pub const PROTOCOL_VERSION: i32 = 47;

/// Handshake packet id (client to server, handshake state)
pub const HANDSHAKE: u8 = 0x00;

/// Status packets
pub mod status {
    /// Client request for the server list entry
    pub const REQUEST: u8 = 0x00;
    /// Client ping carrying an opaque payload
    pub const PING: u8 = 0x01;

    /// Server list entry (JSON)
    pub const RESPONSE: u8 = 0x00;
    /// Echo of the client ping
    pub const PONG: u8 = 0x01;
}

/// Login packets
pub mod login {
    /// Client announces its username
    pub const LOGIN_START: u8 = 0x00;

    /// Server accepts the login (UUID + username)
    pub const LOGIN_SUCCESS: u8 = 0x02;
}

/// Play-state packets sent by the client
///
/// # Packet Formats
/// ```text
/// KeepAlive            {0x00}{VARINT id}
/// ChatMessage          {0x01}{STRING message}
/// PlayerPosition       {0x04}{DOUBLE x}{DOUBLE y}{DOUBLE z}{BOOL on_ground}
/// PlayerLook           {0x05}{FLOAT yaw}{FLOAT pitch}{BOOL on_ground}
/// PlayerPositionAndLook{0x06}{DOUBLE x}{DOUBLE y}{DOUBLE z}{FLOAT yaw}{FLOAT pitch}{BOOL on_ground}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketTypeIn {
    KeepAlive = 0x00,
    ChatMessage = 0x01,
    PlayerPosition = 0x04,
    PlayerLook = 0x05,
    PlayerPositionAndLook = 0x06,
}

impl PacketTypeIn {
    /// Map a raw play-state id to a handled packet type
    ///
    /// # Returns
    /// - `Some(PacketTypeIn)` for ids the server handles
    /// - `None` for everything else
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::KeepAlive),
            0x01 => Some(Self::ChatMessage),
            0x04 => Some(Self::PlayerPosition),
            0x05 => Some(Self::PlayerLook),
            0x06 => Some(Self::PlayerPositionAndLook),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Exact payload length after the id byte, for fixed-shape packets
    pub fn fixed_body_len(self) -> Option<usize> {
        match self {
            Self::PlayerPosition => Some(25),
            Self::PlayerLook => Some(9),
            Self::PlayerPositionAndLook => Some(33),
            Self::KeepAlive | Self::ChatMessage => None,
        }
    }
}

/// Play-state packets sent by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketTypeOut {
    JoinGame = 0x01,
    ChatMessage = 0x02,
    PlayerPositionAndLook = 0x08,
    ChunkData = 0x21,
    MultiBlockChange = 0x22,
    BlockChange = 0x23,
}

impl PacketTypeOut {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}
