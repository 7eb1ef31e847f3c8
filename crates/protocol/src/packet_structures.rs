//! # Inbound Packet Structures
//!
//! Parsers for the frames a client sends. Each parser takes a whole frame
//! payload (packet id byte first) as delivered by [`crate::FrameCodec`].
//!
//! Play-state frames decode into the closed set [`InboundPacket`]. Fixed-shape
//! packets must have exactly their declared body length; anything else is a
//! protocol violation. Ids the server does not handle decode to
//! [`InboundPacket::Unknown`].

use crate::codecs::*;
use crate::packets::PacketTypeIn;
use bytes::{Buf, Bytes};
use nanogame_core::{NanoError, ProtocolState, Result};

/// Handshake (handshake 0x00)
///
/// # Packet Format
/// ```text
/// {0x00}{VARINT protocol}{STRING address}{USHORT port}{VARINT next_state}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub protocol_version: i32,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: i32,
}

impl Handshake {
    /// Parse every handshake field
    pub fn parse(frame: &[u8]) -> Result<Self> {
        let mut buf = frame;
        read_u8(&mut buf)?;

        Ok(Self {
            protocol_version: read_varint(&mut buf)?,
            server_address: read_string(&mut buf)?,
            server_port: read_u16(&mut buf)?,
            next_state: read_varint(&mut buf)?,
        })
    }

    /// State requested by a raw handshake frame
    ///
    /// Only the final byte is inspected: `1` selects status, anything else
    /// selects login. Clients that send a malformed body still get a state.
    pub fn requested_state(frame: &[u8]) -> ProtocolState {
        match frame.last() {
            Some(1) => ProtocolState::Status,
            _ => ProtocolState::Login,
        }
    }
}

/// Login start (login 0x00)
///
/// # Packet Format
/// ```text
/// {0x00}{STRING username}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStart {
    pub username: String,
}

impl LoginStart {
    /// Skip the id byte and read the username
    ///
    /// The name is not validated here.
    pub fn parse(frame: &[u8]) -> Result<Self> {
        let mut buf = frame;
        read_u8(&mut buf)?;
        Ok(Self {
            username: read_string(&mut buf)?,
        })
    }
}

/// A decoded play-state frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPacket {
    /// Raw message bytes; not required to be UTF-8
    Chat {
        message: Bytes,
    },
    KeepAlive,
    Position {
        x: f64,
        y: f64,
        z: f64,
        on_ground: bool,
    },
    Look {
        yaw: f32,
        pitch: f32,
        on_ground: bool,
    },
    PositionLook {
        x: f64,
        y: f64,
        z: f64,
        yaw: f32,
        pitch: f32,
        on_ground: bool,
    },
    /// Accepted and discarded
    Unknown {
        id: u8,
    },
}

impl InboundPacket {
    /// Decode one play-state frame
    ///
    /// # Errors
    /// - `Protocol` if a fixed-shape packet has the wrong body length
    /// - any codec error from the fields; field errors are never masked
    pub fn decode(frame: Bytes) -> Result<Self> {
        let mut buf = frame;
        let id = read_u8(&mut buf)?;

        let Some(kind) = PacketTypeIn::from_u8(id) else {
            return Ok(Self::Unknown { id });
        };

        if let Some(expected) = kind.fixed_body_len() {
            if buf.remaining() != expected {
                return Err(NanoError::Protocol(format!(
                    "{:?} body must be {} bytes, got {}",
                    kind,
                    expected,
                    buf.remaining()
                )));
            }
        }

        let packet = match kind {
            PacketTypeIn::KeepAlive => Self::KeepAlive,
            PacketTypeIn::ChatMessage => Self::Chat {
                message: read_byte_string(&mut buf)?,
            },
            PacketTypeIn::PlayerPosition => Self::Position {
                x: read_f64(&mut buf)?,
                y: read_f64(&mut buf)?,
                z: read_f64(&mut buf)?,
                on_ground: read_bool(&mut buf)?,
            },
            PacketTypeIn::PlayerLook => Self::Look {
                yaw: read_f32(&mut buf)?,
                pitch: read_f32(&mut buf)?,
                on_ground: read_bool(&mut buf)?,
            },
            PacketTypeIn::PlayerPositionAndLook => Self::PositionLook {
                x: read_f64(&mut buf)?,
                y: read_f64(&mut buf)?,
                z: read_f64(&mut buf)?,
                yaw: read_f32(&mut buf)?,
                pitch: read_f32(&mut buf)?,
                on_ground: read_bool(&mut buf)?,
            },
        };

        Ok(packet)
    }

    /// Raw packet id this value was decoded from
    pub fn id(&self) -> u8 {
        match self {
            Self::KeepAlive => PacketTypeIn::KeepAlive.as_u8(),
            Self::Chat { .. } => PacketTypeIn::ChatMessage.as_u8(),
            Self::Position { .. } => PacketTypeIn::PlayerPosition.as_u8(),
            Self::Look { .. } => PacketTypeIn::PlayerLook.as_u8(),
            Self::PositionLook { .. } => PacketTypeIn::PlayerPositionAndLook.as_u8(),
            Self::Unknown { id } => *id,
        }
    }
}
