//! # Nanogame Protocol Library
//!
//! This library implements the binary protocol spoken by 1.8.8 game clients
//! (protocol version 47), uncompressed and unencrypted.
//!
//! ## Architecture
//!
//! ### 1. Codecs Layer ([`codecs`])
//! Primitive wire types:
//! - Big-endian fixed-width integers and floats
//! - Booleans (one byte, nonzero is true)
//! - VarInt: 7 bits per byte, low group first, at most 5 bytes
//! - String: VarInt byte length + UTF-8 bytes, at most 32767 bytes
//! - Frame: VarInt byte length + payload, 1 to 2097151 bytes
//!
//! ### 2. Framing ([`framing`])
//! [`FrameCodec`] splits a byte stream into whole frames for
//! `tokio_util::codec::FramedRead`.
//!
//! ### 3. Packet Ids ([`packets`])
//! Per-state packet identifiers and the reported version constants.
//!
//! ### 4. Packet Catalog ([`packet_builder`], [`packet_structures`], [`packet_types`])
//! Outbound frame builders, inbound parsers and the typed packet contents.
//!
//! ## Usage Example
//!
//! ```rust
//! use nanogame_protocol::{codecs::*, packet_builder::*};
//! use bytes::BytesMut;
//!
//! let mut buf = BytesMut::new();
//! build_player_chat(&mut buf, "Alice", "hi").unwrap();
//!
//! let frame = read_frame(&mut buf).unwrap();
//! assert_eq!(frame[0], 0x02);
//! ```

pub mod codecs;
pub mod framing;
pub mod packets;
pub mod packet_types;
pub mod packet_structures;
pub mod packet_builder;

// Re-export commonly used items
pub use codecs::*;
pub use framing::FrameCodec;
pub use packets::*;
pub use packet_types::*;
pub use packet_structures::*;
pub use packet_builder::*;
