//! # Packet Builder
//!
//! Builder functions for server-to-client packets.
//!
//! Every builder appends one complete frame (VarInt length, packet id,
//! fields) to `buf`, so several builders can fill one buffer that is then
//! written to the socket in a single call.
//!
//! ## Usage
//!
//! ```rust
//! use nanogame_protocol::packet_builder::*;
//! use bytes::BytesMut;
//!
//! let mut buf = BytesMut::new();
//! build_login_success(&mut buf, OFFLINE_UUID, "Steve");
//! ```

use crate::codecs::*;
use crate::packet_types::*;
use crate::packets::{login, status, PacketTypeOut};
use bytes::{BufMut, BytesMut};
use nanogame_core::{BlockPosition, NanoError, Result};

/// UUID sent in every login success; logins are unauthenticated
pub const OFFLINE_UUID: &str = "d7bb14b6-bfe9-462f-bb00-85b91826381a";

/// Sections in a full chunk column
pub const CHUNK_SECTIONS: usize = 16;

/// Layer the demo world is built on
pub const DEMO_FLOOR_Y: usize = 63;

/// Block id of the demo floor (wool, colored by metadata)
pub const DEMO_FLOOR_BLOCK: u16 = 35;

const CHAT_BOX: u8 = 0;

const BLOCK_BYTES_PER_SECTION: usize = 16 * 16 * 16 * 2;
const LIGHT_BYTES_PER_SECTION: usize = 16 * 16 * 16 / 2;
const BIOME_BYTES: usize = 16 * 16;

/// Frame a payload that starts with `id`
fn write_packet(buf: &mut BytesMut, id: u8, body: impl FnOnce(&mut BytesMut)) {
    let mut payload = BytesMut::new();
    payload.put_u8(id);
    body(&mut payload);
    write_frame(buf, &payload);
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| NanoError::InvalidData(format!("JSON encoding failed: {}", e)))
}

/// Combine a block id and metadata into a block state
#[inline]
pub fn block_state(id: u16, meta: u8) -> i32 {
    (i32::from(id) << 4) | i32::from(meta & 0x0F)
}

//=== Status ===//

/// Build a status response (status 0x00)
///
/// # Packet Format
/// ```text
/// {0x00}{STRING json}
/// ```
pub fn build_status_response(buf: &mut BytesMut, response: &StatusResponse) -> Result<()> {
    let json = to_json(response)?;
    write_packet(buf, status::RESPONSE, |p| write_string(p, &json));
    Ok(())
}

/// Build a pong by echoing the ping frame's payload verbatim
pub fn build_pong(buf: &mut BytesMut, ping: &[u8]) {
    write_frame(buf, ping);
}

//=== Login ===//

/// Build a login success (login 0x02)
///
/// # Packet Format
/// ```text
/// {0x02}{STRING uuid}{STRING username}
/// ```
pub fn build_login_success(buf: &mut BytesMut, uuid: &str, username: &str) {
    write_packet(buf, login::LOGIN_SUCCESS, |p| {
        write_string(p, uuid);
        write_string(p, username);
    });
}

//=== Play ===//

/// Build a join game (play 0x01)
///
/// # Packet Format
/// ```text
/// {0x01}{INT eid}{BYTE gamemode}{BYTE dimension}{BYTE difficulty}
///       {BYTE max_players}{STRING level_type}{BOOL reduced_debug_info}
/// ```
pub fn build_join_game(buf: &mut BytesMut, join: &JoinGame) {
    write_packet(buf, PacketTypeOut::JoinGame.as_u8(), |p| {
        p.put_i32(join.entity_id);
        p.put_u8(join.game_mode);
        p.put_i8(join.dimension);
        p.put_u8(join.difficulty);
        p.put_u8(join.max_players);
        write_string(p, &join.level_type);
        write_bool(p, join.reduced_debug_info);
    });
}

/// Build a player position and look (play 0x08)
///
/// # Packet Format
/// ```text
/// {0x08}{DOUBLE x}{DOUBLE y}{DOUBLE z}{FLOAT yaw}{FLOAT pitch}{BYTE flags}
/// ```
pub fn build_position_look(buf: &mut BytesMut, pos: &PositionLook) {
    write_packet(buf, PacketTypeOut::PlayerPositionAndLook.as_u8(), |p| {
        p.put_f64(pos.x);
        p.put_f64(pos.y);
        p.put_f64(pos.z);
        p.put_f32(pos.yaw);
        p.put_f32(pos.pitch);
        p.put_u8(pos.flags);
    });
}

/// Build a chat message (play 0x02)
///
/// # Packet Format
/// ```text
/// {0x02}{STRING json_array}{BYTE position=0}
/// ```
///
/// Always shown in the chat box.
pub fn build_chat_message(buf: &mut BytesMut, components: &[ChatComponent]) -> Result<()> {
    let json = to_json(&components)?;
    write_packet(buf, PacketTypeOut::ChatMessage.as_u8(), |p| {
        write_string(p, &json);
        p.put_u8(CHAT_BOX);
    });
    Ok(())
}

/// Build a relayed player chat line: `name » message`
pub fn build_player_chat(buf: &mut BytesMut, name: &str, message: &str) -> Result<()> {
    let components = [
        ChatComponent::colored(name, "gray"),
        ChatComponent::colored(" \u{00bb} ", "dark_gray"),
        ChatComponent::colored(message, "white"),
    ];
    build_chat_message(buf, &components)
}

/// Build a single-segment server message
pub fn build_system_message(buf: &mut BytesMut, text: &str) -> Result<()> {
    build_chat_message(buf, &[ChatComponent::text(text)])
}

/// Build the join notice broadcast when a player logs in
pub fn build_join_notice(buf: &mut BytesMut, name: &str) -> Result<()> {
    build_system_message(buf, &format!("\u{00a7}8[\u{00a7}b+\u{00a7}8] \u{00a7}7{}", name))
}

/// Build the leave notice broadcast when a player disconnects
pub fn build_leave_notice(buf: &mut BytesMut, name: &str) -> Result<()> {
    build_system_message(buf, &format!("\u{00a7}8[\u{00a7}b-\u{00a7}8] \u{00a7}7{}", name))
}

//=== World ===//

/// Build an empty chunk column (play 0x21)
///
/// # Packet Format
/// ```text
/// {0x21}{INT x}{INT z}{BOOL ground_up=1}{USHORT mask=0xFFFF}{VARINT size=0}
/// ```
pub fn build_empty_chunk(buf: &mut BytesMut, chunk_x: i32, chunk_z: i32) {
    write_packet(buf, PacketTypeOut::ChunkData.as_u8(), |p| {
        p.put_i32(chunk_x);
        p.put_i32(chunk_z);
        write_bool(p, true);
        p.put_u16(0xFFFF);
        write_varint(p, 0);
    });
}

/// Build the demo chunk column (play 0x21)
///
/// # Packet Format
/// ```text
/// {0x21}{INT x}{INT z}{BOOL ground_up=1}{USHORT mask=0xFFFF}{VARINT size}
///       {blocks: 16 * 8192}{block light: 16 * 2048}{sky light: 16 * 2048}{biomes: 256}
/// ```
///
/// # Notes
/// - One layer at y = 63 of wool, metadata `x + z`
/// - Block entries are two bytes, low byte first
/// - Fully lit, all biomes 0
pub fn build_demo_chunk(buf: &mut BytesMut, chunk_x: i32, chunk_z: i32) {
    let blocks = CHUNK_SECTIONS * BLOCK_BYTES_PER_SECTION;
    let light = CHUNK_SECTIONS * LIGHT_BYTES_PER_SECTION;
    let total = blocks + 2 * light + BIOME_BYTES;

    let mut data = vec![0u8; total];

    for x in 0..16usize {
        for z in 0..16usize {
            let index = (DEMO_FLOOR_Y << 8) | (z << 4) | x;
            let state = (usize::from(DEMO_FLOOR_BLOCK) << 4) | (x + z);
            data[2 * index] = state as u8;
            data[2 * index + 1] = (DEMO_FLOOR_BLOCK >> 4) as u8;
        }
    }

    data[blocks..blocks + 2 * light].fill(0xFF);

    write_packet(buf, PacketTypeOut::ChunkData.as_u8(), |p| {
        p.put_i32(chunk_x);
        p.put_i32(chunk_z);
        write_bool(p, true);
        p.put_u16(0xFFFF);
        write_varint(p, total as i32);
        p.put_slice(&data);
    });
}

/// Build a block change (play 0x23)
///
/// # Packet Format
/// ```text
/// {0x23}{LONG packed_position}{VARINT block_state}
/// ```
pub fn build_block_change(buf: &mut BytesMut, pos: BlockPosition, state: i32) {
    write_packet(buf, PacketTypeOut::BlockChange.as_u8(), |p| {
        p.put_u64(pos.pack());
        write_varint(p, state);
    });
}

/// Build a multi block change (play 0x22)
///
/// # Packet Format
/// ```text
/// {0x22}{INT chunk_x}{INT chunk_z}{VARINT count}
///       count * {BYTE (x&15)<<4 | z&15}{BYTE y}{VARINT block_state}
/// ```
///
/// # Notes
/// Records are placed relative to the given chunk; their coordinates are
/// masked to the chunk.
pub fn build_multi_block_change(
    buf: &mut BytesMut,
    chunk_x: i32,
    chunk_z: i32,
    records: &[(BlockPosition, i32)],
) {
    write_packet(buf, PacketTypeOut::MultiBlockChange.as_u8(), |p| {
        p.put_i32(chunk_x);
        p.put_i32(chunk_z);
        write_varint(p, records.len() as i32);
        for (pos, state) in records {
            p.put_u8((((pos.x & 0x0F) << 4) | (pos.z & 0x0F)) as u8);
            p.put_u8(pos.y as u8);
            write_varint(p, *state);
        }
    });
}
