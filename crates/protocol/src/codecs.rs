//! Binary codecs for the legacy wire format
//!
//! Fixed-width values are big-endian. Variable-length integers carry 7 data
//! bits per byte, least significant group first, with the high bit flagging
//! continuation. Strings and frames are prefixed with their byte length as a
//! VarInt.
//!
//! Readers take any [`Buf`] so they work on a buffered frame (`Bytes`,
//! `BytesMut`, `&[u8]`). Running out of bytes is reported as
//! [`NanoError::EndOfStream`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use nanogame_core::{NanoError, Result};

/// Maximum bytes a VarInt may occupy
pub const MAX_VARINT_LEN: usize = 5;

/// Maximum declared byte length of a string
pub const MAX_STRING_LEN: i32 = 32767;

/// Maximum declared byte length of a frame payload
pub const MAX_FRAME_LEN: i32 = 0x1F_FFFF;

#[inline]
fn ensure<B: Buf>(buf: &B, len: usize, what: &'static str) -> Result<()> {
    if buf.remaining() < len {
        return Err(NanoError::EndOfStream(what));
    }
    Ok(())
}

/// Write a VarInt
///
/// The value is reinterpreted as unsigned, so negative numbers always take
/// five bytes. Zero is a single `0x00`.
#[inline]
pub fn write_varint(buf: &mut BytesMut, val: i32) {
    let mut n = val as u32;
    loop {
        let byte = (n & 0x7F) as u8;
        n >>= 7;
        if n == 0 {
            buf.put_u8(byte);
            return;
        }
        buf.put_u8(byte | 0x80);
    }
}

/// Read a VarInt
///
/// # Errors
/// - `VarIntTooLong` once a fifth byte still has its continuation bit set
/// - `EndOfStream` if the buffer ends mid-value
pub fn read_varint<B: Buf>(buf: &mut B) -> Result<i32> {
    let mut result: u32 = 0;
    let mut shift = 0;

    loop {
        if shift > 28 {
            return Err(NanoError::VarIntTooLong);
        }
        ensure(buf, 1, "VarInt")?;

        let byte = buf.get_u8();
        result |= u32::from(byte & 0x7F) << shift;

        if byte & 0x80 == 0 {
            return Ok(result as i32);
        }
        shift += 7;
    }
}

/// Decode a VarInt at the start of `data` without consuming it
///
/// # Returns
/// - `Ok(Some((value, bytes_used)))` when a complete VarInt is present
/// - `Ok(None)` when more bytes are needed
pub fn peek_varint(data: &[u8]) -> Result<Option<(i32, usize)>> {
    let mut result: u32 = 0;

    for (i, &byte) in data.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(NanoError::VarIntTooLong);
        }
        result |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some((result as i32, i + 1)));
        }
    }

    if data.len() >= MAX_VARINT_LEN {
        return Err(NanoError::VarIntTooLong);
    }
    Ok(None)
}

/// Number of bytes `val` occupies as a VarInt
#[inline]
pub fn varint_len(val: i32) -> usize {
    let mut n = val as u32;
    let mut len = 1;
    while n >= 0x80 {
        n >>= 7;
        len += 1;
    }
    len
}

/// Write a length-prefixed string
#[inline]
pub fn write_string(buf: &mut BytesMut, val: &str) {
    write_byte_string(buf, val.as_bytes());
}

/// Write length-prefixed raw bytes
#[inline]
pub fn write_byte_string(buf: &mut BytesMut, val: &[u8]) {
    write_varint(buf, val.len() as i32);
    buf.put_slice(val);
}

/// Read length-prefixed raw bytes
///
/// # Errors
/// Fails if the declared length is negative or above [`MAX_STRING_LEN`].
pub fn read_byte_string<B: Buf>(buf: &mut B) -> Result<Bytes> {
    let len = read_varint(buf)?;
    if !(0..=MAX_STRING_LEN).contains(&len) {
        return Err(NanoError::StringTooLong(len));
    }

    let len = len as usize;
    ensure(buf, len, "string")?;
    Ok(buf.copy_to_bytes(len))
}

/// Read a length-prefixed UTF-8 string
pub fn read_string<B: Buf>(buf: &mut B) -> Result<String> {
    let bytes = read_byte_string(buf)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| NanoError::InvalidData(format!("Invalid UTF-8: {}", e)))
}

/// Write a boolean as exactly `0` or `1`
#[inline]
pub fn write_bool(buf: &mut BytesMut, val: bool) {
    buf.put_u8(u8::from(val));
}

/// Read a boolean (any nonzero byte is `true`)
#[inline]
pub fn read_bool<B: Buf>(buf: &mut B) -> Result<bool> {
    Ok(read_u8(buf)? != 0)
}

#[inline]
pub fn read_u8<B: Buf>(buf: &mut B) -> Result<u8> {
    ensure(buf, 1, "byte")?;
    Ok(buf.get_u8())
}

#[inline]
pub fn read_u16<B: Buf>(buf: &mut B) -> Result<u16> {
    ensure(buf, 2, "unsigned short")?;
    Ok(buf.get_u16())
}

#[inline]
pub fn read_i32<B: Buf>(buf: &mut B) -> Result<i32> {
    ensure(buf, 4, "int")?;
    Ok(buf.get_i32())
}

#[inline]
pub fn read_u64<B: Buf>(buf: &mut B) -> Result<u64> {
    ensure(buf, 8, "long")?;
    Ok(buf.get_u64())
}

#[inline]
pub fn read_f32<B: Buf>(buf: &mut B) -> Result<f32> {
    ensure(buf, 4, "float")?;
    Ok(buf.get_f32())
}

#[inline]
pub fn read_f64<B: Buf>(buf: &mut B) -> Result<f64> {
    ensure(buf, 8, "double")?;
    Ok(buf.get_f64())
}

/// Validate a declared frame length and convert it to a byte count
#[inline]
pub fn check_frame_length(len: i32) -> Result<usize> {
    if len <= 0 || len > MAX_FRAME_LEN {
        return Err(NanoError::FrameLength(len));
    }
    Ok(len as usize)
}

/// Write a frame: VarInt payload length followed by the payload
#[inline]
pub fn write_frame(buf: &mut BytesMut, payload: &[u8]) {
    buf.reserve(varint_len(payload.len() as i32) + payload.len());
    write_varint(buf, payload.len() as i32);
    buf.put_slice(payload);
}

/// Read one complete frame from an in-memory buffer
///
/// For reading from a socket use [`crate::FrameCodec`], which waits for the
/// whole frame instead of failing on a short buffer.
pub fn read_frame<B: Buf>(buf: &mut B) -> Result<Bytes> {
    let len = check_frame_length(read_varint(buf)?)?;
    ensure(buf, len, "frame")?;
    Ok(buf.copy_to_bytes(len))
}
