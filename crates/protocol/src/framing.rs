//! Frame codec for stream transports
//!
//! Splits a byte stream into length-prefixed frames. A frame is only yielded
//! once its whole payload is buffered, so partial reads never reach the
//! packet decoders. Plugs into `tokio_util::codec::{FramedRead, Framed}`.

use crate::codecs::{check_frame_length, peek_varint, write_frame};
use bytes::{Buf, Bytes, BytesMut};
use nanogame_core::NanoError;
use tokio_util::codec::{Decoder, Encoder};

/// Length-prefixed frame codec
///
/// Decoded items are the raw frame payloads (packet id byte first).
/// Encoding takes a payload and prepends its VarInt length.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec;

impl FrameCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = NanoError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some((len, prefix)) = peek_varint(src)? else {
            return Ok(None);
        };
        let len = check_frame_length(len)?;

        let total = prefix + len;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(prefix);
        Ok(Some(src.split_to(len).freeze()))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = NanoError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        check_frame_length(i32::try_from(item.len()).unwrap_or(i32::MAX))?;
        write_frame(dst, &item);
        Ok(())
    }
}
