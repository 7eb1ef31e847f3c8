use bytes::{Bytes, BytesMut};
use nanogame_core::NanoError;
use nanogame_protocol::{
    read_byte_string, read_frame, read_varint, write_byte_string, write_frame, write_varint,
    FrameCodec,
};
use proptest::prelude::*;
use tokio_util::codec::Decoder;

proptest! {
    #[test]
    fn prop_varint_roundtrip(value in any::<i32>()) {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, value);
        prop_assert!(buf.len() <= 5);
        prop_assert_eq!(read_varint(&mut buf).unwrap(), value);
        prop_assert!(buf.is_empty());
    }

    #[test]
    fn prop_byte_string_roundtrip(data in prop::collection::vec(any::<u8>(), 0..=2048)) {
        let mut buf = BytesMut::new();
        write_byte_string(&mut buf, &data);
        prop_assert_eq!(&read_byte_string(&mut buf).unwrap()[..], &data[..]);
    }

    #[test]
    fn prop_frame_roundtrip(data in prop::collection::vec(any::<u8>(), 1..=4096)) {
        let mut buf = BytesMut::new();
        write_frame(&mut buf, &data);
        prop_assert_eq!(&read_frame(&mut buf.clone()).unwrap()[..], &data[..]);

        let mut codec = FrameCodec::new();
        prop_assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &data[..]);
    }

    #[test]
    fn prop_frame_survives_any_split(
        data in prop::collection::vec(any::<u8>(), 1..=512),
        split in 0usize..600,
    ) {
        let mut encoded = BytesMut::new();
        write_frame(&mut encoded, &data);
        let split = split.min(encoded.len());

        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&encoded[..split]);
        let early = codec.decode(&mut buf).unwrap();
        if split < encoded.len() {
            prop_assert!(early.is_none());
            buf.extend_from_slice(&encoded[split..]);
            let frame = codec.decode(&mut buf).unwrap().unwrap();
            prop_assert_eq!(&frame[..], &data[..]);
        } else {
            prop_assert_eq!(&early.unwrap()[..], &data[..]);
        }
    }

    #[test]
    fn prop_nonpositive_frame_lengths_fail(len in i32::MIN..=0) {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, len);
        prop_assert!(matches!(read_frame(&mut buf), Err(NanoError::FrameLength(_))));
    }
}

#[test]
fn max_size_frame_roundtrip() {
    let data = Bytes::from(vec![0xABu8; 0x1F_FFFF]);
    let mut buf = BytesMut::new();
    write_frame(&mut buf, &data);
    assert_eq!(read_frame(&mut buf).unwrap(), data);
}

#[test]
fn oversized_frame_fails() {
    let mut buf = BytesMut::new();
    write_varint(&mut buf, 0x20_0000);
    buf.extend_from_slice(&vec![0u8; 0x20_0000]);
    assert!(matches!(read_frame(&mut buf), Err(NanoError::FrameLength(0x20_0000))));
}
