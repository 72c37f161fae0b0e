//! # Tokio Codec Adapter
//!
//! [`PacketCodec`] exposes the packet framing contract to
//! `tokio_util::codec::Framed` transports, so authenticated connections can
//! be driven as a packet `Stream`/`Sink` instead of hand-rolled reads.
//!
//! The validation is identical to [`PacketFramer`](crate::core::framer):
//! little-endian `size`/`type` header, `size < 8` fatal, empty payloads
//! allowed, no maximum size enforced.

use crate::core::packet::{RawPacket, PACKET_HEADER_SIZE};
use crate::error::ProtocolError;
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Tokio codec for length-prefixed peer packets.
#[derive(Debug, Default, Clone, Copy)]
pub struct PacketCodec;

impl Decoder for PacketCodec {
    type Item = RawPacket;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RawPacket>, ProtocolError> {
        if src.len() < PACKET_HEADER_SIZE as usize {
            return Ok(None);
        }

        let size = u32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        if size < PACKET_HEADER_SIZE {
            return Err(ProtocolError::PacketSizeTooSmall(size));
        }

        if src.len() < size as usize {
            // reserve the rest of the packet to avoid repeated reallocation
            src.reserve(size as usize - src.len());
            return Ok(None);
        }

        let packet_type = u32::from_le_bytes([src[4], src[5], src[6], src[7]]);
        src.advance(PACKET_HEADER_SIZE as usize);
        let payload = src.split_to((size - PACKET_HEADER_SIZE) as usize).freeze();

        Ok(Some(RawPacket {
            packet_type,
            size,
            payload,
        }))
    }
}

impl Encoder<RawPacket> for PacketCodec {
    type Error = ProtocolError;

    fn encode(&mut self, packet: RawPacket, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let size = PACKET_HEADER_SIZE + packet.payload.len() as u32;
        dst.reserve(size as usize);
        dst.put_u32_le(size);
        dst.put_u32_le(packet.packet_type);
        dst.put_slice(&packet.payload);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn decode_waits_for_full_packet() {
        let mut codec = PacketCodec;
        let mut buffer = BytesMut::new();

        buffer.extend_from_slice(&[0x0C, 0x00, 0x00, 0x00, 0x09, 0x00]);
        assert!(codec.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(&[0x00, 0x00, 0xAA, 0xBB]);
        assert!(codec.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(&[0xCC, 0xDD]);
        let packet = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(9, packet.packet_type);
        assert_eq!(12, packet.size);
        assert_eq!(&[0xAA, 0xBB, 0xCC, 0xDD][..], &packet.payload[..]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn decode_rejects_undersized_packet() {
        let mut codec = PacketCodec;
        let mut buffer = BytesMut::new();
        buffer.extend_from_slice(&[0x07, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00]);

        assert!(matches!(
            codec.decode(&mut buffer),
            Err(ProtocolError::PacketSizeTooSmall(7))
        ));
    }

    #[test]
    fn encode_then_decode_roundtrips() {
        let mut codec = PacketCodec;
        let packet = RawPacket {
            packet_type: 0x4321,
            size: 13,
            payload: Bytes::from_static(&[1, 2, 3, 4, 5]),
        };

        let mut buffer = BytesMut::new();
        codec.encode(packet.clone(), &mut buffer).unwrap();
        let decoded = codec.decode(&mut buffer).unwrap().unwrap();

        assert_eq!(packet, decoded);
    }
}
