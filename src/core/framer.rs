//! # Packet Framer
//!
//! Turns an unbounded sequence of inbound byte chunks into discrete
//! length-prefixed packets.
//!
//! The framer is a two-state machine — *awaiting header* and *awaiting body*,
//! tracked by an optional pending header. Each [`PacketFramer::push`] call
//! appends the chunk and then consumes as many complete headers and bodies as
//! the buffered bytes allow, so a single chunk may complete zero, one, or
//! many packets and may leave a partial header or body buffered for the next
//! chunk. Completed packets are queued and drained with
//! [`PacketFramer::next_packet`].
//!
//! No maximum packet size is enforced; backpressure is the caller's
//! responsibility.

use crate::core::packet::{PacketHeader, RawPacket, PACKET_HEADER_SIZE};
use crate::core::parser::BinaryReader;
use crate::error::{ProtocolError, Result};
use bytes::Bytes;
use std::collections::VecDeque;

/// Accepts and buffers binary data and yields full packets as they complete.
#[derive(Debug, Default)]
pub struct PacketFramer {
    reader: BinaryReader,
    pending_header: Option<PacketHeader>,
    completed: VecDeque<RawPacket>,
}

impl PacketFramer {
    /// Creates a packet framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk to the working buffer and frames any completed packets.
    ///
    /// Fails if a header declares a total size smaller than the header
    /// itself; the framer must not be used again after a failure.
    pub fn push(&mut self, buffer: Bytes) -> Result<()> {
        self.reader.push(buffer);

        // keep alternating while a header or body was just consumed
        loop {
            let consumed_header = self.process_header()?;
            let consumed_body = self.process_body()?;
            if !consumed_header && !consumed_body {
                break;
            }
        }

        Ok(())
    }

    /// Pops the next completed packet, if any.
    pub fn next_packet(&mut self) -> Option<RawPacket> {
        self.completed.pop_front()
    }

    /// Gets the number of buffered bytes not yet part of a completed packet.
    pub fn num_unprocessed_bytes(&self) -> usize {
        self.reader.num_unprocessed_bytes()
    }

    fn process_header(&mut self) -> Result<bool> {
        if self.pending_header.is_some()
            || self.reader.num_unprocessed_bytes() < PACKET_HEADER_SIZE as usize
        {
            return Ok(false);
        }

        let size = self.reader.read_u32()?;
        let packet_type = self.reader.read_u32()?;

        if size < PACKET_HEADER_SIZE {
            return Err(ProtocolError::PacketSizeTooSmall(size));
        }

        self.pending_header = Some(PacketHeader { size, packet_type });
        Ok(true)
    }

    fn process_body(&mut self) -> Result<bool> {
        let header = match self.pending_header {
            Some(header) => header,
            None => return Ok(false),
        };

        let body_size = (header.size - PACKET_HEADER_SIZE) as usize;
        if self.reader.num_unprocessed_bytes() < body_size {
            return Ok(false);
        }

        // a zero-size body still yields an empty (not absent) payload
        let payload = self.reader.read_buffer(body_size)?;

        self.completed.push_back(RawPacket {
            packet_type: header.packet_type,
            size: header.size,
            payload,
        });
        self.pending_header = None;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn packet_bytes(packet_type: u32, payload: &[u8]) -> Vec<u8> {
        let size = (payload.len() + 8) as u32;
        let mut bytes = Vec::with_capacity(size as usize);
        bytes.extend_from_slice(&size.to_le_bytes());
        bytes.extend_from_slice(&packet_type.to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn drain(framer: &mut PacketFramer) -> Vec<RawPacket> {
        let mut packets = Vec::new();
        while let Some(packet) = framer.next_packet() {
            packets.push(packet);
        }
        packets
    }

    #[test]
    fn header_only_packet_emits_empty_payload() {
        let mut framer = PacketFramer::new();

        framer
            .push(Bytes::from_static(&[0x08, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00]))
            .unwrap();

        let packets = drain(&mut framer);
        assert_eq!(1, packets.len());
        assert_eq!(9, packets[0].packet_type);
        assert_eq!(8, packets[0].size);
        assert!(packets[0].payload.is_empty());
    }

    #[test]
    fn partial_header_emits_nothing() {
        let mut framer = PacketFramer::new();

        framer.push(Bytes::from_static(&[0x10, 0x00, 0x00])).unwrap();

        assert!(framer.next_packet().is_none());
        assert_eq!(3, framer.num_unprocessed_bytes());
    }

    #[test]
    fn partial_body_emits_nothing() {
        let bytes = packet_bytes(7, &[1, 2, 3, 4]);
        let mut framer = PacketFramer::new();

        framer.push(Bytes::copy_from_slice(&bytes[..10])).unwrap();

        assert!(framer.next_packet().is_none());
    }

    #[test]
    fn packet_split_across_all_chunk_boundaries_emits_once() {
        let payload: Vec<u8> = (0u8..37).collect();
        let bytes = packet_bytes(0x4321, &payload);

        // every split position, including before and after the full packet
        for split in 0..=bytes.len() {
            let mut framer = PacketFramer::new();
            framer.push(Bytes::copy_from_slice(&bytes[..split])).unwrap();
            framer.push(Bytes::copy_from_slice(&bytes[split..])).unwrap();

            let packets = drain(&mut framer);
            assert_eq!(1, packets.len(), "split at {split}");
            assert_eq!(0x4321, packets[0].packet_type);
            assert_eq!(payload, packets[0].payload.to_vec(), "split at {split}");
        }
    }

    #[test]
    fn packet_split_into_single_bytes_emits_once() {
        let payload = [0xAB; 11];
        let bytes = packet_bytes(2, &payload);
        let mut framer = PacketFramer::new();

        for byte in &bytes {
            framer.push(Bytes::copy_from_slice(&[*byte])).unwrap();
        }

        let packets = drain(&mut framer);
        assert_eq!(1, packets.len());
        assert_eq!(payload.to_vec(), packets[0].payload.to_vec());
    }

    #[test]
    fn one_chunk_can_emit_many_packets() {
        let mut bytes = packet_bytes(1, &[0x11]);
        bytes.extend_from_slice(&packet_bytes(2, &[]));
        bytes.extend_from_slice(&packet_bytes(3, &[0x22, 0x33]));
        // trailing partial header stays buffered
        bytes.extend_from_slice(&[0x40, 0x00]);

        let mut framer = PacketFramer::new();
        framer.push(Bytes::copy_from_slice(&bytes)).unwrap();

        let packets = drain(&mut framer);
        assert_eq!(3, packets.len());
        assert_eq!(
            vec![1, 2, 3],
            packets.iter().map(|packet| packet.packet_type).collect::<Vec<_>>()
        );
        assert_eq!(2, framer.num_unprocessed_bytes());
    }

    #[test]
    fn size_below_header_size_is_fatal() {
        for size in 0u32..8 {
            let mut bytes = Vec::new();
            bytes.extend_from_slice(&size.to_le_bytes());
            bytes.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

            let mut framer = PacketFramer::new();
            let result = framer.push(Bytes::copy_from_slice(&bytes));

            match result {
                Err(ProtocolError::PacketSizeTooSmall(reported)) => assert_eq!(size, reported),
                other => panic!("expected packet size error for {size}, got {other:?}"),
            }
        }
    }

    #[test]
    fn payload_within_one_chunk_shares_storage() {
        let bytes = Bytes::from(packet_bytes(5, &[9, 8, 7, 6]));
        let mut framer = PacketFramer::new();

        framer.push(bytes.clone()).unwrap();

        let packet = framer.next_packet().unwrap();
        assert_eq!(bytes[8..].as_ptr(), packet.payload.as_ptr());
    }
}
