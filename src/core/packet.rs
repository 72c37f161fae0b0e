//! # Packets
//!
//! The length-prefixed binary message unit exchanged between peers.
//!
//! ## Wire Format
//! ```text
//! [Size(4, LE)] [Type(4, LE)] [Payload(Size - 8)]
//! ```
//!
//! `Size` counts the full packet including the 8-byte header, so the smallest
//! valid packet is a bare header with `Size == 8` and an empty payload.

use crate::core::serializer::{BinaryWriter, Serializer};
use crate::error::Result;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Size (in bytes) of a packet header.
pub const PACKET_HEADER_SIZE: u32 = 8;

/// Fixed-size header prefixed to every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Total packet size including this header.
    pub size: u32,

    /// Packet type.
    pub packet_type: u32,
}

impl PacketHeader {
    /// Encodes the header into an 8-byte buffer.
    pub fn to_bytes(self) -> [u8; PACKET_HEADER_SIZE as usize] {
        let mut bytes = [0u8; PACKET_HEADER_SIZE as usize];
        bytes[0..4].copy_from_slice(&self.size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.packet_type.to_le_bytes());
        bytes
    }
}

/// A raw packet composed of header information and a payload.
///
/// Produced by the framer and consumed immediately; the payload is a cheap
/// reference-counted slice of the inbound chunk whenever possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    /// Packet type.
    pub packet_type: u32,

    /// Total packet size including the header.
    pub size: u32,

    /// Packet payload (`size - 8` bytes; empty for a bare header).
    pub payload: Bytes,
}

/// Well-known packet types.
///
/// The wire carries an open `u32`; this enum names the values this crate
/// understands. Unknown values are forwarded untouched by the framer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketType {
    /// A challenge from a server to a client.
    ServerChallenge,

    /// A challenge from a client to a server.
    ClientChallenge,

    /// Blocks have been pushed by a peer.
    PushBlock,

    /// Transactions have been pushed by an api-node or a peer.
    PushTransactions,

    /// Partial aggregate transactions have been pushed by an api-node.
    PushPartialTransactions,

    /// Detached cosignatures have been pushed by an api-node.
    PushDetachedCosignatures,
}

impl PacketType {
    /// Gets the wire value of this packet type.
    pub fn to_u32(self) -> u32 {
        match self {
            PacketType::ServerChallenge => 1,
            PacketType::ClientChallenge => 2,
            PacketType::PushBlock => 3,
            PacketType::PushTransactions => 9,
            PacketType::PushPartialTransactions => 0x100,
            PacketType::PushDetachedCosignatures => 0x101,
        }
    }

    /// Maps a wire value to a known packet type.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(PacketType::ServerChallenge),
            2 => Some(PacketType::ClientChallenge),
            3 => Some(PacketType::PushBlock),
            9 => Some(PacketType::PushTransactions),
            0x100 => Some(PacketType::PushPartialTransactions),
            0x101 => Some(PacketType::PushDetachedCosignatures),
            _ => None,
        }
    }
}

/// Writes a packet header for a packet of `size` total bytes.
pub fn write_packet_header(
    serializer: &mut dyn Serializer,
    packet_type: PacketType,
    size: u32,
) -> Result<()> {
    serializer.write_u32(size)?;
    serializer.write_u32(packet_type.to_u32())
}

/// Allocates a packet buffer of exactly `size` bytes with the header written.
///
/// The returned writer is positioned after the header, ready for the payload.
pub fn create_packet_writer(packet_type: PacketType, size: u32) -> Result<BinaryWriter> {
    let mut writer = BinaryWriter::new(size as usize)?;
    write_packet_header(&mut writer, packet_type, size)?;
    Ok(writer)
}
