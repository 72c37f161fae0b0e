//! # Verification Handshake
//!
//! The challenge-response mutual-authentication handshake performed against
//! a peer node before any other traffic is accepted.
//!
//! ## Components
//! - **Challenge**: packet builders/parsers for the two challenge shapes
//! - **Verifier**: synchronous per-connection two-step state machine
//! - **Auth**: async composition wiring a byte stream, the packet framer,
//!   and the verifier into a single pass/fail future

pub mod auth;
pub mod challenge;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::core::packet::RawPacket;
    use bytes::Bytes;

    /// Reinterprets a generated packet buffer as a framed packet.
    pub(crate) fn packet_from_buffer(buffer: &[u8]) -> RawPacket {
        let size = u32::from_le_bytes(buffer[0..4].try_into().expect("packet header"));
        let packet_type = u32::from_le_bytes(buffer[4..8].try_into().expect("packet header"));
        RawPacket {
            packet_type,
            size,
            payload: Bytes::copy_from_slice(&buffer[8..]),
        }
    }
}
