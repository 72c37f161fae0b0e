//! # Challenge Packets
//!
//! Builders and parsers for the two challenge/response packet shapes used by
//! the verification handshake.
//!
//! Two independent exchanges share these shapes. Server to client: a server
//! challenge request answered with the rich response (fresh challenge +
//! signature + public key), checked with
//! [`verify_server_challenge_response`]. Client to server: the rich response
//! doubles as the request, answered with a bare signature packet, checked
//! with [`verify_client_challenge_response`].
//!
//! ## Wire Sizes
//! ```text
//! server challenge request:   72 = header(8) + challenge(64)
//! server challenge response: 168 = header(8) + challenge(64) + signature(64) + public key(32)
//! client challenge response:  72 = header(8) + signature(64)
//! ```
//!
//! Parsers validate the exact `{type, size}` pair before extracting fields
//! and return `None` on any mismatch — "not this packet shape" is ordinary
//! control flow, not an error.

use crate::core::packet::{create_packet_writer, PacketType, RawPacket, PACKET_HEADER_SIZE};
use crate::core::serializer::Serializer;
use crate::crypto::{self, KeyPair, PublicKey, Signature, KEY_SIZE, SIGNATURE_SIZE};
use crate::error::Result;

/// Size (in bytes) of a challenge nonce.
pub const CHALLENGE_SIZE: usize = 64;

/// A challenge nonce presented to a peer.
pub type Challenge = [u8; CHALLENGE_SIZE];

/// Total size of a server challenge request packet.
pub const SERVER_CHALLENGE_REQUEST_SIZE: u32 = PACKET_HEADER_SIZE + CHALLENGE_SIZE as u32;

/// Total size of a server challenge response packet.
pub const SERVER_CHALLENGE_RESPONSE_SIZE: u32 =
    PACKET_HEADER_SIZE + (CHALLENGE_SIZE + SIGNATURE_SIZE + KEY_SIZE) as u32;

/// Total size of a client challenge response packet.
pub const CLIENT_CHALLENGE_RESPONSE_SIZE: u32 = PACKET_HEADER_SIZE + SIGNATURE_SIZE as u32;

/// A parsed server challenge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerChallengeRequest {
    /// The challenge to sign.
    pub challenge: Challenge,
}

/// A parsed server challenge response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerChallengeResponse {
    /// The fresh challenge issued back to the peer.
    pub challenge: Challenge,

    /// Signature over the request challenge.
    pub signature: Signature,

    /// Public key of the responder.
    pub public_key: PublicKey,
}

/// A parsed client challenge response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientChallengeResponse {
    /// Signature over the previously issued challenge.
    pub signature: Signature,
}

fn is_packet_header_valid(packet: &RawPacket, packet_type: PacketType, size: u32) -> bool {
    packet.packet_type == packet_type.to_u32() && packet.size == size
}

/// Generates a random server challenge that is sent to a client.
pub fn generate_server_challenge_request() -> Result<Vec<u8>> {
    let challenge: Challenge = crypto::random_array()?;

    let mut writer =
        create_packet_writer(PacketType::ServerChallenge, SERVER_CHALLENGE_REQUEST_SIZE)?;
    writer.write_bytes(&challenge)?;
    Ok(writer.into_buffer())
}

/// Tries to parse a server challenge request packet.
pub fn try_parse_server_challenge_request(packet: &RawPacket) -> Option<ServerChallengeRequest> {
    if !is_packet_header_valid(
        packet,
        PacketType::ServerChallenge,
        SERVER_CHALLENGE_REQUEST_SIZE,
    ) {
        return None;
    }

    let challenge: Challenge = packet.payload.get(..CHALLENGE_SIZE)?.try_into().ok()?;
    Some(ServerChallengeRequest { challenge })
}

/// Generates a client response to a server challenge: a fresh challenge, a
/// signature over the request challenge, and the client public key.
///
/// Returns the binary response packet together with the fresh challenge so
/// the caller can check the follow-up response against it.
pub fn generate_server_challenge_response(
    request: &ServerChallengeRequest,
    key_pair: &KeyPair,
) -> Result<(Vec<u8>, Challenge)> {
    let challenge: Challenge = crypto::random_array()?;
    let signature = key_pair.sign(&request.challenge)?;

    let mut writer =
        create_packet_writer(PacketType::ServerChallenge, SERVER_CHALLENGE_RESPONSE_SIZE)?;
    writer.write_bytes(&challenge)?;
    writer.write_bytes(signature.as_bytes())?;
    writer.write_bytes(key_pair.public_key().as_bytes())?;
    Ok((writer.into_buffer(), challenge))
}

/// Tries to parse a server challenge response packet.
pub fn try_parse_server_challenge_response(packet: &RawPacket) -> Option<ServerChallengeResponse> {
    if !is_packet_header_valid(
        packet,
        PacketType::ServerChallenge,
        SERVER_CHALLENGE_RESPONSE_SIZE,
    ) {
        return None;
    }

    let payload = &packet.payload;
    let challenge: Challenge = payload.get(..CHALLENGE_SIZE)?.try_into().ok()?;
    let signature: [u8; SIGNATURE_SIZE] = payload
        .get(CHALLENGE_SIZE..CHALLENGE_SIZE + SIGNATURE_SIZE)?
        .try_into()
        .ok()?;
    let public_key: [u8; KEY_SIZE] = payload
        .get(CHALLENGE_SIZE + SIGNATURE_SIZE..)?
        .try_into()
        .ok()?;

    Some(ServerChallengeResponse {
        challenge,
        signature: Signature(signature),
        public_key: PublicKey(public_key),
    })
}

/// Verifies a response to a server challenge: the embedded signature must
/// cover the challenge that was presented, under the embedded public key.
pub fn verify_server_challenge_response(
    response: &ServerChallengeResponse,
    challenge: &Challenge,
) -> bool {
    crypto::verify(&response.public_key, challenge, &response.signature)
}

/// Generates a response to a client challenge: a bare signature over the
/// challenge carried by the request.
pub fn generate_client_challenge_response(
    request: &ServerChallengeResponse,
    key_pair: &KeyPair,
) -> Result<Vec<u8>> {
    let signature = key_pair.sign(&request.challenge)?;

    let mut writer =
        create_packet_writer(PacketType::ClientChallenge, CLIENT_CHALLENGE_RESPONSE_SIZE)?;
    writer.write_bytes(signature.as_bytes())?;
    Ok(writer.into_buffer())
}

/// Tries to parse a client challenge response packet.
pub fn try_parse_client_challenge_response(packet: &RawPacket) -> Option<ClientChallengeResponse> {
    if !is_packet_header_valid(
        packet,
        PacketType::ClientChallenge,
        CLIENT_CHALLENGE_RESPONSE_SIZE,
    ) {
        return None;
    }

    let signature: [u8; SIGNATURE_SIZE] = packet.payload.get(..SIGNATURE_SIZE)?.try_into().ok()?;
    Some(ClientChallengeResponse {
        signature: Signature(signature),
    })
}

/// Verifies a client's response to a previously issued challenge.
pub fn verify_client_challenge_response(
    response: &ClientChallengeResponse,
    public_key: &PublicKey,
    challenge: &Challenge,
) -> bool {
    crypto::verify(public_key, challenge, &response.signature)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::protocol::test_utils::packet_from_buffer;

    #[test]
    fn server_challenge_request_has_expected_shape() {
        let buffer = generate_server_challenge_request().unwrap();

        assert_eq!(72, buffer.len());
        let packet = packet_from_buffer(&buffer);
        assert_eq!(PacketType::ServerChallenge.to_u32(), packet.packet_type);
        assert_eq!(72, packet.size);

        let request = try_parse_server_challenge_request(&packet).unwrap();
        assert_ne!([0u8; CHALLENGE_SIZE], request.challenge);
    }

    #[test]
    fn server_challenge_requests_are_random() {
        let first = try_parse_server_challenge_request(&packet_from_buffer(
            &generate_server_challenge_request().unwrap(),
        ))
        .unwrap();
        let second = try_parse_server_challenge_request(&packet_from_buffer(
            &generate_server_challenge_request().unwrap(),
        ))
        .unwrap();

        assert_ne!(first.challenge, second.challenge);
    }

    #[test]
    fn server_challenge_response_is_verifiable() {
        let request = ServerChallengeRequest {
            challenge: [0x24; CHALLENGE_SIZE],
        };
        let key_pair = KeyPair::random().unwrap();

        let (buffer, fresh_challenge) =
            generate_server_challenge_response(&request, &key_pair).unwrap();

        assert_eq!(168, buffer.len());
        let response = try_parse_server_challenge_response(&packet_from_buffer(&buffer)).unwrap();

        // the returned challenge matches the embedded one and is fresh
        assert_eq!(fresh_challenge, response.challenge);
        assert_ne!(request.challenge, response.challenge);
        assert_eq!(*key_pair.public_key(), response.public_key);

        // the request challenge is what got signed
        assert!(verify_server_challenge_response(&response, &request.challenge));
        assert!(!verify_server_challenge_response(&response, &fresh_challenge));
    }

    #[test]
    fn client_challenge_response_is_verifiable() {
        let key_pair = KeyPair::random().unwrap();
        let request = ServerChallengeResponse {
            challenge: [0x77; CHALLENGE_SIZE],
            signature: Signature([0; SIGNATURE_SIZE]),
            public_key: *key_pair.public_key(),
        };

        let buffer = generate_client_challenge_response(&request, &key_pair).unwrap();

        assert_eq!(72, buffer.len());
        let packet = packet_from_buffer(&buffer);
        assert_eq!(PacketType::ClientChallenge.to_u32(), packet.packet_type);

        let response = try_parse_client_challenge_response(&packet).unwrap();
        assert!(verify_client_challenge_response(
            &response,
            key_pair.public_key(),
            &request.challenge
        ));
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let key_pair = KeyPair::random().unwrap();
        let request = ServerChallengeResponse {
            challenge: [0x77; CHALLENGE_SIZE],
            signature: Signature([0; SIGNATURE_SIZE]),
            public_key: *key_pair.public_key(),
        };

        let buffer = generate_client_challenge_response(&request, &key_pair).unwrap();
        let mut response =
            try_parse_client_challenge_response(&packet_from_buffer(&buffer)).unwrap();
        response.signature.0[0] ^= 0xFF;

        assert!(!verify_client_challenge_response(
            &response,
            key_pair.public_key(),
            &request.challenge
        ));
    }

    #[test]
    fn parsers_reject_wrong_type() {
        let mut buffer = generate_server_challenge_request().unwrap();
        buffer[4] = 0x09;

        assert!(try_parse_server_challenge_request(&packet_from_buffer(&buffer)).is_none());
    }

    #[test]
    fn parsers_reject_wrong_size() {
        // both shapes share the server-challenge type, so size is the only
        // thing telling them apart
        let key_pair = KeyPair::random().unwrap();
        let request = ServerChallengeRequest {
            challenge: [0x24; CHALLENGE_SIZE],
        };
        let (response_buffer, _) =
            generate_server_challenge_response(&request, &key_pair).unwrap();

        // 168-byte response must not parse as a 72-byte request
        assert!(
            try_parse_server_challenge_request(&packet_from_buffer(&response_buffer)).is_none()
        );
        // and a 72-byte request must not parse as a 168-byte response
        let request_buffer = generate_server_challenge_request().unwrap();
        assert!(
            try_parse_server_challenge_response(&packet_from_buffer(&request_buffer)).is_none()
        );
    }
}
