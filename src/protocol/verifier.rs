//! # Peer Verifier
//!
//! Per-connection two-step verification state machine.
//!
//! Step one consumes the server's challenge request and produces the rich
//! response packet, remembering the fresh challenge embedded in it. Step two
//! consumes the server's answer to that challenge and verifies its signature
//! under the expected server public key. Whatever happens, the terminal
//! result is raised exactly once; packets arriving after the terminal result
//! are ignored.
//!
//! The verifier is synchronous and transport-free — it consumes framed
//! packets and emits response buffers. Wiring it to a byte stream is the job
//! of [`authenticate`](crate::protocol::auth::authenticate).

use crate::core::packet::RawPacket;
use crate::crypto::{KeyPair, PublicKey};
use crate::error::Result;
use crate::protocol::challenge::{
    generate_server_challenge_response, try_parse_client_challenge_response,
    try_parse_server_challenge_request, verify_client_challenge_response, Challenge,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Possible results of a verification handshake with a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyResult {
    /// The peer was verified.
    Success,

    /// An i/o error was encountered during verification.
    IoError,

    /// The peer sent malformed data.
    MalformedData,

    /// The peer failed the challenge.
    FailedChallenge,
}

impl VerifyResult {
    /// Gets the numeric code of this result.
    pub fn code(self) -> u8 {
        match self {
            VerifyResult::Success => 0,
            VerifyResult::IoError => 1,
            VerifyResult::MalformedData => 2,
            VerifyResult::FailedChallenge => 3,
        }
    }
}

impl std::fmt::Display for VerifyResult {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VerifyResult::Success => "success",
            VerifyResult::IoError => "io error",
            VerifyResult::MalformedData => "malformed data",
            VerifyResult::FailedChallenge => "failed challenge",
        };
        write!(formatter, "{name}")
    }
}

/// What the caller must do after handing a packet to the verifier.
#[derive(Debug, PartialEq, Eq)]
pub enum VerifierAction {
    /// Write this response packet to the peer.
    Respond(Vec<u8>),

    /// The handshake reached its terminal result.
    Complete(VerifyResult),

    /// The packet was not consumed by the handshake.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    AwaitingServerChallenge,
    AwaitingClientChallenge { challenge: Challenge },
    Complete,
}

/// Two-step verification state machine for a single connection.
#[derive(Debug)]
pub struct Verifier {
    client_key_pair: KeyPair,
    server_public_key: PublicKey,
    step: Step,
    has_raised_terminal_result: bool,
}

impl Verifier {
    /// Creates a verifier for a connection to the server owning
    /// `server_public_key`, authenticating as `client_key_pair`.
    pub fn new(client_key_pair: KeyPair, server_public_key: PublicKey) -> Self {
        Self {
            client_key_pair,
            server_public_key,
            step: Step::AwaitingServerChallenge,
            has_raised_terminal_result: false,
        }
    }

    /// Dispatches a packet to the next unconsumed handshake step.
    ///
    /// Errors are internal failures only (signing, randomness); protocol
    /// outcomes — including malformed packets — are reported through
    /// [`VerifierAction::Complete`].
    pub fn process(&mut self, packet: &RawPacket) -> Result<VerifierAction> {
        match self.step {
            Step::AwaitingServerChallenge => self.handle_server_challenge(packet),
            Step::AwaitingClientChallenge { challenge } => {
                Ok(self.handle_client_challenge(packet, &challenge))
            }
            Step::Complete => Ok(VerifierAction::Ignored),
        }
    }

    fn handle_server_challenge(&mut self, packet: &RawPacket) -> Result<VerifierAction> {
        let request = match try_parse_server_challenge_request(packet) {
            Some(request) => request,
            None => return Ok(self.raise_terminal_result(VerifyResult::MalformedData)),
        };

        let (response, challenge) =
            generate_server_challenge_response(&request, &self.client_key_pair)?;
        self.step = Step::AwaitingClientChallenge { challenge };

        debug!(response_size = response.len(), "responding to server challenge");
        Ok(VerifierAction::Respond(response))
    }

    fn handle_client_challenge(
        &mut self,
        packet: &RawPacket,
        challenge: &Challenge,
    ) -> VerifierAction {
        let response = match try_parse_client_challenge_response(packet) {
            Some(response) => response,
            None => return self.raise_terminal_result(VerifyResult::MalformedData),
        };

        let is_verified =
            verify_client_challenge_response(&response, &self.server_public_key, challenge);
        debug!(is_verified, "client challenge verified");

        self.raise_terminal_result(if is_verified {
            VerifyResult::Success
        } else {
            VerifyResult::FailedChallenge
        })
    }

    fn raise_terminal_result(&mut self, result: VerifyResult) -> VerifierAction {
        if VerifyResult::Success != result {
            warn!(%result, "handshake failed");
        }

        self.step = Step::Complete;

        // only raise the terminal result once
        if self.has_raised_terminal_result {
            return VerifierAction::Ignored;
        }

        self.has_raised_terminal_result = true;
        VerifierAction::Complete(result)
    }
}
