//! # Authentication Handshake
//!
//! Composes a byte stream, the packet framer, and the peer verifier into a
//! single pass/fail future.
//!
//! [`authenticate`] reads chunks from the stream, frames them, and routes
//! framed packets into the [`Verifier`] until it reaches a terminal result.
//! On success the resolved [`AuthenticatedConnection`] keeps the *same*
//! framer instance, so packets that arrived on the wire behind the handshake
//! packets are delivered to the caller instead of being lost. On failure the
//! future resolves to a [`VerifyError`]; any failure other than an i/o error
//! actively shuts the connection down.
//!
//! There is no built-in timeout — wrap the future in `tokio::time::timeout`
//! to impose one.

use crate::core::framer::PacketFramer;
use crate::core::packet::{PacketHeader, RawPacket, PACKET_HEADER_SIZE};
use crate::crypto::{KeyPair, PublicKey};
use crate::error::Result;
use crate::protocol::verifier::{Verifier, VerifierAction, VerifyResult};
use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// An error that indicates a failed verification handshake.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("verify failed with {result}")]
pub struct VerifyError {
    /// The result of the verify operation.
    pub result: VerifyResult,
}

/// A verified connection: the underlying stream plus the framer that was
/// used during the handshake (including any packets buffered behind it).
#[derive(Debug)]
pub struct AuthenticatedConnection<S> {
    stream: S,
    framer: PacketFramer,
}

impl<S> AuthenticatedConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Reads the next framed packet, pulling more bytes from the stream as
    /// needed.
    pub async fn next_packet(&mut self) -> Result<RawPacket> {
        let mut read_buffer = BytesMut::with_capacity(READ_BUFFER_SIZE);
        loop {
            if let Some(packet) = self.framer.next_packet() {
                return Ok(packet);
            }

            read_buffer.reserve(READ_BUFFER_SIZE);
            let num_read = self.stream.read_buf(&mut read_buffer).await?;
            if 0 == num_read {
                return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
            }

            self.framer.push(read_buffer.split().freeze())?;
        }
    }

    /// Writes a packet to the peer.
    pub async fn send(&mut self, packet: &RawPacket) -> Result<()> {
        let header = PacketHeader {
            size: PACKET_HEADER_SIZE + packet.payload.len() as u32,
            packet_type: packet.packet_type,
        };

        self.stream.write_all(&header.to_bytes()).await?;
        self.stream.write_all(&packet.payload).await?;
        Ok(())
    }

    /// Releases the underlying stream and framer.
    pub fn into_inner(self) -> (S, PacketFramer) {
        (self.stream, self.framer)
    }
}

/// Performs the authentication handshake against a connected peer.
///
/// Resolves exactly once: with an [`AuthenticatedConnection`] when both
/// handshake steps pass, or with a [`VerifyError`] when either step fails
/// (`MalformedData`, `FailedChallenge`) or the stream closes before
/// completion (`IoError`).
#[instrument(skip_all)]
pub async fn authenticate<S>(
    mut stream: S,
    client_key_pair: KeyPair,
    server_public_key: PublicKey,
) -> std::result::Result<AuthenticatedConnection<S>, VerifyError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framer = PacketFramer::new();
    let mut verifier = Verifier::new(client_key_pair, server_public_key);
    let mut read_buffer = BytesMut::with_capacity(READ_BUFFER_SIZE);

    loop {
        read_buffer.reserve(READ_BUFFER_SIZE);
        let num_read = match stream.read_buf(&mut read_buffer).await {
            Ok(0) | Err(_) => {
                // closed (or broken) before the handshake completed
                return Err(VerifyError {
                    result: VerifyResult::IoError,
                });
            }
            Ok(num_read) => num_read,
        };
        debug!(num_read, "received data");

        if framer.push(read_buffer.split().freeze()).is_err() {
            return fail(&mut stream, VerifyResult::MalformedData).await;
        }

        while let Some(packet) = framer.next_packet() {
            match verifier.process(&packet) {
                Ok(VerifierAction::Respond(response)) => {
                    if stream.write_all(&response).await.is_err() {
                        return Err(VerifyError {
                            result: VerifyResult::IoError,
                        });
                    }
                }
                Ok(VerifierAction::Complete(VerifyResult::Success)) => {
                    debug!("handshake complete");
                    // packets already framed behind the handshake stay
                    // queued for the caller
                    return Ok(AuthenticatedConnection { stream, framer });
                }
                Ok(VerifierAction::Complete(result)) => return fail(&mut stream, result).await,
                Ok(VerifierAction::Ignored) => {}
                Err(error) => {
                    warn!(%error, "handshake aborted by internal failure");
                    return fail(&mut stream, VerifyResult::IoError).await;
                }
            }
        }
    }
}

async fn fail<S>(
    stream: &mut S,
    result: VerifyResult,
) -> std::result::Result<AuthenticatedConnection<S>, VerifyError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // tear the connection down; the peer gets no partial success
    let _ = stream.shutdown().await;
    Err(VerifyError { result })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn verify_error_is_descriptive() {
        let error = VerifyError {
            result: VerifyResult::FailedChallenge,
        };

        assert_eq!("verify failed with failed challenge", error.to_string());
    }

    #[tokio::test]
    async fn closed_stream_rejects_with_io_error() {
        let (client, server) = tokio::io::duplex(1024);
        drop(server);

        let result = authenticate(
            client,
            KeyPair::random().unwrap(),
            *KeyPair::random().unwrap().public_key(),
        )
        .await;

        assert_eq!(
            Some(VerifyResult::IoError),
            result.err().map(|error| error.result)
        );
    }
}
