//! # Peer Protocol
//!
//! Peer protocol core for blockchain node services.
//!
//! This crate implements the three pillars a node SDK needs before it can
//! talk to a peer:
//!
//! - **Packet framing** — turning an arbitrarily-chunked byte stream into
//!   discrete length-prefixed packets ([`core`]).
//! - **Verification handshake** — a challenge-response mutual-authentication
//!   exchange built on Ed25519 signatures ([`crypto`], [`protocol`]).
//! - **Entity codecs** — byte-exact (de)serialization of blocks and
//!   transactions, including recursively-nested aggregate transactions,
//!   through a type-dispatched codec registry ([`model`]).
//!
//! ## Example
//!
//! ```no_run
//! use peer_protocol::config::PeerConfig;
//! use peer_protocol::protocol::auth::authenticate;
//! use tokio::net::TcpStream;
//!
//! # async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PeerConfig::from_file("peer.toml")?;
//! let stream = TcpStream::connect(&config.endpoint).await?;
//!
//! let mut connection = authenticate(
//!     stream,
//!     config.client_key_pair()?,
//!     config.server_public_key()?,
//! )
//! .await?;
//!
//! let packet = connection.next_packet().await?;
//! println!("first packet type: {}", packet.packet_type);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! All parsing and encoding is synchronous CPU work; the handshake future is
//! the only async surface. Nothing here buffers with bounds or imposes
//! timeouts — callers own backpressure and deadline policy. A built
//! [`model::registry::ModelCodec`] is immutable and cheap to share across
//! connections.

pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod model;
pub mod protocol;

pub use crate::core::framer::PacketFramer;
pub use crate::core::packet::{PacketType, RawPacket};
pub use crate::crypto::{KeyPair, PublicKey, Signature};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::auth::{authenticate, AuthenticatedConnection, VerifyError};
pub use crate::protocol::verifier::VerifyResult;
