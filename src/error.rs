//! # Error Types
//!
//! Error handling for the peer protocol core.
//!
//! This module defines all error variants that can occur during protocol
//! operations, from low-level buffer exhaustion to high-level codec failures.
//!
//! ## Error Categories
//! - **I/O Errors**: Failures on the underlying byte stream
//! - **Buffer Errors**: Reads past buffered data, writes past a fixed buffer
//! - **Packet Errors**: Malformed packet headers
//! - **Cryptographic Errors**: Malformed key material, signing failures
//! - **Codec Errors**: Registry misuse and malformed entity payloads
//!
//! All errors implement `std::error::Error` for interoperability. Note that
//! *signature verification failure* is not an error anywhere in this crate —
//! verification degrades to `false` and callers treat it as control flow.

use std::io;
use thiserror::Error;

/// Primary error type for all protocol operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A read was requested beyond the bytes currently buffered by a reader.
    #[error("insufficient unprocessed data ({required} bytes required, {available} bytes available)")]
    InsufficientData {
        /// Bytes the read required.
        required: usize,
        /// Bytes that were available.
        available: usize,
    },

    /// A write would overflow a fixed-size output buffer.
    #[error("insufficient buffer space left ({required} bytes required, {available} bytes available)")]
    InsufficientBufferSpace {
        /// Bytes the write required.
        required: usize,
        /// Bytes that were available.
        available: usize,
    },

    /// A writer was constructed with a zero target size.
    #[error("binary writer requires a buffer size greater than zero")]
    ZeroBufferSize,

    /// A packet header declared a total size smaller than the header itself.
    #[error("packet size ({0}) cannot be less than packet header size")]
    PacketSizeTooSmall(u32),

    #[error("private key has unexpected size: {0}")]
    InvalidPrivateKeySize(usize),

    #[error("public key has unexpected size: {0}")]
    InvalidPublicKeySize(usize),

    #[error("salt has unexpected size: {0}")]
    InvalidSaltSize(usize),

    /// The peer public key does not decode to a curve point.
    #[error("public key is not a valid curve point")]
    InvalidPublicKey,

    /// Signing produced a non-canonical scalar. This indicates a broken
    /// curve-arithmetic backend and should never occur in practice.
    #[error("generated signature has a non-canonical S part")]
    NonCanonicalSignature,

    #[error("invalid hex input: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("random generation failed: {0}")]
    Random(String),

    #[error("no codec registered for entity type {0}")]
    UnknownEntityType(u16),

    #[error("codec already registered for entity type {0}")]
    CodecAlreadyRegistered(u16),

    /// A declared transaction size is too small to contain the fixed
    /// transaction header.
    #[error("transaction size ({0}) cannot be less than transaction header size")]
    TransactionSizeTooSmall(u32),

    /// The entity body handed to a codec does not match the codec's type.
    #[error("entity body does not match the registered codec")]
    BodyTypeMismatch,

    #[error("aggregate must contain complete aggregate header")]
    IncompleteAggregateHeader,

    #[error("aggregate must contain complete payload")]
    IncompleteAggregatePayload,

    #[error("sub transaction must contain complete transaction header")]
    IncompleteSubTransaction,

    #[error("aggregate cannot have partial cosignatures")]
    PartialCosignatures,

    /// An aggregate was (de)serialized without a sub-transaction codec table.
    /// This is what rejects an aggregate nested inside another aggregate.
    #[error("aggregate transaction is not embeddable")]
    AggregateNotEmbeddable,

    #[error("unsupported transaction type ({0}) in aggregate")]
    UnsupportedSubTransaction(u16),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Type alias for Results using ProtocolError.
pub type Result<T> = std::result::Result<T, ProtocolError>;
