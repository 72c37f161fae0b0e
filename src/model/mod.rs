//! # Entity Model & Binary Codecs
//!
//! Typed representations of the signed records exchanged between peers —
//! blocks and transactions, including aggregate transactions with embedded
//! sub-transactions — together with the codec registry that (de)serializes
//! them to the exact wire format.
//!
//! ## Wire Format
//! ```text
//! transaction: [Size(4)] [Signature(64)] [Signer(32)] [Version(2)] [Type(2)]
//!              [MaxFee(8)] [Deadline(8)] [type-specific fields]
//! block:       [Size(4)] [Signature(64)] [Signer(32)] [Version(2)] [Type(2)]
//!              [Height(8)] [Timestamp(8)] [Difficulty(8)]
//!              [PreviousBlockHash(32)] [TransactionsHash(32)]
//!              [size-prefixed transactions ...]
//! ```
//! All integers are little-endian.

pub mod aggregate;
pub mod extensions;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

use crate::crypto::{PublicKey, Signature};

/// A 256-bit hash.
pub type Hash256 = [u8; 32];

/// Well-known entity type values.
///
/// The wire carries an open `u16`; these are the values assigned by the
/// protocol. Additional transaction types are registered by plugin codecs.
pub mod entity_type {
    /// Transfer transaction.
    pub const TRANSFER: u16 = 0x4154;

    /// Register namespace transaction.
    pub const REGISTER_NAMESPACE: u16 = 0x414E;

    /// Modify multisig account transaction.
    pub const MODIFY_MULTISIG_ACCOUNT: u16 = 0x4155;

    /// Aggregate complete transaction.
    pub const AGGREGATE_COMPLETE: u16 = 0x4141;

    /// Aggregate bonded transaction.
    pub const AGGREGATE_BONDED: u16 = 0x4241;

    /// Hash lock transaction.
    pub const HASH_LOCK: u16 = 0x4148;

    /// Secret lock transaction.
    pub const SECRET_LOCK: u16 = 0x4152;

    /// Secret proof transaction.
    pub const SECRET_PROOF: u16 = 0x4252;

    /// Returns true if `entity_type` falls in the reserved block range
    /// (top bit set).
    pub fn is_block_type(entity_type: u16) -> bool {
        0 != (0x8000 & entity_type)
    }
}

/// Fixed sizes (in bytes) of wire structures.
pub mod sizes {
    /// Size of a signature.
    pub const SIGNATURE: usize = 64;

    /// Size of a signer public key.
    pub const SIGNER: usize = 32;

    /// Size of a 256-bit hash.
    pub const HASH256: usize = 32;

    /// Size of a transaction header: size, signature, signer, version,
    /// type, max fee, deadline.
    pub const TRANSACTION_HEADER: u32 = 4 + 64 + 32 + 2 + 2 + 8 + 8;

    /// Size of a block header: size, signature, signer, version, type,
    /// height, timestamp, difficulty, previous block hash, transactions
    /// hash.
    pub const BLOCK_HEADER: u32 = 4 + 64 + 32 + 2 + 2 + 8 + 8 + 8 + 32 + 32;

    /// Size of an embedded transaction header: size, signer, version, type.
    pub const EMBEDDED_HEADER: u32 = 4 + 32 + 2 + 2;

    /// Size of an aggregate header: transaction header plus the payload
    /// size field.
    pub const AGGREGATE_HEADER: u32 = TRANSACTION_HEADER + 4;

    /// Size of a cosignature: signer plus signature.
    pub const COSIGNATURE: u32 = 32 + 64;
}

/// Common header shared by every verifiable entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityHeader {
    /// Entity signature.
    pub signature: Signature,

    /// Public key of the signer.
    pub signer: PublicKey,

    /// Entity version.
    pub version: u16,

    /// Entity type.
    pub entity_type: u16,
}

/// Type-specific transaction payload.
///
/// Aggregates are decoded structurally by this crate; all other registered
/// codecs exchange their type-specific fields as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionBody {
    /// An aggregate payload of embedded sub-transactions and cosignatures.
    Aggregate(AggregateBody),

    /// Opaque type-specific fields owned by a plugin codec.
    Raw(Vec<u8>),
}

/// A signed top-level transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Common entity header.
    pub header: EntityHeader,

    /// Maximum fee the signer is willing to pay.
    pub max_fee: u64,

    /// Deadline after which the transaction expires.
    pub deadline: u64,

    /// Type-specific payload.
    pub body: TransactionBody,
}

/// A signed block with its embedded transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Common entity header.
    pub header: EntityHeader,

    /// Block height.
    pub height: u64,

    /// Block timestamp.
    pub timestamp: u64,

    /// Block difficulty.
    pub difficulty: u64,

    /// Hash of the previous block.
    pub previous_block_hash: Hash256,

    /// Merkle hash of the block's transactions.
    pub transactions_hash: Hash256,

    /// Transactions carried by the block. Transactions of unregistered
    /// types are skipped during decoding and do not appear here.
    pub transactions: Vec<Transaction>,
}

/// A decoded verifiable entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// A top-level transaction.
    Transaction(Transaction),

    /// A block.
    Block(Block),
}

impl Entity {
    /// Gets the entity type.
    pub fn entity_type(&self) -> u16 {
        match self {
            Entity::Transaction(transaction) => transaction.header.entity_type,
            Entity::Block(block) => block.header.entity_type,
        }
    }
}

/// A sub-transaction embedded in an aggregate: it shares the signer,
/// version and type fields of a top-level transaction but carries no
/// signature and no fee/deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedTransaction {
    /// Public key of the signer.
    pub signer: PublicKey,

    /// Entity version.
    pub version: u16,

    /// Entity type.
    pub entity_type: u16,

    /// Type-specific payload.
    pub body: TransactionBody,
}

/// An additional attestation over an aggregate transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cosignature {
    /// Public key of the cosigner.
    pub signer: PublicKey,

    /// Signature of the cosigner.
    pub signature: Signature,
}

/// Payload of an aggregate transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregateBody {
    /// Embedded sub-transactions, in wire order.
    pub transactions: Vec<EmbeddedTransaction>,

    /// Cosignatures attached after the sub-transaction payload.
    pub cosignatures: Vec<Cosignature>,
}
