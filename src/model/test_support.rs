//! Shared fixtures for codec tests.

use crate::core::parser::BinaryReader;
use crate::core::serializer::Serializer;
use crate::crypto::{PublicKey, Signature};
use crate::error::{ProtocolError, Result};
use crate::model::registry::{DeserializeContext, SerializeContext, TransactionCodec};
use crate::model::{
    Block, Cosignature, EmbeddedTransaction, EntityHeader, Transaction, TransactionBody,
};
use bytes::Bytes;

/// Test codec whose type-specific fields are a fixed-size opaque run.
pub(crate) struct FixedSizeBodyCodec {
    pub body_size: usize,
}

impl TransactionCodec for FixedSizeBodyCodec {
    fn deserialize(
        &self,
        reader: &mut BinaryReader,
        _context: &DeserializeContext<'_>,
    ) -> Result<TransactionBody> {
        Ok(TransactionBody::Raw(
            reader.read_buffer(self.body_size)?.to_vec(),
        ))
    }

    fn serialize(
        &self,
        body: &TransactionBody,
        serializer: &mut dyn Serializer,
        _context: &SerializeContext<'_>,
    ) -> Result<()> {
        match body {
            TransactionBody::Raw(bytes) => serializer.write_bytes(bytes),
            _ => Err(ProtocolError::BodyTypeMismatch),
        }
    }
}

pub(crate) fn reader_over(buffer: &[u8]) -> BinaryReader {
    let mut reader = BinaryReader::new();
    reader.push(Bytes::copy_from_slice(buffer));
    reader
}

pub(crate) fn sample_header(entity_type: u16) -> EntityHeader {
    EntityHeader {
        signature: Signature([0x11; 64]),
        signer: PublicKey([0x22; 32]),
        version: 3,
        entity_type,
    }
}

pub(crate) fn sample_transaction(entity_type: u16, body: &[u8]) -> Transaction {
    Transaction {
        header: sample_header(entity_type),
        max_fee: 0x0706_0504_0302_0100,
        deadline: 0x0F0E_0D0C_0B0A_0908,
        body: TransactionBody::Raw(body.to_vec()),
    }
}

pub(crate) fn sample_block(entity_type: u16, transactions: Vec<Transaction>) -> Block {
    Block {
        header: sample_header(entity_type),
        height: 1234,
        timestamp: 5678,
        difficulty: 9876,
        previous_block_hash: [0x33; 32],
        transactions_hash: [0x44; 32],
        transactions,
    }
}

pub(crate) fn sample_embedded(entity_type: u16, body: &[u8]) -> EmbeddedTransaction {
    EmbeddedTransaction {
        signer: PublicKey([0x55; 32]),
        version: 2,
        entity_type,
        body: TransactionBody::Raw(body.to_vec()),
    }
}

pub(crate) fn sample_cosignature(fill: u8) -> Cosignature {
    Cosignature {
        signer: PublicKey([fill; 32]),
        signature: Signature([fill.wrapping_add(1); 64]),
    }
}
