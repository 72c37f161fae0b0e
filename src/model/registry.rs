//! # Codec Registry
//!
//! A type-dispatch table over the binary primitives supporting recursive
//! block/transaction/aggregate (de)serialization.
//!
//! Ordinary transactions resolve to the codec chain
//! `[entity header, transaction header, type-specific codec]`; blocks resolve
//! to `[entity header, block header]` and instead append a trailing list of
//! size-prefixed transactions. Serialization is two-pass: the chain runs once
//! against a [`SizeCalculator`] to compute the exact size, which is written
//! first, then runs again against the real sink.
//!
//! The registry is built once via [`CodecBuilder`], then immutable and
//! cheaply shareable across connections.

use crate::core::parser::BinaryReader;
use crate::core::serializer::{BinaryWriter, Serializer, SizeCalculator};
use crate::crypto::{PublicKey, Signature};
use crate::error::{ProtocolError, Result};
use crate::model::{
    entity_type::is_block_type, sizes, Block, Entity, EntityHeader, Transaction, TransactionBody,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Registered type-specific transaction codecs, keyed by entity type.
pub type CodecTable = HashMap<u16, Arc<dyn TransactionCodec>>;

/// Context handed to a codec during deserialization.
pub struct DeserializeContext<'a> {
    /// Declared total size of the enclosing entity, including its size field.
    pub entity_size: u32,

    /// Sub-transaction codec table; `None` when decoding an embedded
    /// transaction (aggregates refuse to operate without it).
    pub tx_codecs: Option<&'a CodecTable>,
}

/// Context handed to a codec during serialization.
pub struct SerializeContext<'a> {
    /// Sub-transaction codec table; `None` when encoding an embedded
    /// transaction.
    pub tx_codecs: Option<&'a CodecTable>,
}

/// A paired serialize/deserialize strategy for one transaction type's
/// type-specific fields.
pub trait TransactionCodec: Send + Sync {
    /// Reads the type-specific fields of a transaction.
    fn deserialize(
        &self,
        reader: &mut BinaryReader,
        context: &DeserializeContext<'_>,
    ) -> Result<TransactionBody>;

    /// Writes the type-specific fields of a transaction.
    fn serialize(
        &self,
        body: &TransactionBody,
        serializer: &mut dyn Serializer,
        context: &SerializeContext<'_>,
    ) -> Result<()>;
}

/// Builder for a [`ModelCodec`].
#[derive(Default)]
pub struct CodecBuilder {
    codecs: CodecTable,
}

impl CodecBuilder {
    /// Creates a codec builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds support for a typed transaction.
    ///
    /// Fails if the type is already registered or falls in the reserved
    /// block range — block types never require per-type registration.
    pub fn add_transaction_support(
        &mut self,
        entity_type: u16,
        codec: Arc<dyn TransactionCodec>,
    ) -> Result<()> {
        if is_block_type(entity_type) || self.codecs.contains_key(&entity_type) {
            return Err(ProtocolError::CodecAlreadyRegistered(entity_type));
        }

        self.codecs.insert(entity_type, codec);
        Ok(())
    }

    /// Builds the model codec.
    pub fn build(self) -> ModelCodec {
        ModelCodec {
            codecs: Arc::new(self.codecs),
        }
    }
}

/// Type-dispatched codec for verifiable entities (blocks and transactions).
#[derive(Clone)]
pub struct ModelCodec {
    codecs: Arc<CodecTable>,
}

impl ModelCodec {
    /// Returns true if entities of `entity_type` can be (de)serialized.
    pub fn supports(&self, entity_type: u16) -> bool {
        is_block_type(entity_type) || self.codecs.contains_key(&entity_type)
    }

    /// Deserializes an entity from its wire representation.
    pub fn deserialize(&self, reader: &mut BinaryReader) -> Result<Entity> {
        let size = reader.read_u32()?;
        let header = deserialize_entity_header(reader)?;

        if is_block_type(header.entity_type) {
            Ok(Entity::Block(self.deserialize_block(reader, size, header)?))
        } else {
            Ok(Entity::Transaction(self.deserialize_transaction(
                reader, size, header,
            )?))
        }
    }

    fn deserialize_transaction(
        &self,
        reader: &mut BinaryReader,
        size: u32,
        header: EntityHeader,
    ) -> Result<Transaction> {
        let entity_type = header.entity_type;
        let codec = self
            .codecs
            .get(&entity_type)
            .ok_or(ProtocolError::UnknownEntityType(entity_type))?;

        let max_fee = reader.read_u64()?;
        let deadline = reader.read_u64()?;
        let body = codec.deserialize(
            reader,
            &DeserializeContext {
                entity_size: size,
                tx_codecs: Some(&self.codecs),
            },
        )?;

        Ok(Transaction {
            header,
            max_fee,
            deadline,
            body,
        })
    }

    fn deserialize_block(
        &self,
        reader: &mut BinaryReader,
        size: u32,
        header: EntityHeader,
    ) -> Result<Block> {
        let height = reader.read_u64()?;
        let timestamp = reader.read_u64()?;
        let difficulty = reader.read_u64()?;
        let previous_block_hash = read_array::<{ sizes::HASH256 }>(reader)?;
        let transactions_hash = read_array::<{ sizes::HASH256 }>(reader)?;

        // the remainder of the declared size is a sequence of size-prefixed
        // transactions
        let mut transactions = Vec::new();
        let mut remaining = u64::from(size).saturating_sub(u64::from(sizes::BLOCK_HEADER));
        while 0 < remaining {
            let sub_size = reader.read_u32()?;
            if sub_size < sizes::TRANSACTION_HEADER {
                return Err(ProtocolError::TransactionSizeTooSmall(sub_size));
            }

            let sub_header = deserialize_entity_header(reader)?;
            if self.codecs.contains_key(&sub_header.entity_type) {
                transactions.push(self.deserialize_transaction(reader, sub_size, sub_header)?);
            } else {
                // forward compatibility: skip an unregistered transaction by
                // its declared size
                let consumed = 4 + sizes::SIGNATURE as u32 + sizes::SIGNER as u32 + 4;
                reader.read_buffer((sub_size - consumed) as usize)?;
            }

            remaining = remaining.saturating_sub(u64::from(sub_size));
        }

        Ok(Block {
            header,
            height,
            timestamp,
            difficulty,
            previous_block_hash,
            transactions_hash,
            transactions,
        })
    }

    /// Serializes an entity, writing its computed size first.
    pub fn serialize(&self, entity: &Entity, serializer: &mut dyn Serializer) -> Result<()> {
        match entity {
            Entity::Transaction(transaction) => self.serialize_transaction(transaction, serializer),
            Entity::Block(block) => self.serialize_block(block, serializer),
        }
    }

    /// Serializes an entity into an exactly-sized buffer.
    pub fn serialize_to_buffer(&self, entity: &Entity) -> Result<Vec<u8>> {
        let mut calculator = SizeCalculator::new();
        self.serialize(entity, &mut calculator)?;

        let mut writer = BinaryWriter::new(calculator.size())?;
        self.serialize(entity, &mut writer)?;
        Ok(writer.into_buffer())
    }

    /// Serializes a single transaction (with its size prefix) into an
    /// exactly-sized buffer.
    pub fn serialize_transaction_to_buffer(&self, transaction: &Transaction) -> Result<Vec<u8>> {
        let mut calculator = SizeCalculator::new();
        self.serialize_transaction(transaction, &mut calculator)?;

        let mut writer = BinaryWriter::new(calculator.size())?;
        self.serialize_transaction(transaction, &mut writer)?;
        Ok(writer.into_buffer())
    }

    fn serialize_transaction(
        &self,
        transaction: &Transaction,
        serializer: &mut dyn Serializer,
    ) -> Result<()> {
        let mut calculator = SizeCalculator::new();
        self.serialize_transaction_fields(transaction, &mut calculator)?;

        // include the size of the size field itself
        serializer.write_u32(calculator.size() as u32 + 4)?;
        self.serialize_transaction_fields(transaction, serializer)
    }

    fn serialize_transaction_fields(
        &self,
        transaction: &Transaction,
        serializer: &mut dyn Serializer,
    ) -> Result<()> {
        let entity_type = transaction.header.entity_type;
        let codec = self
            .codecs
            .get(&entity_type)
            .ok_or(ProtocolError::UnknownEntityType(entity_type))?;

        serialize_entity_header(&transaction.header, serializer)?;
        serializer.write_u64(transaction.max_fee)?;
        serializer.write_u64(transaction.deadline)?;
        codec.serialize(
            &transaction.body,
            serializer,
            &SerializeContext {
                tx_codecs: Some(&self.codecs),
            },
        )
    }

    fn serialize_block(&self, block: &Block, serializer: &mut dyn Serializer) -> Result<()> {
        let mut calculator = SizeCalculator::new();
        self.serialize_block_fields(block, &mut calculator)?;

        serializer.write_u32(calculator.size() as u32 + 4)?;
        self.serialize_block_fields(block, serializer)
    }

    fn serialize_block_fields(
        &self,
        block: &Block,
        serializer: &mut dyn Serializer,
    ) -> Result<()> {
        serialize_entity_header(&block.header, serializer)?;
        serializer.write_u64(block.height)?;
        serializer.write_u64(block.timestamp)?;
        serializer.write_u64(block.difficulty)?;
        serializer.write_bytes(&block.previous_block_hash)?;
        serializer.write_bytes(&block.transactions_hash)?;

        for transaction in &block.transactions {
            self.serialize_transaction(transaction, serializer)?;
        }

        Ok(())
    }
}

pub(crate) fn deserialize_entity_header(reader: &mut BinaryReader) -> Result<EntityHeader> {
    let signature = Signature(read_array::<{ sizes::SIGNATURE }>(reader)?);
    let signer = PublicKey(read_array::<{ sizes::SIGNER }>(reader)?);
    let version = reader.read_u16()?;
    let entity_type = reader.read_u16()?;

    Ok(EntityHeader {
        signature,
        signer,
        version,
        entity_type,
    })
}

pub(crate) fn serialize_entity_header(
    header: &EntityHeader,
    serializer: &mut dyn Serializer,
) -> Result<()> {
    serializer.write_bytes(header.signature.as_bytes())?;
    serializer.write_bytes(header.signer.as_bytes())?;
    serializer.write_u16(header.version)?;
    serializer.write_u16(header.entity_type)
}

pub(crate) fn read_array<const N: usize>(reader: &mut BinaryReader) -> Result<[u8; N]> {
    let buffer = reader.read_buffer(N)?;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&buffer);
    Ok(bytes)
}
