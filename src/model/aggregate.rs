//! # Aggregate Transaction Codec
//!
//! (De)serializes aggregate transactions: a declared-size-bounded run of
//! embedded sub-transactions followed by a flat array of fixed-size
//! cosignatures.
//!
//! Embedded sub-transactions share the signer/version/type fields of a
//! top-level transaction but carry no signature and no fee/deadline. The
//! sub-transaction loop is bounded by the declared payload-size *byte count*,
//! not an item count, and every sub-transaction must be at least the embedded
//! header size. Whatever bytes remain after the payload must be an exact
//! multiple of the cosignature size or the whole aggregate is rejected.
//!
//! The codec refuses to operate without an explicit sub-transaction codec
//! table; because it never forwards that table to the codecs it dispatches
//! to, an aggregate nested inside another aggregate fails with
//! "aggregate transaction is not embeddable".

use crate::core::parser::BinaryReader;
use crate::core::serializer::{Serializer, SizeCalculator};
use crate::crypto::{PublicKey, Signature};
use crate::error::{ProtocolError, Result};
use crate::model::registry::{
    read_array, CodecBuilder, CodecTable, DeserializeContext, SerializeContext, TransactionCodec,
};
use crate::model::{entity_type, sizes, AggregateBody, Cosignature, EmbeddedTransaction, TransactionBody};
use std::sync::Arc;

/// Codec for aggregate transaction payloads.
pub struct AggregateTransactionCodec;

impl TransactionCodec for AggregateTransactionCodec {
    fn deserialize(
        &self,
        reader: &mut BinaryReader,
        context: &DeserializeContext<'_>,
    ) -> Result<TransactionBody> {
        let tx_codecs = context
            .tx_codecs
            .ok_or(ProtocolError::AggregateNotEmbeddable)?;

        if context.entity_size < sizes::AGGREGATE_HEADER {
            return Err(ProtocolError::IncompleteAggregateHeader);
        }

        let payload_size = reader.read_u32()?;
        if u64::from(context.entity_size)
            < u64::from(payload_size) + u64::from(sizes::AGGREGATE_HEADER)
        {
            return Err(ProtocolError::IncompleteAggregatePayload);
        }

        let mut transactions = Vec::new();
        let mut processed_size = 0u64;
        while processed_size < u64::from(payload_size) {
            let sub_size = reader.read_u32()?;
            if sub_size < sizes::EMBEDDED_HEADER {
                return Err(ProtocolError::IncompleteSubTransaction);
            }

            let signer = PublicKey(read_array::<{ sizes::SIGNER }>(reader)?);
            let version = reader.read_u16()?;
            let sub_type = reader.read_u16()?;

            // unlike the block case, don't fall back to skipping unknown
            // sub-transaction types
            let codec = tx_codecs
                .get(&sub_type)
                .ok_or(ProtocolError::UnsupportedSubTransaction(sub_type))?;
            let body = codec.deserialize(
                reader,
                &DeserializeContext {
                    entity_size: sub_size,
                    tx_codecs: None,
                },
            )?;

            transactions.push(EmbeddedTransaction {
                signer,
                version,
                entity_type: sub_type,
                body,
            });
            processed_size += u64::from(sub_size);
        }

        let remaining = context.entity_size - sizes::AGGREGATE_HEADER - payload_size;
        if 0 != remaining % sizes::COSIGNATURE {
            return Err(ProtocolError::PartialCosignatures);
        }

        let mut cosignatures = Vec::new();
        for _ in 0..remaining / sizes::COSIGNATURE {
            let signer = PublicKey(read_array::<{ sizes::SIGNER }>(reader)?);
            let signature = Signature(read_array::<{ sizes::SIGNATURE }>(reader)?);
            cosignatures.push(Cosignature { signer, signature });
        }

        Ok(TransactionBody::Aggregate(AggregateBody {
            transactions,
            cosignatures,
        }))
    }

    fn serialize(
        &self,
        body: &TransactionBody,
        serializer: &mut dyn Serializer,
        context: &SerializeContext<'_>,
    ) -> Result<()> {
        let tx_codecs = context
            .tx_codecs
            .ok_or(ProtocolError::AggregateNotEmbeddable)?;
        let aggregate = match body {
            TransactionBody::Aggregate(aggregate) => aggregate,
            _ => return Err(ProtocolError::BodyTypeMismatch),
        };

        let mut sub_sizes = Vec::with_capacity(aggregate.transactions.len());
        let mut payload_size = 0u32;
        for transaction in &aggregate.transactions {
            let sub_size = embedded_transaction_size(transaction, tx_codecs)?;
            payload_size += sub_size;
            sub_sizes.push(sub_size);
        }

        serializer.write_u32(payload_size)?;

        for (transaction, sub_size) in aggregate.transactions.iter().zip(&sub_sizes) {
            serializer.write_u32(*sub_size)?;
            serialize_embedded_fields(transaction, serializer, tx_codecs)?;
        }

        for cosignature in &aggregate.cosignatures {
            serializer.write_bytes(cosignature.signer.as_bytes())?;
            serializer.write_bytes(cosignature.signature.as_bytes())?;
        }

        Ok(())
    }
}

fn serialize_embedded_fields(
    transaction: &EmbeddedTransaction,
    serializer: &mut dyn Serializer,
    tx_codecs: &CodecTable,
) -> Result<()> {
    let codec = tx_codecs
        .get(&transaction.entity_type)
        .ok_or(ProtocolError::UnsupportedSubTransaction(transaction.entity_type))?;

    serializer.write_bytes(transaction.signer.as_bytes())?;
    serializer.write_u16(transaction.version)?;
    serializer.write_u16(transaction.entity_type)?;
    codec.serialize(
        &transaction.body,
        serializer,
        &SerializeContext { tx_codecs: None },
    )
}

fn embedded_transaction_size(
    transaction: &EmbeddedTransaction,
    tx_codecs: &CodecTable,
) -> Result<u32> {
    let mut calculator = SizeCalculator::new();
    serialize_embedded_fields(transaction, &mut calculator, tx_codecs)?;

    // include the size of the size field itself
    Ok(calculator.size() as u32 + 4)
}

/// Registers the aggregate codec for both aggregate entity types.
pub fn register_aggregate_transaction_support(builder: &mut CodecBuilder) -> Result<()> {
    let codec = Arc::new(AggregateTransactionCodec);
    builder.add_transaction_support(entity_type::AGGREGATE_COMPLETE, codec.clone())?;
    builder.add_transaction_support(entity_type::AGGREGATE_BONDED, codec)?;
    Ok(())
}
