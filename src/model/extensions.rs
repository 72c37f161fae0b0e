//! # Transaction Extensions
//!
//! Hashing and signing helpers layered on top of a [`ModelCodec`].
//!
//! The signable portion of a transaction is its serialized form with the
//! fixed prefix — size field, signature, and signer — stripped off; the
//! signature therefore covers version, type, fee, deadline, and all
//! type-specific fields. The transaction hash additionally mixes in the
//! signature's R half and the signer so two identical payloads from
//! different signers never collide.

use crate::crypto::{self, KeyPair};
use crate::error::Result;
use crate::model::registry::ModelCodec;
use crate::model::{sizes, Hash256, Transaction};
use sha2::{Digest, Sha256};

// size field + signature + signer
const SIGNING_DATA_OFFSET: usize = 4 + sizes::SIGNATURE + sizes::SIGNER;

/// Signs a transaction, replacing its signature in place.
pub fn sign_transaction(
    codec: &ModelCodec,
    key_pair: &KeyPair,
    transaction: &mut Transaction,
) -> Result<()> {
    let buffer = codec.serialize_transaction_to_buffer(transaction)?;
    transaction.header.signature = key_pair.sign(&buffer[SIGNING_DATA_OFFSET..])?;
    Ok(())
}

/// Verifies the signature of a transaction.
///
/// Returns `false` for a bad signature *and* for a transaction that cannot
/// be serialized — an unserializable transaction has no signable form.
pub fn verify_transaction(codec: &ModelCodec, transaction: &Transaction) -> bool {
    match codec.serialize_transaction_to_buffer(transaction) {
        Ok(buffer) => crypto::verify(
            &transaction.header.signer,
            &buffer[SIGNING_DATA_OFFSET..],
            &transaction.header.signature,
        ),
        Err(_) => false,
    }
}

/// Calculates the hash of a transaction.
pub fn hash_transaction(codec: &ModelCodec, transaction: &Transaction) -> Result<Hash256> {
    let buffer = codec.serialize_transaction_to_buffer(transaction)?;

    let mut hasher = Sha256::new();
    hasher.update(&transaction.header.signature.as_bytes()[..32]);
    hasher.update(transaction.header.signer.as_bytes());
    hasher.update(&buffer[SIGNING_DATA_OFFSET..]);
    Ok(hasher.finalize().into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::registry::CodecBuilder;
    use crate::model::test_support::{reader_over, sample_transaction, FixedSizeBodyCodec};
    use crate::model::{Entity, TransactionBody};
    use std::sync::Arc;

    const TEST_TYPE: u16 = 0x1234;

    fn codec() -> ModelCodec {
        let mut builder = CodecBuilder::new();
        builder
            .add_transaction_support(TEST_TYPE, Arc::new(FixedSizeBodyCodec { body_size: 8 }))
            .unwrap();
        builder.build()
    }

    #[test]
    fn signed_transaction_verifies() {
        let codec = codec();
        let key_pair = KeyPair::random().unwrap();
        let mut transaction = sample_transaction(TEST_TYPE, &[1, 2, 3, 4, 5, 6, 7, 8]);
        transaction.header.signer = *key_pair.public_key();

        sign_transaction(&codec, &key_pair, &mut transaction).unwrap();

        assert!(verify_transaction(&codec, &transaction));
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let codec = codec();
        let key_pair = KeyPair::random().unwrap();
        let mut transaction = sample_transaction(TEST_TYPE, &[1, 2, 3, 4, 5, 6, 7, 8]);
        transaction.header.signer = *key_pair.public_key();
        sign_transaction(&codec, &key_pair, &mut transaction).unwrap();

        transaction.body = TransactionBody::Raw(vec![9, 9, 9, 9, 9, 9, 9, 9]);

        assert!(!verify_transaction(&codec, &transaction));
    }

    #[test]
    fn signature_survives_a_wire_roundtrip() {
        let codec = codec();
        let key_pair = KeyPair::random().unwrap();
        let mut transaction = sample_transaction(TEST_TYPE, &[8, 7, 6, 5, 4, 3, 2, 1]);
        transaction.header.signer = *key_pair.public_key();
        sign_transaction(&codec, &key_pair, &mut transaction).unwrap();

        let buffer = codec
            .serialize_to_buffer(&Entity::Transaction(transaction))
            .unwrap();
        let decoded = codec.deserialize(&mut reader_over(&buffer)).unwrap();

        match decoded {
            Entity::Transaction(decoded) => assert!(verify_transaction(&codec, &decoded)),
            other => panic!("expected transaction, got {other:?}"),
        }
    }

    #[test]
    fn hash_is_deterministic_and_payload_sensitive() {
        let codec = codec();
        let first = sample_transaction(TEST_TYPE, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut second = first.clone();

        assert_eq!(
            hash_transaction(&codec, &first).unwrap(),
            hash_transaction(&codec, &second).unwrap()
        );

        second.body = TransactionBody::Raw(vec![0; 8]);
        assert_ne!(
            hash_transaction(&codec, &first).unwrap(),
            hash_transaction(&codec, &second).unwrap()
        );
    }

    #[test]
    fn hash_is_signer_sensitive() {
        let codec = codec();
        let first = sample_transaction(TEST_TYPE, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut second = first.clone();
        second.header.signer = *KeyPair::random().unwrap().public_key();

        assert_ne!(
            hash_transaction(&codec, &first).unwrap(),
            hash_transaction(&codec, &second).unwrap()
        );
    }
}
