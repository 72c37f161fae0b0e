//! # Signature Engine
//!
//! Deterministic Ed25519 key derivation, signing, verification, and
//! Diffie–Hellman-style shared-key derivation.
//!
//! Curve and field arithmetic is delegated to `curve25519-dalek`
//! (scalars, point (de)compression, scalar multiplication); hashing is
//! delegated to `sha2` at the 64-byte (SHA-512) and 32-byte (SHA-256)
//! output widths. This module composes those primitives and enforces the
//! protocol's hardening rules:
//!
//! - the S half of every produced signature is validated canonical before
//!   the signature is returned, not just at verify time;
//! - verification rejects non-canonical S values (malleability) and the
//!   all-zero public key (weak-key), and otherwise never errors — a bad
//!   signature is `false`, ordinary control flow.

use crate::error::{ProtocolError, Result};
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::{clamp_integer, Scalar};
use sha2::{Digest, Sha256, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size (in bytes) of a private or public key.
pub const KEY_SIZE: usize = 32;

/// Size (in bytes) of a signature.
pub const SIGNATURE_SIZE: usize = 64;

/// Size (in bytes) of the salt consumed by shared-key derivation.
pub const SALT_SIZE: usize = 32;

/// A peer public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; KEY_SIZE]);

impl PublicKey {
    /// Parses a public key from a hex string.
    pub fn from_hex(hex_string: &str) -> Result<Self> {
        let decoded = hex::decode(hex_string)?;
        let bytes: [u8; KEY_SIZE] = decoded
            .try_into()
            .map_err(|bytes: Vec<u8>| ProtocolError::InvalidPublicKeySize(bytes.len()))?;
        Ok(Self(bytes))
    }

    /// Gets the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// A detached signature: R (32 bytes) followed by S (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_SIZE]);

impl Signature {
    /// Gets the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "Signature({})", hex::encode(self.0))
    }
}

/// A shared secret derived from a private key and a peer public key.
pub type SharedKey = [u8; 32];

/// An Ed25519 key pair derived once from a private key and immutable
/// thereafter. The private key is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    private_key: [u8; KEY_SIZE],
    #[zeroize(skip)]
    public_key: PublicKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key.0))
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Derives a key pair from a raw private key.
    pub fn from_private_key(private_key: [u8; KEY_SIZE]) -> Self {
        let d = expand_private_scalar(&private_key);
        let public_key = PublicKey(EdwardsPoint::mul_base(&d).compress().to_bytes());

        Self {
            private_key,
            public_key,
        }
    }

    /// Derives a key pair from a private key byte slice.
    pub fn from_slice(private_key: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_SIZE] = private_key
            .try_into()
            .map_err(|_| ProtocolError::InvalidPrivateKeySize(private_key.len()))?;
        Ok(Self::from_private_key(bytes))
    }

    /// Derives a key pair from a hex encoded private key string.
    pub fn from_hex(private_key_string: &str) -> Result<Self> {
        let decoded = hex::decode(private_key_string)?;
        Self::from_slice(&decoded)
    }

    /// Creates a key pair from a freshly generated random private key.
    pub fn random() -> Result<Self> {
        Ok(Self::from_private_key(random_array()?))
    }

    /// Gets the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Signs a data buffer.
    ///
    /// Signing is deterministic; the same key and data always produce the
    /// same signature. The S half of the result is validated canonical
    /// before the signature is returned.
    pub fn sign(&self, data: &[u8]) -> Result<Signature> {
        let h: [u8; 64] = Sha512::digest(self.private_key).into();

        let mut scalar_bytes = [0u8; 32];
        scalar_bytes.copy_from_slice(&h[..32]);
        let d = Scalar::from_bytes_mod_order(clamp_integer(scalar_bytes));

        let mut hasher = Sha512::new();
        hasher.update(&h[32..]);
        hasher.update(data);
        let r = Scalar::from_hash(hasher);

        let big_r = EdwardsPoint::mul_base(&r).compress();

        let mut hasher = Sha512::new();
        hasher.update(big_r.as_bytes());
        hasher.update(self.public_key.as_bytes());
        hasher.update(data);
        let hram = Scalar::from_hash(hasher);

        let s = r + hram * d;
        let s_bytes = s.to_bytes();
        if !is_canonical_s(&s_bytes) {
            return Err(ProtocolError::NonCanonicalSignature);
        }

        let mut signature = [0u8; SIGNATURE_SIZE];
        signature[..32].copy_from_slice(big_r.as_bytes());
        signature[32..].copy_from_slice(&s_bytes);
        Ok(Signature(signature))
    }

    /// Derives a shared key usable for message passing with the owner of
    /// `peer_public_key`: `H256(salt XOR pack(d * Q))`.
    ///
    /// Both sides derive the same key from their own private key and the
    /// other side's public key. The salt must be exactly 32 bytes.
    pub fn derive_shared_key(&self, salt: &[u8], peer_public_key: &PublicKey) -> Result<SharedKey> {
        if SALT_SIZE != salt.len() {
            return Err(ProtocolError::InvalidSaltSize(salt.len()));
        }

        let d = expand_private_scalar(&self.private_key);
        let q = CompressedEdwardsY(peer_public_key.0)
            .decompress()
            .ok_or(ProtocolError::InvalidPublicKey)?;
        let packed = (q * d).compress();

        let mut keyed = [0u8; SALT_SIZE];
        for (out, (salt_byte, packed_byte)) in
            keyed.iter_mut().zip(salt.iter().zip(packed.as_bytes()))
        {
            *out = salt_byte ^ packed_byte;
        }

        Ok(Sha256::digest(keyed).into())
    }
}

/// Verifies a signature over a data buffer.
///
/// Returns `false` — never an error — when the signature's S half is not
/// canonical, the public key is all zeros or not a curve point, or the
/// recomputed point does not match.
pub fn verify(public_key: &PublicKey, data: &[u8], signature: &Signature) -> bool {
    let mut s_bytes = [0u8; 32];
    s_bytes.copy_from_slice(&signature.0[32..]);

    // reject the non-canonical representative of an otherwise valid S
    let s: Option<Scalar> = Scalar::from_canonical_bytes(s_bytes).into();
    let s = match s {
        Some(s) => s,
        None => return false,
    };

    if [0u8; KEY_SIZE] == public_key.0 {
        return false;
    }

    let a = match CompressedEdwardsY(public_key.0).decompress() {
        Some(point) => point,
        None => return false,
    };

    let mut hasher = Sha512::new();
    hasher.update(&signature.0[..32]);
    hasher.update(public_key.as_bytes());
    hasher.update(data);
    let hram = Scalar::from_hash(hasher);

    let recomputed_r = EdwardsPoint::vartime_double_scalar_mul_basepoint(&hram, &(-a), &s);
    recomputed_r.compress().as_bytes()[..] == signature.0[..32]
}

fn expand_private_scalar(private_key: &[u8; KEY_SIZE]) -> Scalar {
    let h: [u8; 64] = Sha512::digest(private_key).into();
    let mut scalar_bytes = [0u8; 32];
    scalar_bytes.copy_from_slice(&h[..32]);
    Scalar::from_bytes_mod_order(clamp_integer(scalar_bytes))
}

fn is_canonical_s(s_bytes: &[u8; 32]) -> bool {
    Option::<Scalar>::from(Scalar::from_canonical_bytes(*s_bytes)).is_some()
}

/// Fills a fixed-size array from the operating system RNG.
pub(crate) fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::fill(&mut bytes).map_err(|e| ProtocolError::Random(e.to_string()))?;
    Ok(bytes)
}
