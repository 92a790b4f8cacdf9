//! Poseidon2 message hashing over Goldilocks
//!
//! Field sequences are absorbed eight elements at a time into a width-12
//! Poseidon2 state (overwrite mode). The digest is the first five state
//! elements serialized little-endian, 40 bytes total.

use crate::field::{FieldElement, FieldSequence};
use once_cell::sync::Lazy;
use p3_field::{PrimeCharacteristicRing, PrimeField64};
use p3_goldilocks::{Goldilocks, Poseidon2Goldilocks};
use p3_symmetric::Permutation;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// Permutation state width
pub const WIDTH: usize = 12;

/// Elements absorbed per permutation
pub const RATE: usize = 8;

/// Elements squeezed into the digest
pub const DIGEST_ELEMENTS: usize = 5;

/// Digest length in bytes
pub const DIGEST_LENGTH: usize = DIGEST_ELEMENTS * 8;

/// Round constant seed
pub const SEED: [u8; 32] = *b"lighter_poseidon2_goldilocks_v1_";

static PERM: Lazy<Poseidon2Goldilocks<WIDTH>> = Lazy::new(|| {
    let mut rng = ChaCha8Rng::from_seed(SEED);
    Poseidon2Goldilocks::<WIDTH>::new_from_rng_128(&mut rng)
});

/// A 40-byte message digest
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LENGTH]);

impl Digest {
    pub fn from_bytes(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    /// Lowercase hex without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hashes an encoded field sequence into a digest
///
/// Implementations must be deterministic: equal sequences give equal digests.
pub trait MessageHasher: Send + Sync {
    fn hash(&self, message: &FieldSequence) -> Digest;
}

/// Poseidon2 sponge over Goldilocks
#[derive(Debug, Clone, Copy, Default)]
pub struct Poseidon2Hasher;

impl Poseidon2Hasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash raw field elements
    pub fn hash_elements(&self, input: &[FieldElement]) -> [FieldElement; DIGEST_ELEMENTS] {
        let mut state = [Goldilocks::ZERO; WIDTH];
        if input.is_empty() {
            state = PERM.permute(state);
        }
        for chunk in input.chunks(RATE) {
            state[..chunk.len()].copy_from_slice(chunk);
            state = PERM.permute(state);
        }

        let mut out = [Goldilocks::ZERO; DIGEST_ELEMENTS];
        out.copy_from_slice(&state[..DIGEST_ELEMENTS]);
        out
    }
}

impl MessageHasher for Poseidon2Hasher {
    fn hash(&self, message: &FieldSequence) -> Digest {
        let out = self.hash_elements(message.as_slice());
        let mut bytes = [0u8; DIGEST_LENGTH];
        for (dst, e) in bytes.chunks_exact_mut(8).zip(out.iter()) {
            dst.copy_from_slice(&e.as_canonical_u64().to_le_bytes());
        }
        Digest(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(values: &[i64]) -> FieldSequence {
        let mut s = FieldSequence::new(304, 14);
        for v in values {
            s.push(*v).unwrap();
        }
        s
    }

    #[test]
    fn test_hash_is_deterministic() {
        let hasher = Poseidon2Hasher::new();
        let a = hasher.hash(&seq(&[1, 2, 3]));
        let b = hasher.hash(&seq(&[1, 2, 3]));
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), DIGEST_LENGTH * 2);
    }

    #[test]
    fn test_hash_is_order_sensitive() {
        let hasher = Poseidon2Hasher::new();
        assert_ne!(hasher.hash(&seq(&[1, 2])), hasher.hash(&seq(&[2, 1])));
    }

    #[test]
    fn test_hash_depends_on_chain_id() {
        let hasher = Poseidon2Hasher::new();
        let mut mainnet = FieldSequence::new(304, 14);
        mainnet.push(7i64).unwrap();
        let mut testnet = FieldSequence::new(300, 14);
        testnet.push(7i64).unwrap();
        assert_ne!(hasher.hash(&mainnet), hasher.hash(&testnet));
    }

    #[test]
    fn test_hash_spans_multiple_blocks() {
        let hasher = Poseidon2Hasher::new();
        let long: Vec<i64> = (0..20).collect();
        let mut changed = long.clone();
        changed[19] = 99;
        assert_ne!(hasher.hash(&seq(&long)), hasher.hash(&seq(&changed)));
    }

    #[test]
    fn test_digest_display_matches_hex() {
        let digest = Digest::from_bytes([0xAB; DIGEST_LENGTH]);
        assert_eq!(digest.to_string(), "ab".repeat(DIGEST_LENGTH));
    }
}
