//! Field encoding of transaction values
//!
//! Transaction fields are hashed as Goldilocks elements (p = 2^64 - 2^32 + 1).
//! Unsigned values below the field order map directly. Signed values are
//! encoded as `v` for `v >= 0` and `p - |v|` for `v < 0`, which is injective as
//! long as `|v| <= (p - 1) / 2`. Byte strings are packed seven bytes per
//! element so every chunk is canonical.

use crate::error::EncodingError;
use p3_field::{PrimeCharacteristicRing, PrimeField64};
use p3_goldilocks::Goldilocks;

/// Field element used as hash input
pub type FieldElement = Goldilocks;

/// Goldilocks field order
pub const FIELD_ORDER: u64 = 0xFFFF_FFFF_0000_0001;

/// Largest magnitude a signed value may have and still encode injectively
pub const MAX_SIGNED_MAGNITUDE: u64 = (FIELD_ORDER - 1) / 2;

/// Bytes packed into a single element when hashing byte strings
pub const BYTES_PER_ELEMENT: usize = 7;

/// Values that can be encoded as a single field element
pub trait ToField: Copy {
    /// Encode the value, failing only if it lies outside the encodable range
    fn to_field(self) -> Result<FieldElement, EncodingError>;
}

impl ToField for u8 {
    fn to_field(self) -> Result<FieldElement, EncodingError> {
        Ok(Goldilocks::from_u64(self as u64))
    }
}

impl ToField for u16 {
    fn to_field(self) -> Result<FieldElement, EncodingError> {
        Ok(Goldilocks::from_u64(self as u64))
    }
}

impl ToField for u32 {
    fn to_field(self) -> Result<FieldElement, EncodingError> {
        Ok(Goldilocks::from_u64(self as u64))
    }
}

impl ToField for u64 {
    fn to_field(self) -> Result<FieldElement, EncodingError> {
        encode_u64(self)
    }
}

impl ToField for i64 {
    fn to_field(self) -> Result<FieldElement, EncodingError> {
        encode_i64(self)
    }
}

impl ToField for bool {
    fn to_field(self) -> Result<FieldElement, EncodingError> {
        Ok(if self {
            Goldilocks::ONE
        } else {
            Goldilocks::ZERO
        })
    }
}

/// Encode an unsigned 64-bit value; values at or above the field order are rejected
pub fn encode_u64(value: u64) -> Result<FieldElement, EncodingError> {
    if value >= FIELD_ORDER {
        return Err(EncodingError::UnsignedOutOfRange(value));
    }
    Ok(Goldilocks::from_u64(value))
}

/// Encode a signed 64-bit value, negatives as their additive inverse
pub fn encode_i64(value: i64) -> Result<FieldElement, EncodingError> {
    let magnitude = value.unsigned_abs();
    if magnitude > MAX_SIGNED_MAGNITUDE {
        return Err(EncodingError::SignedOutOfRange(value));
    }
    let element = Goldilocks::from_u64(magnitude);
    Ok(if value < 0 { -element } else { element })
}

/// Pack bytes little-endian, seven bytes per element, zero-padding the last chunk
pub fn pack_bytes(bytes: &[u8]) -> Vec<FieldElement> {
    bytes
        .chunks(BYTES_PER_ELEMENT)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            Goldilocks::from_u64(u64::from_le_bytes(buf))
        })
        .collect()
}

/// Ordered field elements fed to the hasher
///
/// A sequence always starts with the domain separator `[chain_id, tx_type]`;
/// fields are appended in the order the caller pushes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSequence {
    elements: Vec<FieldElement>,
}

impl FieldSequence {
    /// Start a sequence with the chain id and transaction type tag
    pub fn new(chain_id: u32, tx_type: u8) -> Self {
        let mut elements = Vec::with_capacity(16);
        elements.push(Goldilocks::from_u64(chain_id as u64));
        elements.push(Goldilocks::from_u64(tx_type as u64));
        Self { elements }
    }

    /// Append one encoded value
    pub fn push<V: ToField>(&mut self, value: V) -> Result<&mut Self, EncodingError> {
        self.elements.push(value.to_field()?);
        Ok(self)
    }

    /// Append a byte string packed seven bytes per element
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.elements.extend(pack_bytes(bytes));
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn as_slice(&self) -> &[FieldElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<FieldElement> {
        self.elements
    }

    /// Canonical little-endian bytes of every element, eight bytes each
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.elements
            .iter()
            .flat_map(|e| e.as_canonical_u64().to_le_bytes())
            .collect()
    }
}
