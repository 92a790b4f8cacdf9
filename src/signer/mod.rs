//! Signing abstraction for Lighter transactions
//!
//! L2 transactions are signed by a [`KeyManager`] over the 40-byte message
//! digest. Each key manager is bound to an account and an API key slot through
//! a [`SigningIdentity`]; the client can hold several identities at once.
//!
//! L1 (Ethereum) messages used by key registration and transfers are signed
//! separately by [`L1Signer`].

mod l1;
mod local;

pub use l1::L1Signer;
pub use local::{generate_api_key, verify_signature, ApiKeyPair, P256KeyManager};

use crate::constants::PUB_KEY_LENGTH;
use crate::error::ValidationError;
use crate::hasher::Digest;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use eyre::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ========== Keys and signatures ==========

/// L2 public key as registered on the exchange (40 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUB_KEY_LENGTH]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; PUB_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Build from a slice that must be exactly 40 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let arr: [u8; PUB_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| ValidationError::PubKeyInvalid)?;
        Ok(Self(arr))
    }

    /// Parse hex, with or without the 0x prefix
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| ValidationError::PubKeyInvalid)?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUB_KEY_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// The exchange expects the raw byte array, not a hex string
impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        Self::from_slice(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Opaque L2 signature bytes, base64 on the wire
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BASE64
            .decode(s.as_bytes())
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

// ========== Key manager ==========

/// Trait for signing L2 message digests
///
/// Both operations must be deterministic: the same key signs the same digest
/// to the same signature.
pub trait KeyManager: Send + Sync {
    /// Returns the public key registered for this private key
    fn public_key(&self) -> PublicKey;

    /// Signs a message digest
    fn sign(&self, digest: &Digest) -> Result<Signature>;
}

/// A key manager bound to an account and an API key slot
pub struct SigningIdentity {
    key_manager: Box<dyn KeyManager>,
    api_key_index: u8,
    account_index: i64,
}

impl SigningIdentity {
    pub fn new(key_manager: Box<dyn KeyManager>, api_key_index: u8, account_index: i64) -> Self {
        Self {
            key_manager,
            api_key_index,
            account_index,
        }
    }

    pub fn key_manager(&self) -> &dyn KeyManager {
        self.key_manager.as_ref()
    }

    pub fn api_key_index(&self) -> u8 {
        self.api_key_index
    }

    pub fn account_index(&self) -> i64 {
        self.account_index
    }

    pub fn public_key(&self) -> PublicKey {
        self.key_manager.public_key()
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("public_key", &self.public_key())
            .field("api_key_index", &self.api_key_index)
            .field("account_index", &self.account_index)
            .finish()
    }
}
