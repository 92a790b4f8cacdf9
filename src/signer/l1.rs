//! Ethereum (L1) message signer
//!
//! Registering an API key and transferring USDC both require an EIP-191
//! personal signature from the account's L1 address over a human-readable
//! message body.

use alloy::primitives::{Address, Signature as EthSignature};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use eyre::{Context, Result};

/// Local L1 signer using an Ethereum private key
#[derive(Clone)]
pub struct L1Signer {
    signer: PrivateKeySigner,
}

impl L1Signer {
    /// Create a new L1Signer from a private key hex string (with or without 0x prefix)
    pub fn from_private_key(private_key: impl AsRef<str>) -> Result<Self> {
        let key = private_key.as_ref();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let signer: PrivateKeySigner = key.parse().context("Failed to parse L1 private key")?;

        Ok(Self { signer })
    }

    /// Returns the signer's L1 address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a message with EIP-191 and return the raw signature
    pub fn sign_message_raw(&self, message: &str) -> Result<EthSignature> {
        self.signer
            .sign_message_sync(message.as_bytes())
            .context("Failed to sign L1 message")
    }

    /// Sign a message with EIP-191, returning 0x-prefixed hex (r || s || v)
    pub fn sign_message(&self, message: &str) -> Result<String> {
        let signature = self.sign_message_raw(message)?;
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}

impl std::fmt::Debug for L1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L1Signer")
            .field("address", &self.address())
            .finish()
    }
}
