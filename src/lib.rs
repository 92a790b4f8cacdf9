//! Lighter SDK for Rust
//!
//! A Rust SDK for building, signing and submitting transactions on the
//! Lighter L2 exchange.
//!
//! # Features
//!
//! - Validate and sign all 15 L2 transaction kinds (orders, transfers, pools, margin)
//! - Poseidon2 hashing over the Goldilocks field
//! - Multiple API key identities with an active slot
//! - Auth tokens, API key generation and client checks
//! - L1 (EIP-191) signatures for key registration and transfers
//!
//! The bundled [`P256KeyManager`] and [`Poseidon2Hasher`] do not produce
//! signatures the live exchange accepts. For live submission, plug in a
//! matching [`KeyManager`] through [`SigningIdentity::new`] and a matching
//! [`MessageHasher`] through [`TxClient::with_hasher`].
//!
//! # Example
//!
//! ```rust,ignore
//! use lighter_sdk::{ClientConfig, CreateOrderReq, TransactOpts, TxClient};
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let mut client = TxClient::connect(ClientConfig::from_env()?)?;
//!     client.register_api_key("0x...", 3, 12345)?;
//!
//!     // Buy 0.1 ETH at 3000.00, good till time
//!     let signed = client
//!         .sign_create_order(&CreateOrderReq::limit(0, 1_000, 300_000, false), TransactOpts::new())
//!         .await?;
//!     let tx_hash = client.send(&signed).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod field;
pub mod hasher;
pub mod http;
pub mod response;
pub mod signer;
pub mod transport;
pub mod txtypes;
pub mod types;

// Re-export main types for convenience
pub use client::{attach_l1_signature, TxClient};
pub use config::ClientConfig;
pub use error::{
    eyre, Context, EncodingError, IdentityError, Report, Result, TransportError, ValidationError,
};
pub use hasher::{Digest, MessageHasher, Poseidon2Hasher};
pub use http::HttpClient;
pub use signer::{
    generate_api_key, verify_signature, ApiKeyPair, KeyManager, L1Signer, P256KeyManager,
    PublicKey, Signature, SigningIdentity,
};
pub use transport::Transport;
pub use txtypes::{sign_transaction, SignedTransaction, Transaction, TxInfo};
pub use types::{
    BurnSharesReq, CancelAllOrdersReq, CancelOrderReq, ChangePubKeyReq, CreateGroupedOrdersReq,
    CreateOrderReq, CreatePublicPoolReq, MintSharesReq, ModifyOrderReq, TransactOpts,
    TransferReq, UpdateLeverageReq, UpdateMarginReq, UpdatePublicPoolReq, WithdrawReq,
};
