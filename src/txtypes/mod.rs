//! Lighter L2 transaction kinds
//!
//! Each kind is a plain struct that owns its fields, checks them against the
//! protocol bounds and lays them out as an ordered field sequence. The hashed
//! sequence of every kind starts with
//! `[chain_id, tx_type, nonce, expired_at, account_index, api_key_index]`.
//!
//! Signing consumes a [`Transaction`] and produces an immutable
//! [`SignedTransaction`]; re-signing means building a new transaction.

mod account;
mod order;
mod pool;

pub use account::{
    ChangePubKeyTx, CreateSubAccountTx, Memo, TransferTx, UpdateLeverageTx, UpdateMarginTx,
    WithdrawTx,
};
pub use order::{
    CancelAllOrdersTx, CancelOrderTx, CreateGroupedOrdersTx, CreateOrderTx, ModifyOrderTx,
    OrderInfo,
};
pub use pool::{BurnSharesTx, CreatePublicPoolTx, MintSharesTx, UpdatePublicPoolTx};

use crate::constants::{
    MAX_ACCOUNT_INDEX, MAX_API_KEY_INDEX, MAX_MARKET_INDEX, MAX_TIMESTAMP, MIN_ACCOUNT_INDEX,
    MIN_NONCE,
};
use crate::error::{EncodingError, ValidationError};
use crate::field::FieldSequence;
use crate::hasher::{Digest, MessageHasher};
use crate::signer::{KeyManager, Signature};
use eyre::{Context, Result};
use serde::{Serialize, Serializer};

/// Common behaviour of every transaction kind
pub trait TxInfo {
    /// Transaction type tag
    fn tx_type(&self) -> u8;

    /// Check every field against its bounds, returning the first failure
    fn validate(&self) -> Result<(), ValidationError>;

    /// Ordered field sequence hashed for signing
    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError>;

    /// Human-readable message the L1 address must sign, for kinds that need one
    fn l1_signature_body(&self) -> Option<String> {
        None
    }
}

// ========== Shared checks ==========

pub(crate) fn check_account_index(account_index: i64) -> Result<(), ValidationError> {
    if account_index <= MIN_ACCOUNT_INDEX {
        return Err(ValidationError::FromAccountIndexTooLow);
    }
    if account_index > MAX_ACCOUNT_INDEX {
        return Err(ValidationError::FromAccountIndexTooHigh);
    }
    Ok(())
}

pub(crate) fn check_api_key_index(api_key_index: u8) -> Result<(), ValidationError> {
    if api_key_index > MAX_API_KEY_INDEX {
        return Err(ValidationError::ApiKeyIndexTooHigh);
    }
    Ok(())
}

pub(crate) fn check_market_index(market_index: u8) -> Result<(), ValidationError> {
    if market_index > MAX_MARKET_INDEX {
        return Err(ValidationError::MarketIndexTooHigh);
    }
    Ok(())
}

pub(crate) fn check_nonce_and_expiry(nonce: i64, expired_at: i64) -> Result<(), ValidationError> {
    if nonce < MIN_NONCE {
        return Err(ValidationError::NonceTooLow);
    }
    if !(0..=MAX_TIMESTAMP).contains(&expired_at) {
        return Err(ValidationError::ExpiredAtInvalid);
    }
    Ok(())
}

/// Start a sequence with the domain separator and the common header fields
pub(crate) fn header_sequence(
    chain_id: u32,
    tx_type: u8,
    nonce: i64,
    expired_at: i64,
    account_index: i64,
    api_key_index: u8,
) -> Result<FieldSequence, EncodingError> {
    let mut seq = FieldSequence::new(chain_id, tx_type);
    seq.push(nonce)?
        .push(expired_at)?
        .push(account_index)?
        .push(api_key_index)?;
    Ok(seq)
}

// ========== Transaction ==========

/// Every transaction kind the client can sign
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Transaction {
    ChangePubKey(ChangePubKeyTx),
    CreateSubAccount(CreateSubAccountTx),
    CreatePublicPool(CreatePublicPoolTx),
    UpdatePublicPool(UpdatePublicPoolTx),
    Transfer(TransferTx),
    Withdraw(WithdrawTx),
    CreateOrder(CreateOrderTx),
    CancelOrder(CancelOrderTx),
    CancelAllOrders(CancelAllOrdersTx),
    ModifyOrder(ModifyOrderTx),
    MintShares(MintSharesTx),
    BurnShares(BurnSharesTx),
    UpdateLeverage(UpdateLeverageTx),
    CreateGroupedOrders(CreateGroupedOrdersTx),
    UpdateMargin(UpdateMarginTx),
}

macro_rules! dispatch {
    ($self:expr, $tx:ident => $body:expr) => {
        match $self {
            Transaction::ChangePubKey($tx) => $body,
            Transaction::CreateSubAccount($tx) => $body,
            Transaction::CreatePublicPool($tx) => $body,
            Transaction::UpdatePublicPool($tx) => $body,
            Transaction::Transfer($tx) => $body,
            Transaction::Withdraw($tx) => $body,
            Transaction::CreateOrder($tx) => $body,
            Transaction::CancelOrder($tx) => $body,
            Transaction::CancelAllOrders($tx) => $body,
            Transaction::ModifyOrder($tx) => $body,
            Transaction::MintShares($tx) => $body,
            Transaction::BurnShares($tx) => $body,
            Transaction::UpdateLeverage($tx) => $body,
            Transaction::CreateGroupedOrders($tx) => $body,
            Transaction::UpdateMargin($tx) => $body,
        }
    };
}

macro_rules! impl_from_kind {
    ($($variant:ident($kind:ty)),* $(,)?) => {
        $(
            impl From<$kind> for Transaction {
                fn from(tx: $kind) -> Self {
                    Transaction::$variant(tx)
                }
            }
        )*
    };
}

impl_from_kind!(
    ChangePubKey(ChangePubKeyTx),
    CreateSubAccount(CreateSubAccountTx),
    CreatePublicPool(CreatePublicPoolTx),
    UpdatePublicPool(UpdatePublicPoolTx),
    Transfer(TransferTx),
    Withdraw(WithdrawTx),
    CreateOrder(CreateOrderTx),
    CancelOrder(CancelOrderTx),
    CancelAllOrders(CancelAllOrdersTx),
    ModifyOrder(ModifyOrderTx),
    MintShares(MintSharesTx),
    BurnShares(BurnSharesTx),
    UpdateLeverage(UpdateLeverageTx),
    CreateGroupedOrders(CreateGroupedOrdersTx),
    UpdateMargin(UpdateMarginTx),
);

impl TxInfo for Transaction {
    fn tx_type(&self) -> u8 {
        dispatch!(self, tx => tx.tx_type())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        dispatch!(self, tx => tx.validate())
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        dispatch!(self, tx => tx.hash_elements(chain_id))
    }

    fn l1_signature_body(&self) -> Option<String> {
        dispatch!(self, tx => tx.l1_signature_body())
    }
}

// ========== Signing ==========

/// A validated, hashed and signed transaction ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    tx: Transaction,
    sig: Signature,
    signed_hash: Digest,
    message_to_sign: Option<String>,
    l1_sig: Option<String>,
}

#[derive(Serialize)]
struct WireTx<'a> {
    #[serde(flatten)]
    tx: &'a Transaction,
    #[serde(rename = "Sig")]
    sig: &'a Signature,
    #[serde(rename = "L1Sig", skip_serializing_if = "Option::is_none")]
    l1_sig: Option<&'a str>,
    #[serde(rename = "MessageToSign", skip_serializing_if = "Option::is_none")]
    message_to_sign: Option<&'a str>,
}

impl SignedTransaction {
    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    pub fn tx_type(&self) -> u8 {
        self.tx.tx_type()
    }

    pub fn signature(&self) -> &Signature {
        &self.sig
    }

    pub fn signed_hash(&self) -> &Digest {
        &self.signed_hash
    }

    /// Hex digest of the signed message
    pub fn tx_hash(&self) -> String {
        self.signed_hash.to_hex()
    }

    /// L1 message body for kinds that require an L1 signature
    pub fn message_to_sign(&self) -> Option<&str> {
        self.message_to_sign.as_deref()
    }

    pub fn l1_signature(&self) -> Option<&str> {
        self.l1_sig.as_deref()
    }

    /// Attach the L1 signature over [`Self::message_to_sign`]
    pub fn with_l1_signature(self, l1_sig: impl Into<String>) -> Self {
        Self {
            l1_sig: Some(l1_sig.into()),
            ..self
        }
    }

    /// JSON record submitted as `tx_info`
    pub fn tx_info(&self) -> Result<String> {
        let wire = WireTx {
            tx: &self.tx,
            sig: &self.sig,
            l1_sig: self.l1_sig.as_deref(),
            message_to_sign: None,
        };
        serde_json::to_string(&wire).context("Failed to serialize transaction")
    }
}

/// Serializes the wire record plus `MessageToSign` when present
impl Serialize for SignedTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireTx {
            tx: &self.tx,
            sig: &self.sig,
            l1_sig: self.l1_sig.as_deref(),
            message_to_sign: self.message_to_sign.as_deref(),
        }
        .serialize(serializer)
    }
}

/// Validate, encode, hash and sign a transaction
///
/// Any failure aborts before the signature is produced. Validation errors are
/// returned as [`ValidationError`] inside the report.
pub fn sign_transaction(
    tx: Transaction,
    chain_id: u32,
    hasher: &dyn MessageHasher,
    key_manager: &dyn KeyManager,
) -> Result<SignedTransaction> {
    tx.validate()?;

    let elements = tx.hash_elements(chain_id).map_err(|e| {
        tracing::error!(tx_type = tx.tx_type(), "encoding failed after validation: {}", e);
        e
    })?;

    let signed_hash = hasher.hash(&elements);
    let sig = key_manager.sign(&signed_hash)?;
    let message_to_sign = tx.l1_signature_body();

    tracing::debug!(
        tx_type = tx.tx_type(),
        hash = %signed_hash,
        "signed transaction"
    );

    Ok(SignedTransaction {
        tx,
        sig,
        signed_hash,
        message_to_sign,
        l1_sig: None,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::constants::{MAINNET_CHAIN_ID, TX_TYPE_UPDATE_MARGIN};
    use crate::hasher::Poseidon2Hasher;
    use crate::signer::P256KeyManager;

    pub(crate) const TEST_KEY: &str =
        "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    pub(crate) fn margin_tx(amount: i64) -> UpdateMarginTx {
        UpdateMarginTx {
            account_index: 42,
            api_key_index: 3,
            market_index: 1,
            usdc_amount: amount,
            direction: 0,
            expired_at: 1_700_000_000_000,
            nonce: 7,
        }
    }

    #[test]
    fn test_check_account_index_boundaries() {
        assert_eq!(
            check_account_index(MIN_ACCOUNT_INDEX),
            Err(ValidationError::FromAccountIndexTooLow)
        );
        assert!(check_account_index(MIN_ACCOUNT_INDEX + 1).is_ok());
        assert!(check_account_index(MAX_ACCOUNT_INDEX).is_ok());
        assert_eq!(
            check_account_index(MAX_ACCOUNT_INDEX + 1),
            Err(ValidationError::FromAccountIndexTooHigh)
        );
    }

    #[test]
    fn test_check_nonce_and_expiry() {
        assert_eq!(check_nonce_and_expiry(-1, 0), Err(ValidationError::NonceTooLow));
        assert_eq!(
            check_nonce_and_expiry(0, -1),
            Err(ValidationError::ExpiredAtInvalid)
        );
        assert_eq!(
            check_nonce_and_expiry(0, MAX_TIMESTAMP + 1),
            Err(ValidationError::ExpiredAtInvalid)
        );
        assert!(check_nonce_and_expiry(0, MAX_TIMESTAMP).is_ok());
    }

    #[test]
    fn test_transaction_dispatch() {
        let tx: Transaction = margin_tx(100).into();
        assert_eq!(tx.tx_type(), TX_TYPE_UPDATE_MARGIN);
        assert!(tx.validate().is_ok());
        assert!(tx.l1_signature_body().is_none());
    }

    #[test]
    fn test_sign_transaction_is_deterministic() {
        let hasher = Poseidon2Hasher::new();
        let km = P256KeyManager::from_private_key(TEST_KEY).unwrap();

        let a = sign_transaction(margin_tx(100).into(), MAINNET_CHAIN_ID, &hasher, &km).unwrap();
        let b = sign_transaction(margin_tx(100).into(), MAINNET_CHAIN_ID, &hasher, &km).unwrap();
        assert_eq!(a.signed_hash(), b.signed_hash());
        assert_eq!(a.signature(), b.signature());

        let c = sign_transaction(margin_tx(101).into(), MAINNET_CHAIN_ID, &hasher, &km).unwrap();
        assert_ne!(a.signed_hash(), c.signed_hash());
    }

    #[test]
    fn test_sign_transaction_rejects_invalid_before_signing() {
        let hasher = Poseidon2Hasher::new();
        let km = P256KeyManager::from_private_key(TEST_KEY).unwrap();

        let err = sign_transaction(margin_tx(0).into(), MAINNET_CHAIN_ID, &hasher, &km).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::USDCAmountIsZero)
        );
    }

    #[test]
    fn test_tx_info_wire_shape() {
        let hasher = Poseidon2Hasher::new();
        let km = P256KeyManager::from_private_key(TEST_KEY).unwrap();
        let signed =
            sign_transaction(margin_tx(-5).into(), MAINNET_CHAIN_ID, &hasher, &km).unwrap();

        let json: serde_json::Value = serde_json::from_str(&signed.tx_info().unwrap()).unwrap();
        assert_eq!(json["AccountIndex"], 42);
        assert_eq!(json["ApiKeyIndex"], 3);
        assert_eq!(json["USDCAmount"], -5);
        assert_eq!(json["Nonce"], 7);
        assert_eq!(json["Sig"], signed.signature().to_base64());
        assert!(json.get("MessageToSign").is_none());
        assert!(json.get("L1Sig").is_none());
    }

    #[test]
    fn test_with_l1_signature_keeps_hash() {
        let hasher = Poseidon2Hasher::new();
        let km = P256KeyManager::from_private_key(TEST_KEY).unwrap();
        let signed = sign_transaction(margin_tx(5).into(), MAINNET_CHAIN_ID, &hasher, &km).unwrap();
        let hash = *signed.signed_hash();

        let signed = signed.with_l1_signature("0xabc");
        assert_eq!(signed.l1_signature(), Some("0xabc"));
        assert_eq!(signed.signed_hash(), &hash);

        let json: serde_json::Value = serde_json::from_str(&signed.tx_info().unwrap()).unwrap();
        assert_eq!(json["L1Sig"], "0xabc");
    }
}
