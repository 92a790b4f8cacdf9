//! Account, collateral and key management transactions

use super::{
    check_account_index, check_api_key_index, check_market_index, check_nonce_and_expiry,
    header_sequence, TxInfo,
};
use crate::constants::{
    MARGIN_MODE_CROSS, MARGIN_MODE_ISOLATED, MAX_ACCOUNT_INDEX, MAX_INITIAL_MARGIN_FRACTION,
    MAX_TRANSFER_AMOUNT, MAX_TRANSFER_FEE, MAX_UPDATE_MARGIN_AMOUNT, MAX_WITHDRAWAL_AMOUNT,
    MEMO_LENGTH, MIN_ACCOUNT_INDEX, MIN_INITIAL_MARGIN_FRACTION, MIN_TRANSFER_AMOUNT,
    MIN_TRANSFER_FEE, MIN_WITHDRAWAL_AMOUNT, TX_TYPE_CHANGE_PUB_KEY, TX_TYPE_CREATE_SUB_ACCOUNT,
    TX_TYPE_TRANSFER, TX_TYPE_UPDATE_LEVERAGE, TX_TYPE_UPDATE_MARGIN, TX_TYPE_WITHDRAW,
};
use crate::error::{EncodingError, ValidationError};
use crate::field::FieldSequence;
use crate::signer::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const L1_SIGNATURE_FOOTER: &str = "Only sign this message for a trusted client!";

fn hex10(value: i64) -> String {
    format!("0x{:016x}", value as u64)
}

// ========== Memo ==========

/// 32-byte transfer memo, all zeros when unset
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Memo([u8; MEMO_LENGTH]);

impl Memo {
    /// Parse a memo from hex (with or without 0x prefix)
    ///
    /// An empty string is the zero memo; anything else must decode to exactly
    /// 32 bytes.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.is_empty() {
            return Ok(Self::default());
        }
        let bytes = hex::decode(s).map_err(|_| ValidationError::MemoInvalid)?;
        Self::from_bytes(&bytes)
    }

    /// Build from raw bytes; empty input is the zero memo
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        let arr: [u8; MEMO_LENGTH] = bytes.try_into().map_err(|_| ValidationError::MemoInvalid)?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; MEMO_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memo({})", self.to_hex())
    }
}

impl Serialize for Memo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for Memo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

// ========== ChangePubKey ==========

/// Register a new L2 public key in an API key slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangePubKeyTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub pub_key: PublicKey,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for ChangePubKeyTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CHANGE_PUB_KEY
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        if self.pub_key.is_zero() {
            return Err(ValidationError::PubKeyInvalid);
        }
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_CHANGE_PUB_KEY,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push_bytes(self.pub_key.as_bytes());
        Ok(seq)
    }

    fn l1_signature_body(&self) -> Option<String> {
        Some(format!(
            "Register Lighter Account\n\npubkey: 0x{}\nnonce: {}\naccount index: {}\napi key index: {}\n{}",
            self.pub_key.to_hex(),
            hex10(self.nonce),
            hex10(self.account_index),
            hex10(self.api_key_index as i64),
            L1_SIGNATURE_FOOTER,
        ))
    }
}

// ========== CreateSubAccount ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSubAccountTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for CreateSubAccountTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CREATE_SUB_ACCOUNT
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        header_sequence(
            chain_id,
            TX_TYPE_CREATE_SUB_ACCOUNT,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )
    }
}

// ========== Transfer ==========

/// Move USDC between two L2 accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransferTx {
    pub from_account_index: i64,
    pub api_key_index: u8,
    pub to_account_index: i64,
    #[serde(rename = "USDCAmount")]
    pub usdc_amount: i64,
    pub fee: i64,
    pub memo: Memo,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for TransferTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_TRANSFER
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.from_account_index)?;
        check_api_key_index(self.api_key_index)?;
        if self.to_account_index <= MIN_ACCOUNT_INDEX {
            return Err(ValidationError::ToAccountIndexTooLow);
        }
        if self.to_account_index > MAX_ACCOUNT_INDEX {
            return Err(ValidationError::ToAccountIndexTooHigh);
        }
        if self.usdc_amount < MIN_TRANSFER_AMOUNT {
            return Err(ValidationError::USDCAmountTooLow);
        }
        if self.usdc_amount > MAX_TRANSFER_AMOUNT {
            return Err(ValidationError::USDCAmountTooHigh);
        }
        if self.fee < MIN_TRANSFER_FEE {
            return Err(ValidationError::TransferFeeTooLow);
        }
        if self.fee > MAX_TRANSFER_FEE {
            return Err(ValidationError::TransferFeeTooHigh);
        }
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_TRANSFER,
            self.nonce,
            self.expired_at,
            self.from_account_index,
            self.api_key_index,
        )?;
        seq.push(self.to_account_index)?
            .push(self.usdc_amount)?
            .push(self.fee)?;
        seq.push_bytes(self.memo.as_bytes());
        Ok(seq)
    }

    fn l1_signature_body(&self) -> Option<String> {
        Some(format!(
            "Transfer\n\nnonce: {}\nfrom: {}\napi key: {}\nto: {}\namount: {}\nfee: {}\nmemo: 0x{}\n{}",
            hex10(self.nonce),
            hex10(self.from_account_index),
            hex10(self.api_key_index as i64),
            hex10(self.to_account_index),
            hex10(self.usdc_amount),
            hex10(self.fee),
            self.memo.to_hex(),
            L1_SIGNATURE_FOOTER,
        ))
    }
}

// ========== Withdraw ==========

/// Withdraw USDC to the account's L1 address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WithdrawTx {
    pub from_account_index: i64,
    pub api_key_index: u8,
    #[serde(rename = "USDCAmount")]
    pub usdc_amount: u64,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for WithdrawTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_WITHDRAW
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.from_account_index)?;
        check_api_key_index(self.api_key_index)?;
        if self.usdc_amount < MIN_WITHDRAWAL_AMOUNT {
            return Err(ValidationError::USDCAmountTooLow);
        }
        if self.usdc_amount > MAX_WITHDRAWAL_AMOUNT {
            return Err(ValidationError::USDCAmountTooHigh);
        }
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_WITHDRAW,
            self.nonce,
            self.expired_at,
            self.from_account_index,
            self.api_key_index,
        )?;
        seq.push(self.usdc_amount)?;
        Ok(seq)
    }
}

// ========== UpdateLeverage ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateLeverageTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub market_index: u8,
    pub initial_margin_fraction: u16,
    pub margin_mode: u8,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for UpdateLeverageTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_UPDATE_LEVERAGE
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        check_market_index(self.market_index)?;
        if self.initial_margin_fraction < MIN_INITIAL_MARGIN_FRACTION {
            return Err(ValidationError::InitialMarginFractionTooLow);
        }
        if self.initial_margin_fraction > MAX_INITIAL_MARGIN_FRACTION {
            return Err(ValidationError::InitialMarginFractionTooHigh);
        }
        if self.margin_mode != MARGIN_MODE_CROSS && self.margin_mode != MARGIN_MODE_ISOLATED {
            return Err(ValidationError::MarginModeInvalid);
        }
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_UPDATE_LEVERAGE,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push(self.market_index)?
            .push(self.initial_margin_fraction)?
            .push(self.margin_mode)?;
        Ok(seq)
    }
}

// ========== UpdateMargin ==========

/// Add (positive amount) or remove (negative amount) isolated margin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateMarginTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub market_index: u8,
    #[serde(rename = "USDCAmount")]
    pub usdc_amount: i64,
    pub direction: u8,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for UpdateMarginTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_UPDATE_MARGIN
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        check_market_index(self.market_index)?;
        if self.usdc_amount == 0 {
            return Err(ValidationError::USDCAmountIsZero);
        }
        // Keeps the signed amount inside the injective encoding range
        if self.usdc_amount.unsigned_abs() > MAX_UPDATE_MARGIN_AMOUNT as u64 {
            return Err(ValidationError::USDCAmountTooHigh);
        }
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_UPDATE_MARGIN,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push(self.market_index)?
            .push(self.direction)?
            .push(self.usdc_amount)?;
        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAINNET_CHAIN_ID;
    use crate::txtypes::tests::margin_tx;
    use p3_field::PrimeField64;

    fn transfer() -> TransferTx {
        TransferTx {
            from_account_index: 10,
            api_key_index: 2,
            to_account_index: 11,
            usdc_amount: 1_000_000,
            fee: 0,
            memo: Memo::default(),
            expired_at: 1_700_000_000_000,
            nonce: 1,
        }
    }

    fn values(seq: &FieldSequence) -> Vec<u64> {
        seq.as_slice().iter().map(|e| e.as_canonical_u64()).collect()
    }

    #[test]
    fn test_update_margin_account_boundary() {
        let mut tx = margin_tx(100);
        tx.account_index = MIN_ACCOUNT_INDEX;
        assert_eq!(tx.validate(), Err(ValidationError::FromAccountIndexTooLow));
        tx.account_index = MIN_ACCOUNT_INDEX + 1;
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_update_margin_amount_rules() {
        assert_eq!(margin_tx(0).validate(), Err(ValidationError::USDCAmountIsZero));
        assert!(margin_tx(-1).validate().is_ok());
        assert!(margin_tx(MAX_UPDATE_MARGIN_AMOUNT).validate().is_ok());
        assert!(margin_tx(-MAX_UPDATE_MARGIN_AMOUNT).validate().is_ok());
        assert_eq!(
            margin_tx(MAX_UPDATE_MARGIN_AMOUNT + 1).validate(),
            Err(ValidationError::USDCAmountTooHigh)
        );
        assert_eq!(
            margin_tx(i64::MIN).validate(),
            Err(ValidationError::USDCAmountTooHigh)
        );
    }

    #[test]
    fn test_update_margin_first_error_wins() {
        let mut tx = margin_tx(0);
        tx.api_key_index = 255;
        tx.nonce = -1;
        assert_eq!(tx.validate(), Err(ValidationError::ApiKeyIndexTooHigh));
        tx.api_key_index = 0;
        assert_eq!(tx.validate(), Err(ValidationError::USDCAmountIsZero));
        tx.usdc_amount = 1;
        assert_eq!(tx.validate(), Err(ValidationError::NonceTooLow));
    }

    #[test]
    fn test_update_margin_hash_order() {
        let tx = margin_tx(-5);
        let seq = tx.hash_elements(MAINNET_CHAIN_ID).unwrap();
        let p = crate::field::FIELD_ORDER;
        assert_eq!(
            values(&seq),
            vec![304, 29, 7, 1_700_000_000_000, 42, 3, 1, 0, p - 5]
        );
    }

    #[test]
    fn test_hash_elements_is_pure() {
        let tx = transfer();
        assert_eq!(
            tx.hash_elements(MAINNET_CHAIN_ID).unwrap(),
            tx.hash_elements(MAINNET_CHAIN_ID).unwrap()
        );
    }

    #[test]
    fn test_memo_parse() {
        assert_eq!(Memo::parse("").unwrap().as_bytes(), &[0u8; MEMO_LENGTH]);
        assert_eq!(Memo::parse("0x").unwrap(), Memo::default());

        let hex32 = "ab".repeat(32);
        assert_eq!(Memo::parse(&hex32).unwrap().as_bytes(), &[0xAB; MEMO_LENGTH]);
        assert_eq!(Memo::parse(&format!("0x{hex32}")).unwrap().to_hex(), hex32);

        assert_eq!(Memo::parse("abcd"), Err(ValidationError::MemoInvalid));
        assert_eq!(Memo::parse(&"ab".repeat(33)), Err(ValidationError::MemoInvalid));
        assert_eq!(Memo::parse("zz"), Err(ValidationError::MemoInvalid));
        assert_eq!(Memo::from_bytes(&[1u8; 31]), Err(ValidationError::MemoInvalid));
    }

    #[test]
    fn test_empty_memo_hashes_as_zero_bytes() {
        let mut with_empty = transfer();
        with_empty.memo = Memo::parse("").unwrap();
        let mut with_zeros = transfer();
        with_zeros.memo = Memo::from_bytes(&[0u8; MEMO_LENGTH]).unwrap();
        assert_eq!(
            with_empty.hash_elements(MAINNET_CHAIN_ID).unwrap(),
            with_zeros.hash_elements(MAINNET_CHAIN_ID).unwrap()
        );
        // header (6) + to, amount, fee (3) + memo (5)
        assert_eq!(with_empty.hash_elements(MAINNET_CHAIN_ID).unwrap().len(), 14);
    }

    #[test]
    fn test_transfer_validation_order() {
        let mut tx = transfer();
        tx.to_account_index = 0;
        tx.usdc_amount = 0;
        assert_eq!(tx.validate(), Err(ValidationError::ToAccountIndexTooLow));
        tx.to_account_index = 11;
        assert_eq!(tx.validate(), Err(ValidationError::USDCAmountTooLow));
        tx.usdc_amount = 1;
        tx.fee = -1;
        assert_eq!(tx.validate(), Err(ValidationError::TransferFeeTooLow));
        tx.fee = 0;
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_transfer_l1_body() {
        let mut tx = transfer();
        tx.memo = Memo::from_bytes(&[0x11; MEMO_LENGTH]).unwrap();
        let body = tx.l1_signature_body().unwrap();
        assert!(body.starts_with("Transfer\n\nnonce: 0x0000000000000001\n"));
        assert!(body.contains(&format!("memo: 0x{}", "11".repeat(32))));
        assert!(body.ends_with(L1_SIGNATURE_FOOTER));
    }

    #[test]
    fn test_transfer_json_field_names() {
        let json = serde_json::to_value(transfer()).unwrap();
        assert_eq!(json["FromAccountIndex"], 10);
        assert_eq!(json["ToAccountIndex"], 11);
        assert_eq!(json["USDCAmount"], 1_000_000);
        assert_eq!(json["Memo"].as_array().unwrap().len(), MEMO_LENGTH);
    }

    #[test]
    fn test_change_pub_key() {
        let tx = ChangePubKeyTx {
            account_index: 5,
            api_key_index: 4,
            pub_key: PublicKey::from_bytes([9u8; 40]),
            expired_at: 0,
            nonce: 0,
        };
        assert!(tx.validate().is_ok());
        // header (6) + 40 bytes packed seven per element (6)
        assert_eq!(tx.hash_elements(MAINNET_CHAIN_ID).unwrap().len(), 12);

        let body = tx.l1_signature_body().unwrap();
        assert!(body.starts_with("Register Lighter Account\n\npubkey: 0x0909"));
        assert!(body.contains("account index: 0x0000000000000005"));
        assert!(body.contains("api key index: 0x0000000000000004"));

        let zero = ChangePubKeyTx {
            pub_key: PublicKey::from_bytes([0u8; 40]),
            ..tx
        };
        assert_eq!(zero.validate(), Err(ValidationError::PubKeyInvalid));
    }

    #[test]
    fn test_withdraw_bounds() {
        let mut tx = WithdrawTx {
            from_account_index: 1,
            api_key_index: 0,
            usdc_amount: 0,
            expired_at: 0,
            nonce: 0,
        };
        assert_eq!(tx.validate(), Err(ValidationError::USDCAmountTooLow));
        tx.usdc_amount = MAX_WITHDRAWAL_AMOUNT + 1;
        assert_eq!(tx.validate(), Err(ValidationError::USDCAmountTooHigh));
        tx.usdc_amount = MAX_WITHDRAWAL_AMOUNT;
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_update_leverage_checks() {
        let mut tx = UpdateLeverageTx {
            account_index: 1,
            api_key_index: 0,
            market_index: 0,
            initial_margin_fraction: 0,
            margin_mode: 2,
            expired_at: 0,
            nonce: 0,
        };
        assert_eq!(tx.validate(), Err(ValidationError::InitialMarginFractionTooLow));
        tx.initial_margin_fraction = MAX_INITIAL_MARGIN_FRACTION + 1;
        assert_eq!(tx.validate(), Err(ValidationError::InitialMarginFractionTooHigh));
        tx.initial_margin_fraction = 500;
        assert_eq!(tx.validate(), Err(ValidationError::MarginModeInvalid));
        tx.margin_mode = MARGIN_MODE_ISOLATED;
        assert!(tx.validate().is_ok());
        tx.market_index = 255;
        assert_eq!(tx.validate(), Err(ValidationError::MarketIndexTooHigh));
    }
}
