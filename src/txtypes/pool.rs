//! Public pool transactions

use super::{
    check_account_index, check_api_key_index, check_nonce_and_expiry, header_sequence, TxInfo,
};
use crate::constants::{
    MAX_ACCOUNT_INDEX, MAX_INITIAL_TOTAL_SHARES, MAX_OPERATOR_FEE, MAX_OPERATOR_SHARE_RATE,
    MAX_POOL_SHARES, MIN_INITIAL_TOTAL_SHARES, MIN_OPERATOR_FEE, MIN_OPERATOR_SHARE_RATE,
    MIN_POOL_SHARES, MIN_SUB_ACCOUNT_INDEX, PUBLIC_POOL_STATUS_ACTIVE, PUBLIC_POOL_STATUS_FROZEN,
    TX_TYPE_BURN_SHARES, TX_TYPE_CREATE_PUBLIC_POOL, TX_TYPE_MINT_SHARES,
    TX_TYPE_UPDATE_PUBLIC_POOL,
};
use crate::error::{EncodingError, ValidationError};
use crate::field::FieldSequence;
use serde::Serialize;

fn check_operator_fee(fee: i64) -> Result<(), ValidationError> {
    if fee < MIN_OPERATOR_FEE {
        return Err(ValidationError::OperatorFeeTooLow);
    }
    if fee > MAX_OPERATOR_FEE {
        return Err(ValidationError::OperatorFeeTooHigh);
    }
    Ok(())
}

fn check_min_operator_share_rate(rate: i64) -> Result<(), ValidationError> {
    if rate < MIN_OPERATOR_SHARE_RATE {
        return Err(ValidationError::MinOperatorShareRateTooLow);
    }
    if rate > MAX_OPERATOR_SHARE_RATE {
        return Err(ValidationError::MinOperatorShareRateTooHigh);
    }
    Ok(())
}

// Pools live in the sub-account range
fn check_pool_index(index: i64) -> Result<(), ValidationError> {
    if index < MIN_SUB_ACCOUNT_INDEX {
        return Err(ValidationError::PublicPoolIndexTooLow);
    }
    if index > MAX_ACCOUNT_INDEX {
        return Err(ValidationError::PublicPoolIndexTooHigh);
    }
    Ok(())
}

fn check_share_amount(amount: i64) -> Result<(), ValidationError> {
    if amount < MIN_POOL_SHARES {
        return Err(ValidationError::ShareAmountTooLow);
    }
    if amount > MAX_POOL_SHARES {
        return Err(ValidationError::ShareAmountTooHigh);
    }
    Ok(())
}

// ========== CreatePublicPool ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreatePublicPoolTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub operator_fee: i64,
    pub initial_total_shares: i64,
    pub min_operator_share_rate: i64,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for CreatePublicPoolTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CREATE_PUBLIC_POOL
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        check_operator_fee(self.operator_fee)?;
        if self.initial_total_shares < MIN_INITIAL_TOTAL_SHARES {
            return Err(ValidationError::InitialTotalSharesTooLow);
        }
        if self.initial_total_shares > MAX_INITIAL_TOTAL_SHARES {
            return Err(ValidationError::InitialTotalSharesTooHigh);
        }
        check_min_operator_share_rate(self.min_operator_share_rate)?;
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_CREATE_PUBLIC_POOL,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push(self.operator_fee)?
            .push(self.initial_total_shares)?
            .push(self.min_operator_share_rate)?;
        Ok(seq)
    }
}

// ========== UpdatePublicPool ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdatePublicPoolTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub public_pool_index: i64,
    pub status: u8,
    pub operator_fee: i64,
    pub min_operator_share_rate: i64,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for UpdatePublicPoolTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_UPDATE_PUBLIC_POOL
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        check_pool_index(self.public_pool_index)?;
        if self.status != PUBLIC_POOL_STATUS_ACTIVE && self.status != PUBLIC_POOL_STATUS_FROZEN {
            return Err(ValidationError::PublicPoolStatusInvalid);
        }
        check_operator_fee(self.operator_fee)?;
        check_min_operator_share_rate(self.min_operator_share_rate)?;
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_UPDATE_PUBLIC_POOL,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push(self.public_pool_index)?
            .push(self.status)?
            .push(self.operator_fee)?
            .push(self.min_operator_share_rate)?;
        Ok(seq)
    }
}

// ========== MintShares / BurnShares ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MintSharesTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub public_pool_index: i64,
    pub share_amount: i64,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for MintSharesTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_MINT_SHARES
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        check_pool_index(self.public_pool_index)?;
        check_share_amount(self.share_amount)?;
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_MINT_SHARES,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push(self.public_pool_index)?.push(self.share_amount)?;
        Ok(seq)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BurnSharesTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub public_pool_index: i64,
    pub share_amount: i64,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for BurnSharesTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_BURN_SHARES
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        check_pool_index(self.public_pool_index)?;
        check_share_amount(self.share_amount)?;
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_BURN_SHARES,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push(self.public_pool_index)?.push(self.share_amount)?;
        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAINNET_CHAIN_ID;
    use crate::field::FieldSequence;

    #[test]
    fn test_create_public_pool_bounds() {
        let mut tx = CreatePublicPoolTx {
            account_index: 1,
            api_key_index: 0,
            operator_fee: MAX_OPERATOR_FEE + 1,
            initial_total_shares: 0,
            min_operator_share_rate: -1,
            expired_at: 0,
            nonce: 0,
        };
        assert_eq!(tx.validate(), Err(ValidationError::OperatorFeeTooHigh));
        tx.operator_fee = MAX_OPERATOR_FEE;
        assert_eq!(tx.validate(), Err(ValidationError::InitialTotalSharesTooLow));
        tx.initial_total_shares = 1_000;
        assert_eq!(tx.validate(), Err(ValidationError::MinOperatorShareRateTooLow));
        tx.min_operator_share_rate = MAX_OPERATOR_SHARE_RATE;
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_update_public_pool_checks() {
        let mut tx = UpdatePublicPoolTx {
            account_index: 1,
            api_key_index: 0,
            public_pool_index: 5,
            status: 2,
            operator_fee: 0,
            min_operator_share_rate: 0,
            expired_at: 0,
            nonce: 0,
        };
        assert_eq!(tx.validate(), Err(ValidationError::PublicPoolIndexTooLow));
        tx.public_pool_index = MIN_SUB_ACCOUNT_INDEX;
        assert_eq!(tx.validate(), Err(ValidationError::PublicPoolStatusInvalid));
        tx.status = PUBLIC_POOL_STATUS_FROZEN;
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_mint_and_burn_hash_differ_by_tag() {
        let mint = MintSharesTx {
            account_index: 1,
            api_key_index: 0,
            public_pool_index: MIN_SUB_ACCOUNT_INDEX,
            share_amount: 10,
            expired_at: 0,
            nonce: 0,
        };
        let burn = BurnSharesTx {
            account_index: 1,
            api_key_index: 0,
            public_pool_index: MIN_SUB_ACCOUNT_INDEX,
            share_amount: 10,
            expired_at: 0,
            nonce: 0,
        };
        assert!(mint.validate().is_ok());
        assert!(burn.validate().is_ok());

        let m: FieldSequence = mint.hash_elements(MAINNET_CHAIN_ID).unwrap();
        let b: FieldSequence = burn.hash_elements(MAINNET_CHAIN_ID).unwrap();
        assert_eq!(m.len(), b.len());
        assert_ne!(m, b);
    }

    #[test]
    fn test_share_amount_bounds() {
        let tx = BurnSharesTx {
            account_index: 1,
            api_key_index: 0,
            public_pool_index: MAX_ACCOUNT_INDEX + 1,
            share_amount: 0,
            expired_at: 0,
            nonce: 0,
        };
        assert_eq!(tx.validate(), Err(ValidationError::PublicPoolIndexTooHigh));
        let tx = BurnSharesTx {
            public_pool_index: MAX_ACCOUNT_INDEX,
            ..tx
        };
        assert_eq!(tx.validate(), Err(ValidationError::ShareAmountTooLow));
        let tx = BurnSharesTx {
            share_amount: MAX_POOL_SHARES + 1,
            ..tx
        };
        assert_eq!(tx.validate(), Err(ValidationError::ShareAmountTooHigh));
    }
}
