//! Account and funds request types

use crate::constants::scale_usdc;
use crate::signer::PublicKey;
use crate::txtypes::Memo;

/// Register a new public key in the signing API key slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangePubKeyReq {
    pub pub_key: PublicKey,
}

/// Move USDC to another account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReq {
    pub to_account_index: i64,
    /// USDC with 6 decimals
    pub usdc_amount: i64,
    /// Fee paid to the exchange, 6 decimals
    pub fee: i64,
    pub memo: Memo,
}

impl TransferReq {
    /// Transfer a human-readable USDC amount with no fee or memo
    pub fn new(to_account_index: i64, amount: f64) -> Self {
        Self {
            to_account_index,
            usdc_amount: scale_usdc(amount),
            fee: 0,
            memo: Memo::default(),
        }
    }

    pub fn with_fee(mut self, fee: i64) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }
}

/// Withdraw USDC to L1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawReq {
    /// USDC with 6 decimals
    pub usdc_amount: u64,
}

impl WithdrawReq {
    /// Withdraw a human-readable USDC amount; negative amounts clamp to zero
    pub fn new(amount: f64) -> Self {
        Self {
            usdc_amount: scale_usdc(amount).max(0) as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_scaling() {
        let req = TransferReq::new(7, 12.5).with_fee(3);
        assert_eq!(req.usdc_amount, 12_500_000);
        assert_eq!(req.fee, 3);
        assert_eq!(req.memo, Memo::default());
    }

    #[test]
    fn test_withdraw_scaling() {
        assert_eq!(WithdrawReq::new(1.0).usdc_amount, 1_000_000);
        assert_eq!(WithdrawReq::new(-1.0).usdc_amount, 0);
    }
}
