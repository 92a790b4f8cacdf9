//! Request types for the user-facing API
//!
//! Requests carry business parameters only. The client fills in the account,
//! API key slot, nonce and expiry from the active identity and
//! [`TransactOpts`].

pub mod account;
pub mod pool;
pub mod trade;

pub use account::{ChangePubKeyReq, TransferReq, WithdrawReq};
pub use pool::{BurnSharesReq, CreatePublicPoolReq, MintSharesReq, UpdatePublicPoolReq};
pub use trade::{
    CancelAllOrdersReq, CancelOrderReq, CreateGroupedOrdersReq, CreateOrderReq, ModifyOrderReq,
    UpdateLeverageReq, UpdateMarginReq,
};

use crate::constants::{NIL_EXPIRY, NIL_NONCE};

/// Per-call overrides of the protocol fields
///
/// `None` means "resolve automatically": the nonce is fetched from the
/// exchange and the expiry defaults to now + 10 minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactOpts {
    pub nonce: Option<i64>,
    pub expired_at: Option<i64>,
    /// Sign for this account instead of the identity's own account
    pub from_account_index: Option<i64>,
    /// Sign with this registered API key instead of the active one
    pub api_key_index: Option<u8>,
}

impl TransactOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw values where -1 means "resolve automatically"
    pub fn from_sentinels(nonce: i64, expired_at: i64) -> Self {
        Self {
            nonce: (nonce != NIL_NONCE).then_some(nonce),
            expired_at: (expired_at != NIL_EXPIRY).then_some(expired_at),
            ..Self::default()
        }
    }

    pub fn with_nonce(mut self, nonce: i64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_expired_at(mut self, expired_at: i64) -> Self {
        self.expired_at = Some(expired_at);
        self
    }

    pub fn with_from_account_index(mut self, account_index: i64) -> Self {
        self.from_account_index = Some(account_index);
        self
    }

    pub fn with_api_key_index(mut self, api_key_index: u8) -> Self {
        self.api_key_index = Some(api_key_index);
        self
    }
}
