//! Protocol constants and bounds for the Lighter SDK
//!
//! Every numeric field of every transaction kind is range-checked against
//! these values before it is encoded or hashed.

use std::time::Duration;

// ========== Networks ==========

/// Chain ID of Lighter mainnet
pub const MAINNET_CHAIN_ID: u32 = 304;

/// Chain ID of Lighter testnet
pub const TESTNET_CHAIN_ID: u32 = 300;

/// Mainnet API endpoint
pub const MAINNET_URL: &str = "https://mainnet.zklighter.elliot.ai";

/// Testnet API endpoint
pub const TESTNET_URL: &str = "https://testnet.zklighter.elliot.ai";

// ========== Transaction type tags ==========

pub const TX_TYPE_CHANGE_PUB_KEY: u8 = 8;
pub const TX_TYPE_CREATE_SUB_ACCOUNT: u8 = 9;
pub const TX_TYPE_CREATE_PUBLIC_POOL: u8 = 10;
pub const TX_TYPE_UPDATE_PUBLIC_POOL: u8 = 11;
pub const TX_TYPE_TRANSFER: u8 = 12;
pub const TX_TYPE_WITHDRAW: u8 = 13;
pub const TX_TYPE_CREATE_ORDER: u8 = 14;
pub const TX_TYPE_CANCEL_ORDER: u8 = 15;
pub const TX_TYPE_CANCEL_ALL_ORDERS: u8 = 16;
pub const TX_TYPE_MODIFY_ORDER: u8 = 17;
pub const TX_TYPE_MINT_SHARES: u8 = 18;
pub const TX_TYPE_BURN_SHARES: u8 = 19;
pub const TX_TYPE_UPDATE_LEVERAGE: u8 = 20;
pub const TX_TYPE_CREATE_GROUPED_ORDERS: u8 = 28;
pub const TX_TYPE_UPDATE_MARGIN: u8 = 29;

// ========== Accounts and keys ==========

/// Account indices must be strictly greater than this
pub const MIN_ACCOUNT_INDEX: i64 = 0;

/// Highest valid account index, 2^48 - 2
pub const MAX_ACCOUNT_INDEX: i64 = (1 << 48) - 2;

/// Highest master account index, 2^47 - 1
pub const MAX_MASTER_ACCOUNT_INDEX: i64 = (1 << 47) - 1;

/// Sub-accounts and public pools start right after the master range
pub const MIN_SUB_ACCOUNT_INDEX: i64 = MAX_MASTER_ACCOUNT_INDEX + 1;

/// Highest usable API key slot
pub const MAX_API_KEY_INDEX: u8 = 254;

/// Reserved "no API key" slot
pub const NIL_API_KEY_INDEX: u8 = 255;

/// Length of an L2 public key in bytes
pub const PUB_KEY_LENGTH: usize = 40;

/// Length of a transfer memo in bytes
pub const MEMO_LENGTH: usize = 32;

// ========== Nonce and expiry ==========

/// Lowest valid nonce
pub const MIN_NONCE: i64 = 0;

/// Nonce sentinel meaning "fetch the next nonce from the exchange"
pub const NIL_NONCE: i64 = -1;

/// Highest valid millisecond timestamp, 2^48 - 1
pub const MAX_TIMESTAMP: i64 = (1 << 48) - 1;

/// Expiry sentinel meaning "apply the default horizon"
pub const NIL_EXPIRY: i64 = -1;

/// Default transaction expiry horizon
pub const DEFAULT_TX_EXPIRY: Duration = Duration::from_secs(10 * 60);

/// Default order expiry horizon (28 days)
pub const DEFAULT_ORDER_EXPIRY: Duration = Duration::from_secs(28 * 24 * 60 * 60);

/// Default auth token lifetime (7 hours)
pub const DEFAULT_AUTH_TOKEN_EXPIRY: Duration = Duration::from_secs(7 * 60 * 60);

/// Type slot used when hashing auth token messages; no transaction uses it
pub const AUTH_TOKEN_DOMAIN_TAG: u8 = 0;

// ========== Markets and orders ==========

/// Highest market index, 255 is reserved as nil
pub const MAX_MARKET_INDEX: u8 = 254;

pub const NIL_CLIENT_ORDER_INDEX: i64 = 0;
pub const MIN_CLIENT_ORDER_INDEX: i64 = 1;
pub const MAX_CLIENT_ORDER_INDEX: i64 = (1 << 48) - 1;

/// Cancel and modify accept either a client order index or an exchange order index
pub const MIN_ORDER_INDEX: i64 = MIN_CLIENT_ORDER_INDEX;
pub const MAX_ORDER_INDEX: i64 = (1 << 56) - 1;

pub const MIN_ORDER_BASE_AMOUNT: i64 = 1;
pub const MAX_ORDER_BASE_AMOUNT: i64 = (1 << 48) - 1;

pub const MIN_ORDER_PRICE: u32 = 1;

pub const NIL_TRIGGER_PRICE: u32 = 0;

pub const NIL_ORDER_EXPIRY: i64 = 0;
pub const MAX_ORDER_EXPIRY: i64 = MAX_TIMESTAMP;

pub const ORDER_TYPE_LIMIT: u8 = 0;
pub const ORDER_TYPE_MARKET: u8 = 1;
pub const ORDER_TYPE_STOP_LOSS: u8 = 2;
pub const ORDER_TYPE_STOP_LOSS_LIMIT: u8 = 3;
pub const ORDER_TYPE_TAKE_PROFIT: u8 = 4;
pub const ORDER_TYPE_TAKE_PROFIT_LIMIT: u8 = 5;
pub const ORDER_TYPE_TWAP: u8 = 6;
pub const MAX_ORDER_TYPE: u8 = ORDER_TYPE_TWAP;

pub const TIME_IN_FORCE_IMMEDIATE_OR_CANCEL: u8 = 0;
pub const TIME_IN_FORCE_GOOD_TILL_TIME: u8 = 1;
pub const TIME_IN_FORCE_POST_ONLY: u8 = 2;
pub const MAX_TIME_IN_FORCE: u8 = TIME_IN_FORCE_POST_ONLY;

pub const CANCEL_ALL_IMMEDIATE: u8 = 0;
pub const CANCEL_ALL_SCHEDULED: u8 = 1;
pub const CANCEL_ALL_ABORT_SCHEDULED: u8 = 2;

pub const GROUPING_ONE_TRIGGERS_THE_OTHER: u8 = 1;
pub const GROUPING_ONE_CANCELS_THE_OTHER: u8 = 2;
pub const GROUPING_ONE_TRIGGERS_ONE_CANCELS_THE_OTHER: u8 = 3;

// ========== USDC and margin ==========

/// USDC amounts use 6 decimals
pub const USDC_DECIMALS: u8 = 6;

pub const MIN_TRANSFER_AMOUNT: i64 = 1;
pub const MAX_TRANSFER_AMOUNT: i64 = (1 << 60) - 1;
pub const MIN_TRANSFER_FEE: i64 = 0;
pub const MAX_TRANSFER_FEE: i64 = (1 << 60) - 1;

pub const MIN_WITHDRAWAL_AMOUNT: u64 = 1;
pub const MAX_WITHDRAWAL_AMOUNT: u64 = (1 << 60) - 1;

/// Absolute bound on a margin update, positive adds and negative removes
pub const MAX_UPDATE_MARGIN_AMOUNT: i64 = (1 << 60) - 1;

/// Initial margin fraction uses 4 decimals, 10_000 = 100%
pub const MIN_INITIAL_MARGIN_FRACTION: u16 = 1;
pub const MAX_INITIAL_MARGIN_FRACTION: u16 = 10_000;

pub const MARGIN_MODE_CROSS: u8 = 0;
pub const MARGIN_MODE_ISOLATED: u8 = 1;

// ========== Public pools ==========

/// Fee tick, 1_000_000 = 100%
pub const FEE_TICK: i64 = 1_000_000;
pub const MIN_OPERATOR_FEE: i64 = 0;
pub const MAX_OPERATOR_FEE: i64 = FEE_TICK;

/// Share rate tick, 10_000 = 100%
pub const SHARE_TICK: i64 = 10_000;
pub const MIN_OPERATOR_SHARE_RATE: i64 = 0;
pub const MAX_OPERATOR_SHARE_RATE: i64 = SHARE_TICK;

pub const MIN_INITIAL_TOTAL_SHARES: i64 = 1;
pub const MAX_INITIAL_TOTAL_SHARES: i64 = (1 << 60) - 1;

pub const MIN_POOL_SHARES: i64 = 1;
pub const MAX_POOL_SHARES: i64 = (1 << 60) - 1;

pub const PUBLIC_POOL_STATUS_ACTIVE: u8 = 0;
pub const PUBLIC_POOL_STATUS_FROZEN: u8 = 1;

/// Scale a USDC amount to its 6-decimal integer representation
pub fn scale_usdc(amount: f64) -> i64 {
    (amount * 10f64.powi(USDC_DECIMALS as i32)).round() as i64
}

/// Unscale a 6-decimal USDC integer to a floating point amount
pub fn unscale_usdc(amount: i64) -> f64 {
    amount as f64 / 10f64.powi(USDC_DECIMALS as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_usdc() {
        // 100 USDC = 100_000_000 (6 decimals)
        assert_eq!(scale_usdc(100.0), 100_000_000);
        // 0.5 USDC = 500_000
        assert_eq!(scale_usdc(0.5), 500_000);
        assert_eq!(scale_usdc(-2.25), -2_250_000);
    }

    #[test]
    fn test_unscale_usdc() {
        assert_eq!(unscale_usdc(1_500_000), 1.5);
    }

    #[test]
    fn test_account_ranges_do_not_overlap() {
        assert!(MAX_MASTER_ACCOUNT_INDEX < MIN_SUB_ACCOUNT_INDEX);
        assert!(MIN_SUB_ACCOUNT_INDEX <= MAX_ACCOUNT_INDEX);
        assert!(MAX_CLIENT_ORDER_INDEX < MAX_ORDER_INDEX);
    }
}
