//! Error types for the Lighter SDK
//!
//! Uses `eyre` for ergonomic error handling with context at the client and
//! transport surface. The typed errors below ride inside a [`Report`] and can
//! be recovered with `report.downcast_ref::<ValidationError>()` and friends.

pub use eyre::{eyre, Context, Report, Result};

use thiserror::Error;

/// A transaction field is outside its protocol bounds.
///
/// Each variant names the first failing check. Checks run in a fixed order per
/// transaction kind, so the same input always yields the same variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("from account index is too low")]
    FromAccountIndexTooLow,
    #[error("from account index is too high")]
    FromAccountIndexTooHigh,
    #[error("to account index is too low")]
    ToAccountIndexTooLow,
    #[error("to account index is too high")]
    ToAccountIndexTooHigh,
    #[error("api key index is too high")]
    ApiKeyIndexTooHigh,
    #[error("market index is too high")]
    MarketIndexTooHigh,
    #[error("nonce is too low")]
    NonceTooLow,
    #[error("expired at is invalid")]
    ExpiredAtInvalid,

    // Orders
    #[error("client order index is too low")]
    ClientOrderIndexTooLow,
    #[error("client order index is too high")]
    ClientOrderIndexTooHigh,
    #[error("client order index must be nil for grouped orders")]
    ClientOrderIndexNotNil,
    #[error("order index is too low")]
    OrderIndexTooLow,
    #[error("order index is too high")]
    OrderIndexTooHigh,
    #[error("base amount is too low")]
    BaseAmountTooLow,
    #[error("base amount is too high")]
    BaseAmountTooHigh,
    #[error("price is too low")]
    PriceTooLow,
    #[error("is ask flag is invalid")]
    IsAskInvalid,
    #[error("order type is invalid")]
    OrderTypeInvalid,
    #[error("time in force is invalid")]
    TimeInForceInvalid,
    #[error("reduce only flag is invalid")]
    ReduceOnlyInvalid,
    #[error("order expiry is invalid")]
    OrderExpiryInvalid,
    #[error("cancel all time in force is invalid")]
    CancelAllTimeInForceInvalid,
    #[error("cancel all time is invalid")]
    CancelAllTimeInvalid,

    // Grouped orders
    #[error("grouping type is invalid")]
    GroupingTypeInvalid,
    #[error("grouped orders count is invalid")]
    GroupedOrdersCountInvalid,
    #[error("grouped order leg {leg} has an invalid order type")]
    GroupedOrderTypeInvalid { leg: usize },
    #[error("grouped order leg {leg} must be reduce only")]
    GroupedOrderNotReduceOnly { leg: usize },
    #[error("grouped order leg {leg} has an invalid direction")]
    GroupedOrderDirectionInvalid { leg: usize },
    #[error("grouped order leg {leg} has a different market")]
    GroupedOrderMarketMismatch { leg: usize },
    #[error("grouped order leg {leg}: {source}")]
    GroupedOrderLegInvalid {
        leg: usize,
        #[source]
        source: Box<ValidationError>,
    },

    // USDC movements
    #[error("usdc amount is zero")]
    USDCAmountIsZero,
    #[error("usdc amount is too low")]
    USDCAmountTooLow,
    #[error("usdc amount is too high")]
    USDCAmountTooHigh,
    #[error("transfer fee is too low")]
    TransferFeeTooLow,
    #[error("transfer fee is too high")]
    TransferFeeTooHigh,
    #[error("memo must be exactly 32 bytes or empty")]
    MemoInvalid,

    // Keys and leverage
    #[error("public key is invalid")]
    PubKeyInvalid,
    #[error("initial margin fraction is too low")]
    InitialMarginFractionTooLow,
    #[error("initial margin fraction is too high")]
    InitialMarginFractionTooHigh,
    #[error("margin mode is invalid")]
    MarginModeInvalid,

    // Public pools
    #[error("public pool index is too low")]
    PublicPoolIndexTooLow,
    #[error("public pool index is too high")]
    PublicPoolIndexTooHigh,
    #[error("public pool status is invalid")]
    PublicPoolStatusInvalid,
    #[error("operator fee is too low")]
    OperatorFeeTooLow,
    #[error("operator fee is too high")]
    OperatorFeeTooHigh,
    #[error("initial total shares is too low")]
    InitialTotalSharesTooLow,
    #[error("initial total shares is too high")]
    InitialTotalSharesTooHigh,
    #[error("min operator share rate is too low")]
    MinOperatorShareRateTooLow,
    #[error("min operator share rate is too high")]
    MinOperatorShareRateTooHigh,
    #[error("share amount is too low")]
    ShareAmountTooLow,
    #[error("share amount is too high")]
    ShareAmountTooHigh,
}

/// A validated value failed to map into the field.
///
/// This signals a broken invariant inside the SDK (validation should have
/// rejected the value first), not a user mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("signed value {0} is outside the encodable field range")]
    SignedOutOfRange(i64),
    #[error("unsigned value {0} is not below the field order")]
    UnsignedOutOfRange(u64),
}

/// The operation referenced a signing identity that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("no client initialized for api key {0}")]
    NotRegistered(u8),
    #[error("client is not created, register an api key first")]
    NoActiveIdentity,
    #[error("accountIndex does not match. expected {expected} but got {actual}")]
    AccountIndexMismatch { expected: i64, actual: i64 },
    #[error("private key does not match the one registered on the exchange. own: {own}, registered: {registered}")]
    PublicKeyMismatch { own: String, registered: String },
}

/// Network, timeout or non-success response from the exchange API.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{message}")]
    Api { code: i32, message: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// Render a report as a single line including its cause chain.
pub fn error_string(report: &Report) -> String {
    format!("{report:#}")
}
