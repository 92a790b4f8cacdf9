//! Public pool request types

use crate::constants::{FEE_TICK, SHARE_TICK};

/// Parameters for creating a public pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatePublicPoolReq {
    /// Operator fee, 1_000_000 = 100%
    pub operator_fee: i64,
    /// Shares minted to the operator at creation
    pub initial_total_shares: i64,
    /// Minimum share of the pool the operator must hold, 10_000 = 100%
    pub min_operator_share_rate: i64,
}

impl CreatePublicPoolReq {
    /// Build from percentages, e.g. `10.0` for a 10% fee
    pub fn from_percent(operator_fee_pct: f64, initial_total_shares: i64, min_share_pct: f64) -> Self {
        Self {
            operator_fee: percent_to_ticks(operator_fee_pct, FEE_TICK),
            initial_total_shares,
            min_operator_share_rate: percent_to_ticks(min_share_pct, SHARE_TICK),
        }
    }
}

/// Parameters for updating a public pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePublicPoolReq {
    pub public_pool_index: i64,
    /// 0 active, 1 frozen
    pub status: u8,
    pub operator_fee: i64,
    pub min_operator_share_rate: i64,
}

/// Deposit into a public pool in exchange for shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintSharesReq {
    pub public_pool_index: i64,
    pub share_amount: i64,
}

/// Redeem shares of a public pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnSharesReq {
    pub public_pool_index: i64,
    pub share_amount: i64,
}

fn percent_to_ticks(pct: f64, tick: i64) -> i64 {
    (pct / 100.0 * tick as f64).round() as i64
}
