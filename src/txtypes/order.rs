//! Order placement, modification and cancellation transactions

use super::{
    check_account_index, check_api_key_index, check_market_index, check_nonce_and_expiry,
    header_sequence, TxInfo,
};
use crate::constants::{
    CANCEL_ALL_ABORT_SCHEDULED, CANCEL_ALL_IMMEDIATE, CANCEL_ALL_SCHEDULED,
    GROUPING_ONE_CANCELS_THE_OTHER, GROUPING_ONE_TRIGGERS_ONE_CANCELS_THE_OTHER,
    GROUPING_ONE_TRIGGERS_THE_OTHER, MAX_CLIENT_ORDER_INDEX, MAX_ORDER_BASE_AMOUNT,
    MAX_ORDER_EXPIRY, MAX_ORDER_INDEX, MAX_ORDER_TYPE, MAX_TIMESTAMP, MAX_TIME_IN_FORCE,
    MIN_ORDER_BASE_AMOUNT, MIN_ORDER_INDEX, MIN_ORDER_PRICE, NIL_CLIENT_ORDER_INDEX,
    NIL_ORDER_EXPIRY, ORDER_TYPE_LIMIT, ORDER_TYPE_MARKET, ORDER_TYPE_STOP_LOSS,
    ORDER_TYPE_STOP_LOSS_LIMIT, ORDER_TYPE_TAKE_PROFIT, ORDER_TYPE_TAKE_PROFIT_LIMIT,
    TX_TYPE_CANCEL_ALL_ORDERS, TX_TYPE_CANCEL_ORDER, TX_TYPE_CREATE_GROUPED_ORDERS,
    TX_TYPE_CREATE_ORDER, TX_TYPE_MODIFY_ORDER,
};
use crate::error::{EncodingError, ValidationError};
use crate::field::FieldSequence;
use serde::Serialize;

// ========== OrderInfo ==========

/// Order fields shared by single and grouped order placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderInfo {
    pub market_index: u8,
    pub client_order_index: i64,
    pub base_amount: i64,
    pub price: u32,
    pub is_ask: u8,
    #[serde(rename = "Type")]
    pub order_type: u8,
    pub time_in_force: u8,
    pub reduce_only: u8,
    pub trigger_price: u32,
    pub order_expiry: i64,
}

impl OrderInfo {
    /// Per-field bounds, in hash order
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_market_index(self.market_index)?;
        if self.client_order_index < NIL_CLIENT_ORDER_INDEX {
            return Err(ValidationError::ClientOrderIndexTooLow);
        }
        if self.client_order_index > MAX_CLIENT_ORDER_INDEX {
            return Err(ValidationError::ClientOrderIndexTooHigh);
        }
        if self.base_amount < MIN_ORDER_BASE_AMOUNT {
            return Err(ValidationError::BaseAmountTooLow);
        }
        if self.base_amount > MAX_ORDER_BASE_AMOUNT {
            return Err(ValidationError::BaseAmountTooHigh);
        }
        if self.price < MIN_ORDER_PRICE {
            return Err(ValidationError::PriceTooLow);
        }
        if self.is_ask > 1 {
            return Err(ValidationError::IsAskInvalid);
        }
        if self.order_type > MAX_ORDER_TYPE {
            return Err(ValidationError::OrderTypeInvalid);
        }
        if self.time_in_force > MAX_TIME_IN_FORCE {
            return Err(ValidationError::TimeInForceInvalid);
        }
        if self.reduce_only > 1 {
            return Err(ValidationError::ReduceOnlyInvalid);
        }
        if !(NIL_ORDER_EXPIRY..=MAX_ORDER_EXPIRY).contains(&self.order_expiry) {
            return Err(ValidationError::OrderExpiryInvalid);
        }
        Ok(())
    }

    fn push_fields(&self, seq: &mut FieldSequence) -> Result<(), EncodingError> {
        seq.push(self.market_index)?
            .push(self.client_order_index)?
            .push(self.base_amount)?
            .push(self.price)?
            .push(self.is_ask)?
            .push(self.order_type)?
            .push(self.time_in_force)?
            .push(self.reduce_only)?
            .push(self.trigger_price)?
            .push(self.order_expiry)?;
        Ok(())
    }

    fn is_trigger(&self) -> bool {
        is_stop_loss(self.order_type) || is_take_profit(self.order_type)
    }
}

fn is_stop_loss(order_type: u8) -> bool {
    order_type == ORDER_TYPE_STOP_LOSS || order_type == ORDER_TYPE_STOP_LOSS_LIMIT
}

fn is_take_profit(order_type: u8) -> bool {
    order_type == ORDER_TYPE_TAKE_PROFIT || order_type == ORDER_TYPE_TAKE_PROFIT_LIMIT
}

// ========== CreateOrder ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateOrderTx {
    pub account_index: i64,
    pub api_key_index: u8,
    #[serde(flatten)]
    pub order: OrderInfo,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for CreateOrderTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CREATE_ORDER
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        self.order.validate()?;
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_CREATE_ORDER,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        self.order.push_fields(&mut seq)?;
        Ok(seq)
    }
}

// ========== CancelOrder ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CancelOrderTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub market_index: u8,
    /// Client order index or exchange order index
    pub index: i64,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for CancelOrderTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CANCEL_ORDER
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        check_market_index(self.market_index)?;
        check_order_index(self.index)?;
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_CANCEL_ORDER,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push(self.market_index)?.push(self.index)?;
        Ok(seq)
    }
}

fn check_order_index(index: i64) -> Result<(), ValidationError> {
    if index < MIN_ORDER_INDEX {
        return Err(ValidationError::OrderIndexTooLow);
    }
    if index > MAX_ORDER_INDEX {
        return Err(ValidationError::OrderIndexTooHigh);
    }
    Ok(())
}

// ========== CancelAllOrders ==========

/// Cancel every open order now, at a scheduled time, or abort a scheduled cancel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CancelAllOrdersTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub time_in_force: u8,
    pub time: i64,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for CancelAllOrdersTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CANCEL_ALL_ORDERS
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        match self.time_in_force {
            CANCEL_ALL_IMMEDIATE | CANCEL_ALL_ABORT_SCHEDULED => {
                if self.time != 0 {
                    return Err(ValidationError::CancelAllTimeInvalid);
                }
            }
            CANCEL_ALL_SCHEDULED => {
                if !(1..=MAX_TIMESTAMP).contains(&self.time) {
                    return Err(ValidationError::CancelAllTimeInvalid);
                }
            }
            _ => return Err(ValidationError::CancelAllTimeInForceInvalid),
        }
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_CANCEL_ALL_ORDERS,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push(self.time_in_force)?.push(self.time)?;
        Ok(seq)
    }
}

// ========== ModifyOrder ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyOrderTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub market_index: u8,
    pub index: i64,
    pub base_amount: i64,
    pub price: u32,
    pub trigger_price: u32,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TxInfo for ModifyOrderTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_MODIFY_ORDER
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        check_market_index(self.market_index)?;
        check_order_index(self.index)?;
        if self.base_amount < MIN_ORDER_BASE_AMOUNT {
            return Err(ValidationError::BaseAmountTooLow);
        }
        if self.base_amount > MAX_ORDER_BASE_AMOUNT {
            return Err(ValidationError::BaseAmountTooHigh);
        }
        if self.price < MIN_ORDER_PRICE {
            return Err(ValidationError::PriceTooLow);
        }
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_MODIFY_ORDER,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push(self.market_index)?
            .push(self.index)?
            .push(self.base_amount)?
            .push(self.price)?
            .push(self.trigger_price)?;
        Ok(seq)
    }
}

// ========== CreateGroupedOrders ==========

/// Two or three linked orders: OTO, OCO or OTOCO
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateGroupedOrdersTx {
    pub account_index: i64,
    pub api_key_index: u8,
    pub grouping_type: u8,
    pub orders: Vec<OrderInfo>,
    pub expired_at: i64,
    pub nonce: i64,
}

impl CreateGroupedOrdersTx {
    fn validate_group(&self) -> Result<(), ValidationError> {
        let expected_legs = match self.grouping_type {
            GROUPING_ONE_TRIGGERS_THE_OTHER | GROUPING_ONE_CANCELS_THE_OTHER => 2,
            GROUPING_ONE_TRIGGERS_ONE_CANCELS_THE_OTHER => 3,
            _ => return Err(ValidationError::GroupingTypeInvalid),
        };
        if self.orders.len() != expected_legs {
            return Err(ValidationError::GroupedOrdersCountInvalid);
        }

        for (leg, order) in self.orders.iter().enumerate() {
            let checked = if order.client_order_index != NIL_CLIENT_ORDER_INDEX {
                Err(ValidationError::ClientOrderIndexNotNil)
            } else {
                order.validate()
            };
            checked.map_err(|e| ValidationError::GroupedOrderLegInvalid {
                leg,
                source: Box::new(e),
            })?;
        }

        let o = &self.orders;
        match self.grouping_type {
            GROUPING_ONE_TRIGGERS_THE_OTHER => check_triggered_leg(&o[0], &o[1], 1),
            GROUPING_ONE_CANCELS_THE_OTHER => {
                check_oco_leg(&o[0], 0)?;
                check_oco_pair(&o[0], &o[1], 1)
            }
            _ => {
                check_parent_leg(&o[0])?;
                check_triggered_leg(&o[0], &o[1], 1)?;
                check_oco_pair(&o[1], &o[2], 2)
            }
        }
    }
}

fn check_parent_leg(parent: &OrderInfo) -> Result<(), ValidationError> {
    if parent.order_type != ORDER_TYPE_LIMIT && parent.order_type != ORDER_TYPE_MARKET {
        return Err(ValidationError::GroupedOrderTypeInvalid { leg: 0 });
    }
    Ok(())
}

/// Checks a leg that closes the position opened by `parent`
fn check_triggered_leg(
    parent: &OrderInfo,
    child: &OrderInfo,
    leg: usize,
) -> Result<(), ValidationError> {
    check_parent_leg(parent)?;
    check_oco_leg(child, leg)?;
    if child.is_ask == parent.is_ask {
        return Err(ValidationError::GroupedOrderDirectionInvalid { leg });
    }
    if child.market_index != parent.market_index {
        return Err(ValidationError::GroupedOrderMarketMismatch { leg });
    }
    Ok(())
}

fn check_oco_leg(order: &OrderInfo, leg: usize) -> Result<(), ValidationError> {
    if !order.is_trigger() {
        return Err(ValidationError::GroupedOrderTypeInvalid { leg });
    }
    if order.reduce_only != 1 {
        return Err(ValidationError::GroupedOrderNotReduceOnly { leg });
    }
    Ok(())
}

/// `first` is already checked; one leg must be stop-loss and the other take-profit
fn check_oco_pair(
    first: &OrderInfo,
    second: &OrderInfo,
    leg: usize,
) -> Result<(), ValidationError> {
    check_oco_leg(second, leg)?;
    if is_stop_loss(first.order_type) == is_stop_loss(second.order_type) {
        return Err(ValidationError::GroupedOrderTypeInvalid { leg });
    }
    if second.is_ask != first.is_ask {
        return Err(ValidationError::GroupedOrderDirectionInvalid { leg });
    }
    if second.market_index != first.market_index {
        return Err(ValidationError::GroupedOrderMarketMismatch { leg });
    }
    Ok(())
}

impl TxInfo for CreateGroupedOrdersTx {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CREATE_GROUPED_ORDERS
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_account_index(self.account_index)?;
        check_api_key_index(self.api_key_index)?;
        self.validate_group()?;
        check_nonce_and_expiry(self.nonce, self.expired_at)
    }

    fn hash_elements(&self, chain_id: u32) -> Result<FieldSequence, EncodingError> {
        let mut seq = header_sequence(
            chain_id,
            TX_TYPE_CREATE_GROUPED_ORDERS,
            self.nonce,
            self.expired_at,
            self.account_index,
            self.api_key_index,
        )?;
        seq.push(self.grouping_type)?.push(self.orders.len() as u64)?;
        for order in &self.orders {
            order.push_fields(&mut seq)?;
        }
        Ok(seq)
    }
}
