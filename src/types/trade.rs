//! Trading request types

use crate::constants::{
    GROUPING_ONE_CANCELS_THE_OTHER, GROUPING_ONE_TRIGGERS_ONE_CANCELS_THE_OTHER,
    GROUPING_ONE_TRIGGERS_THE_OTHER, MARGIN_MODE_CROSS, MARGIN_MODE_ISOLATED,
    NIL_CLIENT_ORDER_INDEX, NIL_EXPIRY, NIL_ORDER_EXPIRY, NIL_TRIGGER_PRICE, ORDER_TYPE_LIMIT,
    ORDER_TYPE_MARKET, ORDER_TYPE_STOP_LOSS, ORDER_TYPE_STOP_LOSS_LIMIT, ORDER_TYPE_TAKE_PROFIT,
    ORDER_TYPE_TAKE_PROFIT_LIMIT, TIME_IN_FORCE_GOOD_TILL_TIME,
    TIME_IN_FORCE_IMMEDIATE_OR_CANCEL,
};
use crate::txtypes::OrderInfo;

/// Parameters for placing an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderReq {
    /// Market index (e.g., 0 = ETH perp)
    pub market_index: u8,
    /// Caller-chosen order id, 0 for none
    pub client_order_index: i64,
    /// Size in base asset ticks
    pub base_amount: i64,
    /// Limit price, or worst acceptable price for market orders
    pub price: u32,
    /// True to sell
    pub is_ask: bool,
    pub order_type: u8,
    pub time_in_force: u8,
    pub reduce_only: bool,
    /// Trigger price for stop-loss / take-profit orders, 0 for none
    pub trigger_price: u32,
    /// Order expiry in Unix ms; -1 applies the default (now + 28 days), 0 for none
    pub order_expiry: i64,
}

impl CreateOrderReq {
    /// Good-till-time limit order expiring after the default horizon
    pub fn limit(market_index: u8, base_amount: i64, price: u32, is_ask: bool) -> Self {
        Self {
            market_index,
            client_order_index: NIL_CLIENT_ORDER_INDEX,
            base_amount,
            price,
            is_ask,
            order_type: ORDER_TYPE_LIMIT,
            time_in_force: TIME_IN_FORCE_GOOD_TILL_TIME,
            reduce_only: false,
            trigger_price: NIL_TRIGGER_PRICE,
            order_expiry: NIL_EXPIRY,
        }
    }

    /// Immediate-or-cancel market order; `price` is the worst acceptable price
    pub fn market(market_index: u8, base_amount: i64, price: u32, is_ask: bool) -> Self {
        Self {
            order_type: ORDER_TYPE_MARKET,
            time_in_force: TIME_IN_FORCE_IMMEDIATE_OR_CANCEL,
            order_expiry: NIL_ORDER_EXPIRY,
            ..Self::limit(market_index, base_amount, price, is_ask)
        }
    }

    /// Reduce-only stop-loss market order
    pub fn stop_loss(
        market_index: u8,
        base_amount: i64,
        trigger_price: u32,
        price: u32,
        is_ask: bool,
    ) -> Self {
        Self::trigger(ORDER_TYPE_STOP_LOSS, market_index, base_amount, trigger_price, price, is_ask)
    }

    /// Reduce-only stop-loss limit order
    pub fn stop_loss_limit(
        market_index: u8,
        base_amount: i64,
        trigger_price: u32,
        price: u32,
        is_ask: bool,
    ) -> Self {
        Self::trigger(ORDER_TYPE_STOP_LOSS_LIMIT, market_index, base_amount, trigger_price, price, is_ask)
    }

    /// Reduce-only take-profit market order
    pub fn take_profit(
        market_index: u8,
        base_amount: i64,
        trigger_price: u32,
        price: u32,
        is_ask: bool,
    ) -> Self {
        Self::trigger(ORDER_TYPE_TAKE_PROFIT, market_index, base_amount, trigger_price, price, is_ask)
    }

    /// Reduce-only take-profit limit order
    pub fn take_profit_limit(
        market_index: u8,
        base_amount: i64,
        trigger_price: u32,
        price: u32,
        is_ask: bool,
    ) -> Self {
        Self::trigger(ORDER_TYPE_TAKE_PROFIT_LIMIT, market_index, base_amount, trigger_price, price, is_ask)
    }

    fn trigger(
        order_type: u8,
        market_index: u8,
        base_amount: i64,
        trigger_price: u32,
        price: u32,
        is_ask: bool,
    ) -> Self {
        let time_in_force = if order_type == ORDER_TYPE_STOP_LOSS || order_type == ORDER_TYPE_TAKE_PROFIT {
            TIME_IN_FORCE_IMMEDIATE_OR_CANCEL
        } else {
            TIME_IN_FORCE_GOOD_TILL_TIME
        };
        Self {
            order_type,
            time_in_force,
            reduce_only: true,
            trigger_price,
            ..Self::limit(market_index, base_amount, price, is_ask)
        }
    }

    pub fn with_client_order_index(mut self, client_order_index: i64) -> Self {
        self.client_order_index = client_order_index;
        self
    }

    pub fn with_time_in_force(mut self, time_in_force: u8) -> Self {
        self.time_in_force = time_in_force;
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn with_order_expiry(mut self, order_expiry: i64) -> Self {
        self.order_expiry = order_expiry;
        self
    }

    /// Convert to the signed order layout with a resolved expiry
    pub fn to_order_info(&self, order_expiry: i64) -> OrderInfo {
        OrderInfo {
            market_index: self.market_index,
            client_order_index: self.client_order_index,
            base_amount: self.base_amount,
            price: self.price,
            is_ask: self.is_ask as u8,
            order_type: self.order_type,
            time_in_force: self.time_in_force,
            reduce_only: self.reduce_only as u8,
            trigger_price: self.trigger_price,
            order_expiry,
        }
    }
}

/// Two or three linked orders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupedOrdersReq {
    pub grouping_type: u8,
    /// Legs in protocol order; client order indices are ignored
    pub orders: Vec<CreateOrderReq>,
}

impl CreateGroupedOrdersReq {
    /// Entry order that arms a closing trigger order once filled
    pub fn one_triggers_the_other(entry: CreateOrderReq, trigger: CreateOrderReq) -> Self {
        Self {
            grouping_type: GROUPING_ONE_TRIGGERS_THE_OTHER,
            orders: vec![entry, trigger],
        }
    }

    /// Stop-loss and take-profit pair where filling one cancels the other
    pub fn one_cancels_the_other(first: CreateOrderReq, second: CreateOrderReq) -> Self {
        Self {
            grouping_type: GROUPING_ONE_CANCELS_THE_OTHER,
            orders: vec![first, second],
        }
    }

    /// Entry order with an attached stop-loss / take-profit pair
    pub fn one_triggers_one_cancels_the_other(
        entry: CreateOrderReq,
        first: CreateOrderReq,
        second: CreateOrderReq,
    ) -> Self {
        Self {
            grouping_type: GROUPING_ONE_TRIGGERS_ONE_CANCELS_THE_OTHER,
            orders: vec![entry, first, second],
        }
    }
}

/// Cancel a single order by client or exchange order index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelOrderReq {
    pub market_index: u8,
    pub index: i64,
}

/// Cancel all open orders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelAllOrdersReq {
    /// 0 immediate, 1 scheduled, 2 abort scheduled
    pub time_in_force: u8,
    /// Scheduled time in Unix ms; 0 unless scheduled
    pub time: i64,
}

/// Change price, size or trigger of an open order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyOrderReq {
    pub market_index: u8,
    pub index: i64,
    pub base_amount: i64,
    pub price: u32,
    pub trigger_price: u32,
}

/// Set leverage for a market
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateLeverageReq {
    pub market_index: u8,
    /// Initial margin fraction, 10_000 = 100% (1x)
    pub initial_margin_fraction: u16,
    pub margin_mode: u8,
}

impl UpdateLeverageReq {
    /// Cross-margin leverage, e.g. `10` for 10x
    pub fn cross(market_index: u8, leverage: u16) -> Self {
        Self {
            market_index,
            initial_margin_fraction: leverage_to_margin_fraction(leverage),
            margin_mode: MARGIN_MODE_CROSS,
        }
    }

    /// Isolated-margin leverage, e.g. `10` for 10x
    pub fn isolated(market_index: u8, leverage: u16) -> Self {
        Self {
            margin_mode: MARGIN_MODE_ISOLATED,
            ..Self::cross(market_index, leverage)
        }
    }
}

fn leverage_to_margin_fraction(leverage: u16) -> u16 {
    10_000u16.checked_div(leverage).unwrap_or(0)
}

/// Add or remove isolated margin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateMarginReq {
    pub market_index: u8,
    /// USDC with 6 decimals; negative removes margin
    pub usdc_amount: i64,
    pub direction: u8,
}
