//! Wire-level data models for the Kalshi REST and WebSocket APIs. Prices are
//! Kalshi's native integer cents (1-99); nothing here uses `Decimal` since
//! the exchange itself never reports fractional cents.

use algo_trade_core::events::{ExchangeMarket, Position as CorePosition, SettlementStatus, Side as CoreSide};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Market Types
// =============================================================================

/// A Kalshi market (event contract) as returned by `GET /markets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub ticker: String,
    pub event_ticker: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub status: MarketStatus,
    pub yes_bid: Option<u32>,
    pub yes_ask: Option<u32>,
    pub no_bid: Option<u32>,
    pub no_ask: Option<u32>,
    pub last_price: Option<u32>,
    pub volume_24h: Option<u64>,
    pub open_interest: Option<u64>,
    pub close_time: Option<DateTime<Utc>>,
    pub expiration_time: Option<DateTime<Utc>>,
    pub series_ticker: Option<String>,
}

impl Market {
    #[must_use]
    pub fn is_tradeable(&self) -> bool {
        self.status == MarketStatus::Open
    }

    /// Converts this wire market into the domain `ExchangeMarket` the rest
    /// of the engine operates on. Missing quotes default to the undefined
    /// convention used by the order book cache (0 bid, 100 ask).
    pub fn into_exchange_market(self) -> Option<ExchangeMarket> {
        let expiration_time = self.expiration_time?;
        Some(ExchangeMarket {
            ticker: self.ticker,
            title: self.title,
            series: self.series_ticker.unwrap_or_default(),
            expiration_time,
            yes_bid: self.yes_bid.unwrap_or(0),
            yes_ask: self.yes_ask.unwrap_or(100),
            no_bid: self.no_bid.unwrap_or(0),
            no_ask: self.no_ask.unwrap_or(100),
            volume: self.volume_24h.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Open,
    Closed,
    Settled,
    Paused,
}

// =============================================================================
// Order Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    #[must_use]
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl From<CoreSide> for Side {
    fn from(side: CoreSide) -> Self {
        match side {
            CoreSide::Yes => Self::Yes,
            CoreSide::No => Self::No,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

/// IOC is how the evaluator's taker path is submitted: fill what's
/// available immediately, cancel the remainder rather than resting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    ImmediateOrCancel,
    GoodTillCancelled,
}

/// Request to submit an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub ticker: String,
    pub side: Side,
    pub action: Action,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yes_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
}

impl OrderRequest {
    fn new(
        ticker: impl Into<String>,
        side: Side,
        action: Action,
        price_cents: u32,
        count: u32,
        time_in_force: TimeInForce,
    ) -> Self {
        let (yes_price, no_price) = match side {
            Side::Yes => (Some(price_cents), None),
            Side::No => (None, Some(price_cents)),
        };
        Self {
            ticker: ticker.into(),
            side,
            action,
            order_type: OrderType::Limit,
            time_in_force,
            count,
            yes_price,
            no_price,
            client_order_id: None,
        }
    }

    /// A taker buy: limit at `price_cents`, immediate-or-cancel.
    #[must_use]
    pub fn taker_buy(ticker: impl Into<String>, side: Side, price_cents: u32, count: u32) -> Self {
        Self::new(ticker, side, Action::Buy, price_cents, count, TimeInForce::ImmediateOrCancel)
    }

    /// A maker buy: resting limit order at `price_cents`.
    #[must_use]
    pub fn maker_buy(ticker: impl Into<String>, side: Side, price_cents: u32, count: u32) -> Self {
        Self::new(ticker, side, Action::Buy, price_cents, count, TimeInForce::GoodTillCancelled)
    }

    /// A taker sell: limit at `price_cents`, immediate-or-cancel. Used by the bailout controller.
    #[must_use]
    pub fn taker_sell(ticker: impl Into<String>, side: Side, price_cents: u32, count: u32) -> Self {
        Self::new(ticker, side, Action::Sell, price_cents, count, TimeInForce::ImmediateOrCancel)
    }

    /// A maker sell: resting limit order at `price_cents`. Used by the auto-close controller.
    #[must_use]
    pub fn maker_sell(ticker: impl Into<String>, side: Side, price_cents: u32, count: u32) -> Self {
        Self::new(ticker, side, Action::Sell, price_cents, count, TimeInForce::GoodTillCancelled)
    }

    #[must_use]
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn order_value_cents(&self) -> u64 {
        let price = u64::from(self.yes_price.or(self.no_price).unwrap_or(50));
        price * u64::from(self.count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Resting,
    Filled,
    Cancelled,
    PartialFilled,
    Rejected,
}

impl OrderStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::PartialFilled | Self::Rejected)
    }

    #[must_use]
    pub fn has_fills(self) -> bool {
        matches!(self, Self::Filled | Self::PartialFilled)
    }
}

/// Response from order submission or status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub client_order_id: Option<String>,
    pub ticker: String,
    pub side: Side,
    pub action: Action,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub count: u32,
    pub filled_count: u32,
    pub remaining_count: u32,
    pub price: Option<u32>,
    pub avg_fill_price: Option<u32>,
    pub created_time: Option<DateTime<Utc>>,
    pub updated_time: Option<DateTime<Utc>>,
}

impl Order {
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.status == OrderStatus::PartialFilled || (self.filled_count > 0 && self.remaining_count > 0)
    }

    #[must_use]
    pub fn filled_value_cents(&self) -> u64 {
        match self.avg_fill_price {
            Some(price) => u64::from(price) * u64::from(self.filled_count),
            None => 0,
        }
    }
}

// =============================================================================
// Position Types
// =============================================================================

/// A position in a market, as reported by `GET /portfolio/positions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub side: Side,
    pub count: u32,
    pub avg_price: u32,
    pub realized_pnl: Option<i64>,
}

impl Position {
    #[must_use]
    pub fn entry_value_cents(&self) -> u64 {
        u64::from(self.avg_price) * u64::from(self.count)
    }

    /// Converts into the domain `Position` the position tracker merges
    /// into its ledger. `fees_paid` is not reported per-position by the
    /// exchange, so it is zeroed here and accumulated locally instead.
    #[must_use]
    pub fn into_core_position(self) -> CorePosition {
        let core_side = match self.side {
            Side::Yes => CoreSide::Yes,
            Side::No => CoreSide::No,
        };
        CorePosition {
            ticker: self.ticker,
            side: core_side,
            quantity: u64::from(self.count),
            avg_price: self.avg_price,
            cost_basis: self.entry_value_cents(),
            fees_paid: 0,
            settlement_status: SettlementStatus::Unsettled,
            realized_pnl: self.realized_pnl,
        }
    }
}

// =============================================================================
// Orderbook Types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: u32,
    pub count: u32,
}

/// REST orderbook snapshot for a market (the streaming delta channel is
/// consumed separately and applied to [`crate::OrderBookCache`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orderbook {
    pub ticker: String,
    pub yes: Vec<PriceLevel>,
    pub no: Vec<PriceLevel>,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Balance Types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub balance: i64,
    pub available_balance: i64,
    pub reserved_balance: i64,
}

// =============================================================================
// API Response Types
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct MarketsResponse {
    pub markets: Vec<Market>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionsResponse {
    pub market_positions: Vec<Position>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    pub balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_market() -> Market {
        Market {
            ticker: "NBA-LAL-BOS".to_string(),
            event_ticker: "NBA-LAL-BOS-EVT".to_string(),
            title: "Lakers at Celtics Winner?".to_string(),
            subtitle: None,
            status: MarketStatus::Open,
            yes_bid: Some(45),
            yes_ask: Some(47),
            no_bid: Some(53),
            no_ask: Some(55),
            last_price: Some(46),
            volume_24h: Some(500),
            open_interest: Some(1000),
            close_time: None,
            expiration_time: Some(Utc.with_ymd_and_hms(2026, 7, 30, 23, 0, 0).unwrap()),
            series_ticker: Some("NBA".to_string()),
        }
    }

    #[test]
    fn market_is_tradeable_when_open() {
        let market = sample_market();
        assert!(market.is_tradeable());
    }

    #[test]
    fn into_exchange_market_carries_quotes_through() {
        let market = sample_market();
        let exchange_market = market.into_exchange_market().unwrap();
        assert_eq!(exchange_market.yes_bid, 45);
        assert_eq!(exchange_market.no_ask, 55);
    }

    #[test]
    fn into_exchange_market_defaults_missing_quotes() {
        let mut market = sample_market();
        market.yes_bid = None;
        market.yes_ask = None;
        let exchange_market = market.into_exchange_market().unwrap();
        assert_eq!(exchange_market.yes_bid, 0);
        assert_eq!(exchange_market.yes_ask, 100);
    }

    #[test]
    fn into_exchange_market_none_without_expiration() {
        let mut market = sample_market();
        market.expiration_time = None;
        assert!(market.into_exchange_market().is_none());
    }

    #[test]
    fn position_entry_value_matches_price_times_count() {
        let position = Position { ticker: "T".into(), side: Side::Yes, count: 10, avg_price: 45, realized_pnl: None };
        assert_eq!(position.entry_value_cents(), 450);
    }

    #[test]
    fn order_value_cents_uses_set_price() {
        let order = OrderRequest::taker_buy("T", Side::Yes, 60, 5);
        assert_eq!(order.order_value_cents(), 300);
    }

    #[test]
    fn taker_sell_sets_sell_action_and_ioc() {
        let order = OrderRequest::taker_sell("T", Side::No, 30, 5);
        assert_eq!(order.action, Action::Sell);
        assert_eq!(order.time_in_force, TimeInForce::ImmediateOrCancel);
        assert_eq!(order.no_price, Some(30));
        assert_eq!(order.yes_price, None);
    }

    #[test]
    fn maker_sell_sets_sell_action_and_gtc() {
        let order = OrderRequest::maker_sell("T", Side::Yes, 70, 5);
        assert_eq!(order.action, Action::Sell);
        assert_eq!(order.time_in_force, TimeInForce::GoodTillCancelled);
        assert_eq!(order.yes_price, Some(70));
    }
}
