//! Kalshi REST API client with rate limiting.
//!
//! Provides typed access to Kalshi API endpoints with automatic
//! rate limiting using the governor crate. Wire responses are decoded into
//! `Raw*` structs, then converted into the plain-integer-cents types in
//! [`crate::types`] — Kalshi's own wire format is already integer cents, so
//! no `Decimal` appears anywhere past this boundary.

use crate::auth::{KalshiAuth, KalshiAuthConfig};
use crate::error::{KalshiError, Result};
use crate::types::{
    Balance, Market, MarketStatus, Order, OrderRequest, Orderbook, Position, PriceLevel,
};
use chrono::{DateTime, Utc};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

// =============================================================================
// Constants
// =============================================================================

pub const KALSHI_PROD_URL: &str = "https://trading-api.kalshi.com/trade-api/v2";
pub const KALSHI_DEMO_URL: &str = "https://demo-api.kalshi.co/trade-api/v2";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Kalshi client.
#[derive(Debug, Clone)]
pub struct KalshiClientConfig {
    pub base_url: String,
    pub auth_config: KalshiAuthConfig,
    pub requests_per_minute: NonZeroU32,
    pub timeout_secs: u64,
}

impl Default for KalshiClientConfig {
    fn default() -> Self {
        Self {
            base_url: KALSHI_PROD_URL.to_string(),
            auth_config: KalshiAuthConfig::default(),
            requests_per_minute: nonzero!(60u32),
            timeout_secs: 30,
        }
    }
}

impl KalshiClientConfig {
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn demo() -> Self {
        Self {
            base_url: KALSHI_DEMO_URL.to_string(),
            auth_config: KalshiAuthConfig::demo(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_auth_config(mut self, config: KalshiAuthConfig) -> Self {
        self.auth_config = config;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// =============================================================================
// Wire response types
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
struct RawMarketsResponse {
    markets: Option<Vec<RawMarket>>,
    #[allow(dead_code)]
    cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMarket {
    ticker: String,
    event_ticker: String,
    series_ticker: Option<String>,
    title: Option<String>,
    subtitle: Option<String>,
    status: Option<String>,
    yes_bid: Option<u32>,
    yes_ask: Option<u32>,
    no_bid: Option<u32>,
    no_ask: Option<u32>,
    last_price: Option<u32>,
    volume_24h: Option<u64>,
    open_interest: Option<u64>,
    close_time: Option<String>,
    expiration_time: Option<String>,
}

impl From<RawMarket> for Market {
    fn from(raw: RawMarket) -> Self {
        let status = match raw.status.as_deref() {
            Some("open") => MarketStatus::Open,
            Some("settled") => MarketStatus::Settled,
            Some("paused") => MarketStatus::Paused,
            _ => MarketStatus::Closed,
        };

        Self {
            ticker: raw.ticker,
            event_ticker: raw.event_ticker,
            title: raw.title.unwrap_or_default(),
            subtitle: raw.subtitle,
            status,
            yes_bid: raw.yes_bid,
            yes_ask: raw.yes_ask,
            no_bid: raw.no_bid,
            no_ask: raw.no_ask,
            last_price: raw.last_price,
            volume_24h: raw.volume_24h,
            open_interest: raw.open_interest,
            close_time: raw.close_time.and_then(|s| parse_rfc3339(&s)),
            expiration_time: raw.expiration_time.and_then(|s| parse_rfc3339(&s)),
            series_ticker: raw.series_ticker,
        }
    }
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[derive(Debug, Clone, Deserialize)]
struct RawOrderbookResponse {
    orderbook: Option<RawOrderbook>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawOrderbook {
    yes: Option<Vec<Vec<u32>>>,
    no: Option<Vec<Vec<u32>>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBalanceResponse {
    balance: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPositionsResponse {
    market_positions: Option<Vec<RawPosition>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPosition {
    ticker: String,
    side: Option<String>,
    position: Option<i64>,
    market_exposure: Option<i64>,
    realized_pnl: Option<i64>,
}

impl From<RawPosition> for Position {
    fn from(raw: RawPosition) -> Self {
        use crate::types::Side;

        let count = raw.position.unwrap_or(0).unsigned_abs() as u32;
        let avg_price = if count == 0 {
            0
        } else {
            (raw.market_exposure.unwrap_or(0).unsigned_abs() as u32) / count
        };

        Self {
            ticker: raw.ticker,
            side: if raw.side.as_deref() == Some("no") {
                Side::No
            } else {
                Side::Yes
            },
            count,
            avg_price,
            realized_pnl: raw.realized_pnl,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawOrderResponse {
    order: Option<RawOrder>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawOrder {
    order_id: String,
    client_order_id: Option<String>,
    ticker: String,
    side: Option<String>,
    action: Option<String>,
    #[serde(rename = "type")]
    order_type: Option<String>,
    status: Option<String>,
    count: Option<u32>,
    filled_count: Option<u32>,
    remaining_count: Option<u32>,
    yes_price: Option<u32>,
    no_price: Option<u32>,
    avg_fill_price: Option<u32>,
    created_time: Option<String>,
    updated_time: Option<String>,
}

impl From<RawOrder> for Order {
    fn from(raw: RawOrder) -> Self {
        use crate::types::{Action, OrderStatus, OrderType, Side};

        let side = match raw.side.as_deref() {
            Some("no") => Side::No,
            _ => Side::Yes,
        };

        let action = match raw.action.as_deref() {
            Some("sell") => Action::Sell,
            _ => Action::Buy,
        };

        let order_type = match raw.order_type.as_deref() {
            Some("market") => OrderType::Market,
            _ => OrderType::Limit,
        };

        let status = match raw.status.as_deref() {
            Some("resting") => OrderStatus::Resting,
            Some("filled") => OrderStatus::Filled,
            Some("canceled") | Some("cancelled") => OrderStatus::Cancelled,
            Some("partial_filled") => OrderStatus::PartialFilled,
            Some("rejected") => OrderStatus::Rejected,
            _ => OrderStatus::Pending,
        };

        Self {
            order_id: raw.order_id,
            client_order_id: raw.client_order_id,
            ticker: raw.ticker,
            side,
            action,
            order_type,
            status,
            count: raw.count.unwrap_or(0),
            filled_count: raw.filled_count.unwrap_or(0),
            remaining_count: raw.remaining_count.unwrap_or(0),
            price: raw.yes_price.or(raw.no_price),
            avg_fill_price: raw.avg_fill_price,
            created_time: raw.created_time.and_then(|s| parse_rfc3339(&s)),
            updated_time: raw.updated_time.and_then(|s| parse_rfc3339(&s)),
        }
    }
}

// =============================================================================
// KalshiClient
// =============================================================================

pub struct KalshiClient {
    config: KalshiClientConfig,
    http: Client,
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
    auth: KalshiAuth,
}

impl std::fmt::Debug for KalshiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KalshiClient")
            .field("base_url", &self.config.base_url)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl KalshiClient {
    /// # Errors
    /// Returns an error if authentication setup fails.
    pub fn new(config: KalshiClientConfig) -> Result<Self> {
        let auth = KalshiAuth::from_env(config.auth_config.clone())?;

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KalshiError::Network(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
            auth,
        })
    }

    /// # Errors
    /// Returns an error if authentication setup fails.
    pub fn production() -> Result<Self> {
        Self::new(KalshiClientConfig::production())
    }

    /// # Errors
    /// Returns an error if authentication setup fails.
    pub fn demo() -> Result<Self> {
        Self::new(KalshiClientConfig::demo())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn validate_ticker(ticker: &str) -> Result<&str> {
        if ticker.contains("..") || ticker.contains('/') || ticker.contains('\\') {
            return Err(KalshiError::InvalidOrder(format!(
                "invalid ticker: contains forbidden characters: {ticker}"
            )));
        }
        if ticker.is_empty() {
            return Err(KalshiError::InvalidOrder("ticker cannot be empty".to_string()));
        }
        if !ticker.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(KalshiError::InvalidOrder(format!(
                "invalid ticker: must contain only alphanumeric, hyphen, or underscore: {ticker}"
            )));
        }
        if ticker.len() > 64 {
            return Err(KalshiError::InvalidOrder(format!(
                "invalid ticker: exceeds maximum length of 64: {}",
                ticker.len()
            )));
        }
        Ok(ticker)
    }

    fn validate_identifier(id: &str) -> Result<&str> {
        if id.contains("..") || id.contains('/') || id.contains('\\') {
            return Err(KalshiError::InvalidOrder(format!(
                "invalid identifier: contains forbidden characters: {id}"
            )));
        }
        if id.is_empty() {
            return Err(KalshiError::InvalidOrder("identifier cannot be empty".to_string()));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(KalshiError::InvalidOrder(format!(
                "invalid identifier: must contain only alphanumeric, hyphen, or underscore: {id}"
            )));
        }
        if id.len() > 128 {
            return Err(KalshiError::InvalidOrder(format!(
                "invalid identifier: exceeds maximum length of 128: {}",
                id.len()
            )));
        }
        Ok(id)
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, path);
        let headers = self.auth.sign_request("GET", path, "")?;

        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .header(headers.as_tuples()[0].0, headers.as_tuples()[0].1)
            .header(headers.as_tuples()[1].0, headers.as_tuples()[1].1)
            .header(headers.as_tuples()[2].0, headers.as_tuples()[2].1)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn post<T: serde::de::DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, path);
        let body_json = serde_json::to_string(body)?;
        let headers = self.auth.sign_request("POST", path, &body_json)?;

        tracing::debug!("POST {} body_len={}", url, body_json.len());

        let response = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header(headers.as_tuples()[0].0, headers.as_tuples()[0].1)
            .header(headers.as_tuples()[1].0, headers.as_tuples()[1].1)
            .header(headers.as_tuples()[2].0, headers.as_tuples()[2].1)
            .body(body_json)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, path);
        let headers = self.auth.sign_request("DELETE", path, "")?;

        tracing::debug!("DELETE {}", url);

        let response = self
            .http
            .delete(&url)
            .header("Accept", "application/json")
            .header(headers.as_tuples()[0].0, headers.as_tuples()[0].1)
            .header(headers.as_tuples()[1].0, headers.as_tuples()[1].1)
            .header(headers.as_tuples()[2].0, headers.as_tuples()[2].1)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            // The order is already gone; cancel is idempotent.
            return Ok(());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(KalshiError::api(status.as_u16(), text));
        }

        Ok(())
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(KalshiError::rate_limit(retry_after));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(KalshiError::api(status.as_u16(), text));
        }

        let body = response.json::<T>().await?;
        Ok(body)
    }

    // =========================================================================
    // Market Endpoints
    // =========================================================================

    /// `GET /markets`, filtered by series ticker and/or status.
    ///
    /// # Errors
    /// Returns an error if the API call fails.
    pub async fn get_markets(&self, series_ticker: Option<&str>, status: Option<&str>) -> Result<Vec<Market>> {
        let mut query = Vec::new();
        if let Some(series) = series_ticker {
            query.push(format!("series_ticker={series}"));
        }
        if let Some(status) = status {
            query.push(format!("status={status}"));
        }
        let path = if query.is_empty() {
            "/markets".to_string()
        } else {
            format!("/markets?{}", query.join("&"))
        };

        let response: RawMarketsResponse = self.get(&path).await?;

        Ok(response.markets.unwrap_or_default().into_iter().map(Market::from).collect())
    }

    /// # Errors
    /// Returns an error if the market is not found or the API call fails.
    pub async fn get_market(&self, ticker: &str) -> Result<Market> {
        let ticker = Self::validate_ticker(ticker)?;
        let path = format!("/markets/{ticker}");

        #[derive(Deserialize)]
        struct SingleMarketResponse {
            market: Option<RawMarket>,
        }

        let response: SingleMarketResponse = self.get(&path).await?;

        response
            .market
            .map(Market::from)
            .ok_or_else(|| KalshiError::market_not_found(ticker))
    }

    /// # Errors
    /// Returns an error if the API call fails.
    pub async fn get_orderbook(&self, ticker: &str, depth: u32) -> Result<Orderbook> {
        let ticker = Self::validate_ticker(ticker)?;
        let path = format!("/markets/{}/orderbook?depth={}", ticker, depth.min(100));

        let response: RawOrderbookResponse = self.get(&path).await?;
        let raw = response.orderbook.unwrap_or(RawOrderbook { yes: None, no: None });

        let to_levels = |side: Option<Vec<Vec<u32>>>| -> Vec<PriceLevel> {
            side.unwrap_or_default()
                .into_iter()
                .filter(|v| v.len() >= 2)
                .map(|v| PriceLevel { price: v[0], count: v[1] })
                .collect()
        };

        Ok(Orderbook {
            ticker: ticker.to_string(),
            yes: to_levels(raw.yes),
            no: to_levels(raw.no),
            timestamp: Utc::now(),
        })
    }

    // =========================================================================
    // Portfolio Endpoints
    // =========================================================================

    /// # Errors
    /// Returns an error if the API call fails.
    pub async fn get_balance(&self) -> Result<Balance> {
        let response: RawBalanceResponse = self.get("/portfolio/balance").await?;
        let balance = response.balance.unwrap_or(0);

        Ok(Balance {
            balance,
            available_balance: balance,
            reserved_balance: 0,
        })
    }

    /// # Errors
    /// Returns an error if the API call fails.
    pub async fn get_positions(&self) -> Result<Vec<Position>> {
        let response: RawPositionsResponse = self.get("/portfolio/positions").await?;
        Ok(response.market_positions.unwrap_or_default().into_iter().map(Position::from).collect())
    }

    // =========================================================================
    // Order Endpoints
    // =========================================================================

    /// # Errors
    /// Returns an error if the order is rejected or the API call fails.
    pub async fn submit_order(&self, order: &OrderRequest) -> Result<Order> {
        let response: RawOrderResponse = self.post("/portfolio/orders", order).await?;

        response
            .order
            .map(Order::from)
            .ok_or_else(|| KalshiError::OrderRejected("no order in response".to_string()))
    }

    /// Cancels an order. A `404` (order already gone) is treated as success.
    ///
    /// # Errors
    /// Returns an error if cancellation fails for any other reason.
    pub async fn cancel_order(&self, order_id: &str) -> Result<()> {
        let order_id = Self::validate_identifier(order_id)?;
        let path = format!("/portfolio/orders/{order_id}");
        self.delete(&path).await
    }

    /// # Errors
    /// Returns an error if the order is not found.
    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        let order_id = Self::validate_identifier(order_id)?;
        let path = format!("/portfolio/orders/{order_id}");

        let response: RawOrderResponse = self.get(&path).await?;

        response
            .order
            .map(Order::from)
            .ok_or_else(|| KalshiError::order_not_found(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = KalshiClientConfig::default();
        assert_eq!(config.base_url, KALSHI_PROD_URL);
        assert_eq!(config.requests_per_minute.get(), 60);
    }

    #[test]
    fn test_client_config_demo() {
        let config = KalshiClientConfig::demo();
        assert_eq!(config.base_url, KALSHI_DEMO_URL);
    }

    #[test]
    fn test_client_config_builder() {
        let config = KalshiClientConfig::default()
            .with_base_url("https://custom.url")
            .with_rate_limit(nonzero!(120u32))
            .with_timeout_secs(60);

        assert_eq!(config.base_url, "https://custom.url");
        assert_eq!(config.requests_per_minute.get(), 120);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_raw_market_conversion_keeps_integer_cents() {
        let raw = RawMarket {
            ticker: "NBA-LAL-BOS".to_string(),
            event_ticker: "NBA-LAL-BOS-EVT".to_string(),
            series_ticker: Some("NBA".to_string()),
            title: Some("Lakers at Celtics Winner?".to_string()),
            subtitle: None,
            status: Some("open".to_string()),
            yes_bid: Some(45),
            yes_ask: Some(47),
            no_bid: Some(53),
            no_ask: Some(55),
            last_price: Some(46),
            volume_24h: Some(500),
            open_interest: Some(1000),
            close_time: None,
            expiration_time: None,
        };

        let market: Market = raw.into();

        assert_eq!(market.ticker, "NBA-LAL-BOS");
        assert_eq!(market.yes_bid, Some(45));
        assert_eq!(market.yes_ask, Some(47));
        assert!(market.is_tradeable());
    }

    #[test]
    fn test_raw_market_closed_status_is_not_tradeable() {
        let raw = RawMarket {
            ticker: "NBA-TEST".to_string(),
            event_ticker: "NBA-TEST-EVT".to_string(),
            series_ticker: None,
            title: None,
            subtitle: None,
            status: Some("closed".to_string()),
            yes_bid: None,
            yes_ask: None,
            no_bid: None,
            no_ask: None,
            last_price: None,
            volume_24h: None,
            open_interest: None,
            close_time: None,
            expiration_time: None,
        };

        let market: Market = raw.into();
        assert!(!market.is_tradeable());
    }

    #[test]
    fn test_raw_position_derives_avg_price_from_exposure() {
        let raw = RawPosition {
            ticker: "NBA-LAL-BOS".to_string(),
            side: Some("yes".to_string()),
            position: Some(10),
            market_exposure: Some(450),
            realized_pnl: None,
        };

        let position: Position = raw.into();
        assert_eq!(position.count, 10);
        assert_eq!(position.avg_price, 45);
    }

    #[test]
    fn test_raw_order_conversion() {
        let raw = RawOrder {
            order_id: "order-123".to_string(),
            client_order_id: Some("client-456".to_string()),
            ticker: "NBA-TEST".to_string(),
            side: Some("yes".to_string()),
            action: Some("buy".to_string()),
            order_type: Some("limit".to_string()),
            status: Some("filled".to_string()),
            count: Some(100),
            filled_count: Some(100),
            remaining_count: Some(0),
            yes_price: Some(45),
            no_price: None,
            avg_fill_price: Some(45),
            created_time: None,
            updated_time: None,
        };

        let order: Order = raw.into();

        assert_eq!(order.order_id, "order-123");
        assert!(order.is_filled());
        assert_eq!(order.filled_count, 100);
    }

    #[test]
    fn test_raw_order_partial_fill() {
        let raw = RawOrder {
            order_id: "order-124".to_string(),
            client_order_id: None,
            ticker: "NBA-TEST".to_string(),
            side: Some("no".to_string()),
            action: Some("sell".to_string()),
            order_type: Some("market".to_string()),
            status: Some("partial_filled".to_string()),
            count: Some(100),
            filled_count: Some(50),
            remaining_count: Some(50),
            yes_price: None,
            no_price: Some(55),
            avg_fill_price: Some(55),
            created_time: None,
            updated_time: None,
        };

        let order: Order = raw.into();

        assert!(order.is_partial());
        assert_eq!(order.filled_count, 50);
        assert_eq!(order.remaining_count, 50);
    }

    #[test]
    fn test_orderbook_path() {
        let ticker = "NBA-LAL-BOS";
        let depth = 20;
        let path = format!("/markets/{}/orderbook?depth={}", ticker, depth.min(100));
        assert_eq!(path, "/markets/NBA-LAL-BOS/orderbook?depth=20");
    }

    #[test]
    fn test_orderbook_depth_clamped() {
        let depth: u32 = 150;
        assert_eq!(depth.min(100), 100);
    }

    #[test]
    fn test_markets_path_with_series_and_status() {
        let path = format!("/markets?{}", ["series_ticker=NBA", "status=open"].join("&"));
        assert_eq!(path, "/markets?series_ticker=NBA&status=open");
    }

    #[test]
    fn test_validate_ticker_valid() {
        assert!(KalshiClient::validate_ticker("NBA-LAL-BOS").is_ok());
        assert!(KalshiClient::validate_ticker("NBA_TEST").is_ok());
        assert!(KalshiClient::validate_ticker("ABC123").is_ok());
    }

    #[test]
    fn test_validate_ticker_rejects_path_traversal() {
        assert!(KalshiClient::validate_ticker("../etc/passwd").is_err());
        assert!(KalshiClient::validate_ticker("..").is_err());
        assert!(KalshiClient::validate_ticker("foo/../bar").is_err());
    }

    #[test]
    fn test_validate_ticker_rejects_slashes() {
        assert!(KalshiClient::validate_ticker("foo/bar").is_err());
        assert!(KalshiClient::validate_ticker("foo\\bar").is_err());
        assert!(KalshiClient::validate_ticker("/markets/test").is_err());
    }

    #[test]
    fn test_validate_ticker_rejects_empty() {
        assert!(KalshiClient::validate_ticker("").is_err());
    }

    #[test]
    fn test_validate_ticker_rejects_special_chars() {
        assert!(KalshiClient::validate_ticker("test@ticker").is_err());
        assert!(KalshiClient::validate_ticker("test ticker").is_err());
        assert!(KalshiClient::validate_ticker("test?query=1").is_err());
        assert!(KalshiClient::validate_ticker("test#anchor").is_err());
    }

    #[test]
    fn test_validate_ticker_rejects_too_long() {
        let long_ticker = "A".repeat(65);
        assert!(KalshiClient::validate_ticker(&long_ticker).is_err());
    }

    #[test]
    fn test_validate_identifier_valid() {
        assert!(KalshiClient::validate_identifier("order-123-abc").is_ok());
        assert!(KalshiClient::validate_identifier("uuid_format_id").is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_path_traversal() {
        assert!(KalshiClient::validate_identifier("../../../etc/passwd").is_err());
        assert!(KalshiClient::validate_identifier("order/../../../secret").is_err());
    }
}
