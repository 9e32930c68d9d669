//! Kalshi exchange integration for the sports-arbitrage trading engine.
//!
//! This crate provides:
//! - REST client with rate limiting for Kalshi's trading API
//! - RSA-PSS authentication for REST and WebSocket requests
//! - A streaming client for the `orderbook_delta` channel
//! - Order execution with hard limits and a circuit breaker
//! - Wire-level data models, converted to the engine's domain types at the edge
//!
//! # Authentication
//!
//! Kalshi uses RSA-PSS (SHA-256) signatures for API authentication.
//! Set the following environment variables:
//!
//! - `KALSHI_API_KEY`: Your API key ID
//! - `KALSHI_PRIVATE_KEY`: Your RSA private key in PEM format
//!
//! For demo environment, use `KALSHI_DEMO_API_KEY` and `KALSHI_DEMO_PRIVATE_KEY`.
//!
//! # Safety Features
//!
//! The executor provides multiple layers of protection:
//!
//! - **Hard limits**: Maximum order size, price range, and order value
//! - **Daily volume tracking**: Prevents excessive trading
//! - **Balance reserve**: Keeps minimum balance for unwinding
//! - **Circuit breaker**: Halts trading after consecutive failures or losses
//!
//! # API Endpoints
//!
//! - `GET /markets` - List markets, filterable by series ticker and status
//! - `GET /markets/{ticker}` - Get specific market
//! - `GET /markets/{ticker}/orderbook` - Get REST orderbook snapshot
//! - `GET /portfolio/balance` - Get account balance
//! - `GET /portfolio/positions` - Get positions
//! - `POST /portfolio/orders` - Submit order
//! - `DELETE /portfolio/orders/{order_id}` - Cancel order
//! - `GET /portfolio/orders/{order_id}` - Get order status
//! - WS `orderbook_delta` channel - streaming depth updates

pub mod auth;
pub mod client;
pub mod error;
pub mod executor;
pub mod types;
pub mod ws;

// Re-export main types for convenience
pub use auth::{KalshiAuth, KalshiAuthConfig, SignedHeaders};
pub use client::{KalshiClient, KalshiClientConfig, KALSHI_DEMO_URL, KALSHI_PROD_URL};
pub use error::{KalshiError, Result};
pub use executor::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerState, HardLimits, KalshiExecutor,
    KalshiExecutorConfig,
};
pub use types::{
    Action, Balance, Market, MarketStatus, Order, OrderRequest, OrderStatus, OrderType, Orderbook,
    Position, PriceLevel, Side, TimeInForce,
};
pub use ws::{KalshiWsClient, KalshiWsConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_exports() {
        let _ = KalshiAuthConfig::default();
        let _ = KalshiClientConfig::default();
        let _ = KalshiExecutorConfig::default();
        let _ = HardLimits::default();
        let _ = CircuitBreakerConfig::default();
        let _ = KalshiWsConfig::default();
    }

    #[test]
    fn test_error_types_accessible() {
        let err = KalshiError::api(400, "bad request");
        assert!(err.to_string().contains("400"));
    }

    #[test]
    fn test_types_accessible() {
        let order = OrderRequest::taker_buy("KXBTC-TEST", Side::Yes, 45, 100);
        assert_eq!(order.ticker, "KXBTC-TEST");
        assert_eq!(order.side, Side::Yes);
        assert_eq!(order.action, Action::Buy);
    }

    #[test]
    fn test_constants_accessible() {
        assert!(KALSHI_PROD_URL.starts_with("https://"));
        assert!(KALSHI_DEMO_URL.starts_with("https://"));
    }
}
