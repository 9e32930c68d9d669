//! Signed WebSocket client for Kalshi's `orderbook_delta` channel.
//!
//! Subscribes to a set of tickers, applies the initial snapshot and every
//! subsequent delta directly into an [`OrderBookCache`], records each
//! accepted message against a shared [`StalenessTracker`], and reconnects
//! with backoff on drop. Authentication uses the same RSA-PSS headers as the
//! REST client, applied to the WS upgrade request instead of a normal HTTP
//! call.

use crate::auth::KalshiAuth;
use crate::error::{KalshiError, Result};
use algo_trade_market::{BookSide, OrderBookCache, StalenessTracker};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::connect_async;
use tracing::{debug, error, info, warn};

const WS_UPGRADE_PATH: &str = "/trade-api/ws/v2";

#[derive(Debug, Clone)]
pub struct KalshiWsConfig {
    pub ws_url: String,
    pub reconnect_delay: Duration,
    pub max_reconnect_delay: Duration,
}

impl Default for KalshiWsConfig {
    fn default() -> Self {
        Self {
            ws_url: format!("wss://trading-api.kalshi.com{WS_UPGRADE_PATH}"),
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
        }
    }
}

impl KalshiWsConfig {
    #[must_use]
    pub fn demo() -> Self {
        Self {
            ws_url: format!("wss://demo-api.kalshi.co{WS_UPGRADE_PATH}"),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct SubscribeCommand {
    id: u64,
    cmd: &'static str,
    params: SubscribeParams,
}

#[derive(Serialize)]
struct SubscribeParams {
    channels: Vec<&'static str>,
    market_tickers: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    OrderbookSnapshot { msg: SnapshotMsg },
    OrderbookDelta { msg: DeltaMsg },
    Subscribed,
    Error { msg: ErrorMsg },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct SnapshotMsg {
    market_ticker: String,
    yes: Vec<(u32, i64)>,
    no: Vec<(u32, i64)>,
}

#[derive(Debug, Deserialize)]
struct DeltaMsg {
    market_ticker: String,
    price: u32,
    delta: i64,
    side: String,
}

#[derive(Debug, Deserialize)]
struct ErrorMsg {
    code: Option<i64>,
    message: Option<String>,
}

/// Streams orderbook state for a fixed set of tickers into a shared cache.
///
/// `run` never returns under normal operation; it reconnects on every drop
/// with exponential backoff capped at `max_reconnect_delay`.
pub struct KalshiWsClient {
    auth: KalshiAuth,
    config: KalshiWsConfig,
}

impl KalshiWsClient {
    #[must_use]
    pub fn new(auth: KalshiAuth, config: KalshiWsConfig) -> Self {
        Self { auth, config }
    }

    pub async fn run(
        &self,
        tickers: Vec<String>,
        cache: Arc<Mutex<OrderBookCache>>,
        staleness: Arc<StalenessTracker>,
    ) -> Result<()> {
        let mut attempt: u32 = 0;
        loop {
            match self.connect_and_stream(&tickers, &cache, &staleness).await {
                Ok(()) => {
                    info!("Kalshi WS connection closed cleanly, reconnecting");
                    attempt = 0;
                }
                Err(e) => {
                    attempt = attempt.saturating_add(1);
                    error!(attempt, error = %e, "Kalshi WS connection failed");
                }
            }

            let delay = self
                .config
                .reconnect_delay
                .saturating_mul(attempt.max(1))
                .min(self.config.max_reconnect_delay);
            tokio::time::sleep(delay).await;
        }
    }

    async fn connect_and_stream(
        &self,
        tickers: &[String],
        cache: &Arc<Mutex<OrderBookCache>>,
        staleness: &Arc<StalenessTracker>,
    ) -> Result<()> {
        let mut request = self
            .config
            .ws_url
            .as_str()
            .into_client_request()
            .map_err(|e| KalshiError::Network(format!("invalid WS URL: {e}")))?;

        let headers = self.auth.sign_request("GET", WS_UPGRADE_PATH, "")?;
        for (name, value) in headers.as_tuples() {
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| KalshiError::Signing(format!("invalid header value: {e}")))?;
            request.headers_mut().insert(name, header_value);
        }

        let (ws_stream, _) = connect_async(request)
            .await
            .map_err(|e| KalshiError::Network(format!("WS connect failed: {e}")))?;
        info!(tickers = tickers.len(), "Kalshi WS connected");

        let (mut write, mut read) = ws_stream.split();

        let subscribe = SubscribeCommand {
            id: 1,
            cmd: "subscribe",
            params: SubscribeParams {
                channels: vec!["orderbook_delta"],
                market_tickers: tickers.to_vec(),
            },
        };
        let subscribe_json = serde_json::to_string(&subscribe)
            .map_err(|e| KalshiError::Serialization(e.to_string()))?;
        write
            .send(Message::Text(subscribe_json))
            .await
            .map_err(|e| KalshiError::Network(e.to_string()))?;

        let mut ping_interval = tokio::time::interval(Duration::from_secs(10));

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_message(&text, cache, staleness);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| KalshiError::Network(e.to_string()))?;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            return Ok(());
                        }
                        Some(Err(e)) => {
                            return Err(KalshiError::Network(e.to_string()));
                        }
                        _ => {}
                    }
                }
                _ = ping_interval.tick() => {
                    write.send(Message::Ping(Vec::new())).await
                        .map_err(|e| KalshiError::Network(e.to_string()))?;
                }
            }
        }
    }

    fn handle_message(text: &str, cache: &Mutex<OrderBookCache>, staleness: &StalenessTracker) {
        let parsed = match serde_json::from_str::<ServerMessage>(text) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "dropping malformed WS message");
                return;
            }
        };

        match parsed {
            ServerMessage::OrderbookSnapshot { msg } => {
                cache
                    .lock()
                    .apply_snapshot(&msg.market_ticker, &msg.yes, &msg.no);
                staleness.record_update(&msg.market_ticker, Utc::now());
            }
            ServerMessage::OrderbookDelta { msg } => {
                let side = match msg.side.as_str() {
                    "yes" => BookSide::Yes,
                    "no" => BookSide::No,
                    other => {
                        warn!(side = other, "unknown orderbook_delta side, dropping");
                        return;
                    }
                };
                cache
                    .lock()
                    .apply_delta(&msg.market_ticker, side, msg.price, msg.delta);
                staleness.record_update(&msg.market_ticker, Utc::now());
            }
            ServerMessage::Subscribed => {
                debug!("Kalshi WS subscription acked");
            }
            ServerMessage::Error { msg } => {
                warn!(code = ?msg.code, message = ?msg.message, "Kalshi WS server error");
            }
            ServerMessage::Other => {}
        }
    }
}
