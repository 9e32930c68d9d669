//! Authoritative local position ledger. Exchange-reported positions always
//! win; executor-added optimistic entries are allowed to survive exactly one
//! poll interval before being reconciled away if the exchange still
//! disagrees and the order behind them is no longer pending.

use algo_trade_core::errors::EngineError;
use algo_trade_core::events::Position;
use algo_trade_core::traits::PositionSource;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

struct TrackedEntry {
    position: Position,
    optimistic: bool,
    recorded_at: DateTime<Utc>,
}

/// Keyed by ticker: the spec's per-ticker cap means one position per
/// ticker is the steady state (reconciliation may transiently install more).
pub struct PositionTracker {
    positions: RwLock<HashMap<String, TrackedEntry>>,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: RwLock::new(HashMap::new()),
        }
    }

    /// Called by the executor right after an ACK reports `filled_count > 0`.
    pub fn record_optimistic(&self, position: Position, now: DateTime<Utc>) {
        self.positions.write().insert(
            position.ticker.clone(),
            TrackedEntry {
                position,
                optimistic: true,
                recorded_at: now,
            },
        );
    }

    /// Merges an exchange portfolio poll into the ledger. Every reported
    /// position overrides the local entry for its ticker. Any optimistic
    /// entry older than `poll_interval` that the exchange does not confirm
    /// is dropped unless `is_still_pending` says its order hasn't resolved.
    pub fn merge_exchange_positions(
        &self,
        reported: &[Position],
        now: DateTime<Utc>,
        poll_interval: Duration,
        is_still_pending: impl Fn(&str) -> bool,
    ) {
        let mut guard = self.positions.write();
        let reported_tickers: std::collections::HashSet<&str> =
            reported.iter().map(|p| p.ticker.as_str()).collect();

        for position in reported {
            guard.insert(
                position.ticker.clone(),
                TrackedEntry {
                    position: position.clone(),
                    optimistic: false,
                    recorded_at: now,
                },
            );
        }

        let grace = ChronoDuration::from_std(poll_interval).unwrap_or(ChronoDuration::seconds(5));
        guard.retain(|ticker, entry| {
            if reported_tickers.contains(ticker.as_str()) {
                return true;
            }
            if !entry.optimistic {
                // The exchange used to report this and now doesn't: settled or closed.
                return false;
            }
            let age = now - entry.recorded_at;
            age < grace || is_still_pending(ticker)
        });
    }

    #[must_use]
    pub fn held_positions(&self) -> Vec<Position> {
        self.positions
            .read()
            .values()
            .map(|e| e.position.clone())
            .collect()
    }

    #[must_use]
    pub fn position_for(&self, ticker: &str) -> Option<Position> {
        self.positions.read().get(ticker).map(|e| e.position.clone())
    }

    #[must_use]
    pub fn ticker_count(&self) -> usize {
        self.positions.read().len()
    }
}

impl PositionSource for PositionTracker {
    fn held_positions(&self) -> Vec<Position> {
        self.held_positions()
    }
}

/// Startup reconciliation: fetch positions with exponential backoff (three
/// retries at 1s, 2s, 4s, each capped at 30s). Exhausting all retries is
/// fatal — the engine must refuse to start live trading.
pub async fn reconcile_startup<F, Fut>(fetch: F) -> Result<Vec<Position>, EngineError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<Position>>>,
{
    const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];
    let mut last_error = None;

    match fetch().await {
        Ok(positions) => return Ok(positions),
        Err(e) => last_error = Some(e),
    }

    for delay_secs in RETRY_DELAYS_SECS {
        let delay = Duration::from_secs(delay_secs.min(30));
        tracing::warn!(error = %last_error.as_ref().unwrap(), delay_secs, "retrying startup position reconciliation");
        tokio::time::sleep(delay).await;
        match fetch().await {
            Ok(positions) => return Ok(positions),
            Err(e) => last_error = Some(e),
        }
    }

    Err(EngineError::Fatal(format!(
        "startup position reconciliation exhausted all retries: {}",
        last_error.expect("at least one attempt recorded an error")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use algo_trade_core::events::SettlementStatus;
    use algo_trade_core::events::Side;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn sample_position(ticker: &str, qty: u64) -> Position {
        Position {
            ticker: ticker.to_string(),
            side: Side::Yes,
            quantity: qty,
            avg_price: 50,
            cost_basis: 50 * qty,
            fees_paid: 0,
            settlement_status: SettlementStatus::Unsettled,
            realized_pnl: None,
        }
    }

    #[test]
    fn exchange_report_overrides_optimistic_entry() {
        let tracker = PositionTracker::new();
        let now = Utc::now();
        tracker.record_optimistic(sample_position("T1", 5), now);
        tracker.merge_exchange_positions(
            &[sample_position("T1", 3)],
            now,
            Duration::from_secs(5),
            |_| false,
        );
        assert_eq!(tracker.position_for("T1").unwrap().quantity, 3);
    }

    #[test]
    fn optimistic_entry_survives_within_grace_period() {
        let tracker = PositionTracker::new();
        let now = Utc::now();
        tracker.record_optimistic(sample_position("T1", 5), now);
        tracker.merge_exchange_positions(&[], now, Duration::from_secs(5), |_| false);
        assert!(tracker.position_for("T1").is_some());
    }

    #[test]
    fn optimistic_entry_dropped_after_grace_if_order_not_pending() {
        let tracker = PositionTracker::new();
        let now = Utc::now();
        tracker.record_optimistic(sample_position("T1", 5), now);
        let later = now + ChronoDuration::seconds(10);
        tracker.merge_exchange_positions(&[], later, Duration::from_secs(5), |_| false);
        assert!(tracker.position_for("T1").is_none());
    }

    #[test]
    fn optimistic_entry_retained_after_grace_if_order_still_pending() {
        let tracker = PositionTracker::new();
        let now = Utc::now();
        tracker.record_optimistic(sample_position("T1", 5), now);
        let later = now + ChronoDuration::seconds(10);
        tracker.merge_exchange_positions(&[], later, Duration::from_secs(5), |_| true);
        assert!(tracker.position_for("T1").is_some());
    }

    #[tokio::test]
    async fn reconcile_startup_matches_spec_scenario() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result = reconcile_startup(move || {
            let calls = calls_clone.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    anyhow::bail!("transient failure");
                }
                Ok(vec![sample_position("T1", 5)])
            }
        })
        .await;

        let positions = result.expect("should succeed on third attempt");
        assert_eq!(positions[0].quantity, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn reconcile_startup_is_fatal_after_exhausting_retries() {
        let result: Result<Vec<Position>, EngineError> =
            reconcile_startup(|| async { anyhow::bail!("down") }).await;
        assert!(matches!(result, Err(EngineError::Fatal(_))));
    }
}
