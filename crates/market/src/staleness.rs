//! Tracks how recently data arrived, per feed and per ticker, so the
//! strategy can suppress new bids and cancel outstanding maker orders the
//! moment a source stops updating instead of trading on a frozen quote.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

/// A poll older than this is never considered fresh, regardless of source.
const FETCH_FRESH_WINDOW_SECS: i64 = 30;

#[derive(Default)]
pub struct StalenessTracker {
    last_fetch: RwLock<HashMap<String, DateTime<Utc>>>,
    last_update: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl StalenessTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `source` (e.g. `"odds:nba"`, `"kalshi:markets"`) was
    /// polled successfully at `now`.
    pub fn record_fetch(&self, source: &str, now: DateTime<Utc>) {
        self.last_fetch.write().insert(source.to_string(), now);
    }

    /// Records that `ticker`'s depth book or quote was updated at `now`.
    pub fn record_update(&self, ticker: &str, now: DateTime<Utc>) {
        self.last_update.write().insert(ticker.to_string(), now);
    }

    /// Whether `source` was last polled within the fixed 30-second window.
    /// A source that has never been polled is not fresh.
    #[must_use]
    pub fn fetch_fresh(&self, source: &str, now: DateTime<Utc>) -> bool {
        self.last_fetch
            .read()
            .get(source)
            .is_some_and(|t| now - *t < ChronoDuration::seconds(FETCH_FRESH_WINDOW_SECS))
    }

    /// Whether `ticker`'s last update falls within `horizon` (e.g. 15 s for
    /// a WebSocket feed, 60 minutes for a slow-moving bookmaker feed).
    #[must_use]
    pub fn data_fresh(&self, ticker: &str, horizon: Duration, now: DateTime<Utc>) -> bool {
        let horizon = ChronoDuration::from_std(horizon).unwrap_or(ChronoDuration::seconds(15));
        self.last_update
            .read()
            .get(ticker)
            .is_some_and(|t| now - *t < horizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpolled_source_is_not_fetch_fresh() {
        let tracker = StalenessTracker::new();
        assert!(!tracker.fetch_fresh("odds:nba", Utc::now()));
    }

    #[test]
    fn fetch_fresh_within_thirty_seconds() {
        let tracker = StalenessTracker::new();
        let now = Utc::now();
        tracker.record_fetch("odds:nba", now);
        assert!(tracker.fetch_fresh("odds:nba", now + ChronoDuration::seconds(10)));
        assert!(!tracker.fetch_fresh("odds:nba", now + ChronoDuration::seconds(31)));
    }

    #[test]
    fn data_fresh_respects_configured_horizon() {
        let tracker = StalenessTracker::new();
        let now = Utc::now();
        tracker.record_update("NBA-GAME", now);
        assert!(tracker.data_fresh("NBA-GAME", Duration::from_secs(15), now + ChronoDuration::seconds(10)));
        assert!(!tracker.data_fresh("NBA-GAME", Duration::from_secs(15), now + ChronoDuration::seconds(20)));
        // A 60-minute horizon (ancient bookmaker data) tolerates the same gap.
        assert!(tracker.data_fresh("NBA-GAME", Duration::from_secs(3600), now + ChronoDuration::seconds(20)));
    }

    #[test]
    fn record_update_makes_ticker_data_fresh() {
        let tracker = StalenessTracker::new();
        let now = Utc::now();
        assert!(!tracker.data_fresh("NBA-GAME", Duration::from_secs(15), now));
        tracker.record_update("NBA-GAME", now);
        assert!(tracker.data_fresh("NBA-GAME", Duration::from_secs(15), now));
    }

    #[test]
    fn unupdated_ticker_is_not_data_fresh() {
        let tracker = StalenessTracker::new();
        assert!(!tracker.data_fresh("NOPE", Duration::from_secs(15), Utc::now()));
    }
}
