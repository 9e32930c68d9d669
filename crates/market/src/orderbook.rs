//! Per-ticker depth book. Historically the cache kept only the four flat
//! numbers from the initial snapshot and ignored the delta stream entirely,
//! which froze the displayed quote while the real book kept moving. This
//! applies the streaming increment protocol the exchange actually sends.

use std::collections::{BTreeMap, HashMap};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSide {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestQuotes {
    pub yes_bid: u32,
    pub yes_ask: u32,
    pub no_bid: u32,
    pub no_ask: u32,
}

#[derive(Debug, Default)]
struct SideBook {
    /// price (cents) -> quantity (contracts)
    levels: BTreeMap<u32, u64>,
}

impl SideBook {
    fn apply_snapshot(&mut self, levels: &[(u32, i64)]) {
        self.levels.clear();
        for &(price, qty) in levels {
            if qty > 0 {
                self.levels.insert(price, qty as u64);
            }
        }
    }

    fn apply_delta(&mut self, price: u32, delta_qty: i64) {
        let current = self.levels.get(&price).copied().unwrap_or(0) as i64;
        let updated = current + delta_qty;
        if updated <= 0 {
            if updated < 0 {
                warn!(price, current, delta_qty, "orderbook delta would go negative, clamping to zero");
            }
            self.levels.remove(&price);
        } else {
            self.levels.insert(price, updated as u64);
        }
    }

    fn best_bid(&self) -> Option<u32> {
        self.levels.keys().next_back().copied()
    }

    fn best_ask(&self) -> Option<u32> {
        self.levels.keys().next().copied()
    }
}

/// Depth book cache, one `SideBook` per outcome side, keyed by ticker.
#[derive(Debug, Default)]
pub struct OrderBookCache {
    books: HashMap<String, (SideBook, SideBook)>,
}

impl OrderBookCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a ticker's book wholesale. `levels` are normalized to
    /// integer contract counts before this is called; non-positive
    /// quantities are treated as deletions.
    pub fn apply_snapshot(&mut self, ticker: &str, yes_levels: &[(u32, i64)], no_levels: &[(u32, i64)]) {
        let entry = self.books.entry(ticker.to_string()).or_default();
        entry.0.apply_snapshot(yes_levels);
        entry.1.apply_snapshot(no_levels);
    }

    pub fn apply_delta(&mut self, ticker: &str, side: BookSide, price: u32, delta_qty: i64) {
        let entry = self.books.entry(ticker.to_string()).or_default();
        match side {
            BookSide::Yes => entry.0.apply_delta(price, delta_qty),
            BookSide::No => entry.1.apply_delta(price, delta_qty),
        }
    }

    /// Derives the four best quotes for a ticker. A side with no resting
    /// levels reports 0 for its bid and 100 for its ask.
    #[must_use]
    pub fn best(&self, ticker: &str) -> BestQuotes {
        let Some((yes, no)) = self.books.get(ticker) else {
            return BestQuotes { yes_bid: 0, yes_ask: 100, no_bid: 0, no_ask: 100 };
        };
        BestQuotes {
            yes_bid: yes.best_bid().unwrap_or(0),
            yes_ask: yes.best_ask().unwrap_or(100),
            no_bid: no.best_bid().unwrap_or(0),
            no_ask: no.best_ask().unwrap_or(100),
        }
    }
}
