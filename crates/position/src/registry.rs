//! In-flight order registry: at most one pending entry per ticker, so the
//! strategy can never stack two buys on the same market before the first
//! resolves. Drained wholesale by the kill switch.

use algo_trade_core::events::PendingOrder;
use algo_trade_core::traits::PendingOrderSource;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

pub struct PendingOrderRegistry {
    entries: RwLock<HashMap<String, PendingOrder>>,
}

impl Default for PendingOrderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingOrderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new pending order for `ticker` if one isn't already
    /// outstanding. Returns `false` (and registers nothing) if the ticker
    /// already has an entry — the per-ticker cap.
    pub fn try_register(
        &self,
        ticker: &str,
        quantity: u64,
        price: u32,
        is_taker: bool,
        now: DateTime<Utc>,
    ) -> bool {
        let mut guard = self.entries.write();
        if guard.contains_key(ticker) {
            return false;
        }
        guard.insert(
            ticker.to_string(),
            PendingOrder {
                ticker: ticker.to_string(),
                quantity,
                price,
                is_taker,
                submitted_at: now,
                order_id: None,
            },
        );
        true
    }

    /// Attaches the exchange-assigned order id once the ACK arrives.
    pub fn set_order_id(&self, ticker: &str, order_id: String) {
        if let Some(entry) = self.entries.write().get_mut(ticker) {
            entry.order_id = Some(order_id);
        }
    }

    #[must_use]
    pub fn get_order_id(&self, ticker: &str) -> Option<String> {
        self.entries.read().get(ticker).and_then(|e| e.order_id.clone())
    }

    #[must_use]
    pub fn is_pending(&self, ticker: &str) -> bool {
        self.entries.read().contains_key(ticker)
    }

    /// Every order id that has been ACKed so far — what the kill switch
    /// cancels before it lets the engine terminate.
    #[must_use]
    pub fn all_order_ids(&self) -> Vec<String> {
        self.entries
            .read()
            .values()
            .filter_map(|e| e.order_id.clone())
            .collect()
    }

    pub fn remove(&self, ticker: &str) -> Option<PendingOrder> {
        self.entries.write().remove(ticker)
    }

    /// Empties the registry and returns everything that was in it. Used by
    /// the kill switch: cancel every ACKed order, then drop all bookkeeping
    /// so nothing looks pending anymore.
    pub fn drain(&self) -> Vec<PendingOrder> {
        self.entries.write().drain().map(|(_, v)| v).collect()
    }

    /// Removes and returns entries older than `max_age`, for orders the
    /// exchange never ACKed or resolved within a sane window.
    pub fn expire_older_than(&self, max_age: ChronoDuration, now: DateTime<Utc>) -> Vec<PendingOrder> {
        let mut guard = self.entries.write();
        let expired: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| now - entry.submitted_at > max_age)
            .map(|(ticker, _)| ticker.clone())
            .collect();
        expired
            .into_iter()
            .filter_map(|ticker| guard.remove(&ticker))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Every entry currently outstanding, ACKed or not — what the risk
    /// manager's aggregate-exposure gate needs to account for buy-order
    /// cost that hasn't become a position yet.
    #[must_use]
    pub fn all_pending(&self) -> Vec<PendingOrder> {
        self.entries.read().values().cloned().collect()
    }
}

impl PendingOrderSource for PendingOrderRegistry {
    fn all_pending(&self) -> Vec<PendingOrder> {
        self.all_pending()
    }
}
