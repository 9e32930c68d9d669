use crate::events::{PendingOrder, Position, Side};
use anyhow::Result;
use async_trait::async_trait;

/// A pluggable source of fair value for one target team in a matchup: either
/// multi-book devigging or a score-based win-probability model. Selected by
/// config, per sport.
#[async_trait]
pub trait FairValueProvider: Send + Sync {
    /// Returns `(fair_value_cents, bookmaker_count, spread)` or an error
    /// describing why no usable fair value could be produced this tick.
    async fn fair_value(&self, sport: &str, target_team: &str) -> Result<(u32, u32, f64)>;
}

/// Acknowledgement returned by a successful order submission.
#[derive(Debug, Clone)]
pub struct OrderAck {
    pub order_id: String,
    pub filled_count: u64,
}

/// The exchange-facing half of order management: submit and cancel. Kept
/// separate from the pending-order registry, which is purely local
/// bookkeeping with no I/O.
#[async_trait]
pub trait ExecutionHandler: Send + Sync {
    async fn submit(
        &self,
        ticker: &str,
        side: Side,
        is_sell: bool,
        price: u32,
        qty: u64,
        is_taker: bool,
    ) -> Result<OrderAck>;

    async fn cancel(&self, order_id: &str) -> Result<()>;
}

/// Read access to the authoritative position ledger, as consulted by the
/// auto-close and bailout controllers.
pub trait PositionSource: Send + Sync {
    fn held_positions(&self) -> Vec<Position>;
}

/// Read access to in-flight orders, as consulted by the kill switch drain.
pub trait PendingOrderSource: Send + Sync {
    fn all_pending(&self) -> Vec<PendingOrder>;
}
