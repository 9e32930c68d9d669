//! Gate-checks a candidate buy against per-ticker, per-sport, and aggregate
//! exposure limits before the executor ever sees it. Every rejection is
//! logged with the specific gate and the values that tripped it.

use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RiskLimits {
    pub max_contracts_per_ticker: u64,
    pub max_positions_per_sport: u32,
    pub max_aggregate_exposure_cents: u64,
    pub max_concurrent_markets: u32,
    pub min_volume: u64,
    pub max_spread_cents: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskRejection {
    TickerCapExceeded { ticker: String, requested: u64, cap: u64 },
    SportCapExceeded { sport: String, held: u32, cap: u32 },
    AggregateExposureExceeded { projected_cents: u64, cap_cents: u64 },
    TooManyConcurrentMarkets { held: u32, cap: u32 },
    InsufficientVolume { volume: u64, min_volume: u64 },
    SpreadTooWide { spread_cents: u32, max_spread_cents: u32 },
}

/// A candidate buy being gate-checked, plus the current state the risk
/// manager needs to evaluate it against.
pub struct RiskCheckInput<'a> {
    pub ticker: &'a str,
    pub sport: &'a str,
    pub requested_quantity: u64,
    pub requested_cost_cents: u64,
    pub best_bid: u32,
    pub best_ask: u32,
    pub volume: u64,
    /// Existing cost basis plus outstanding buy-order cost, excluding this request.
    pub current_aggregate_exposure_cents: u64,
    /// Number of positions/pending orders already held per sport.
    pub held_positions_per_sport: u32,
    /// Number of distinct markets currently held or pending across all sports.
    pub distinct_markets_held: u32,
}

#[derive(Debug, Default)]
pub struct RiskManager {
    limits: RiskLimits,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_contracts_per_ticker: 500,
            max_positions_per_sport: 5,
            max_aggregate_exposure_cents: 100_000,
            max_concurrent_markets: 20,
            min_volume: 10,
            max_spread_cents: 10,
        }
    }
}

impl RiskManager {
    #[must_use]
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    /// Runs every gate in order, returning the first violation. `Ok(())`
    /// means the buy is admitted.
    pub fn check(&self, input: &RiskCheckInput) -> Result<(), RiskRejection> {
        if input.requested_quantity > self.limits.max_contracts_per_ticker {
            let rejection = RiskRejection::TickerCapExceeded {
                ticker: input.ticker.to_string(),
                requested: input.requested_quantity,
                cap: self.limits.max_contracts_per_ticker,
            };
            warn!(?rejection, "risk gate rejected buy");
            return Err(rejection);
        }

        if input.held_positions_per_sport >= self.limits.max_positions_per_sport {
            let rejection = RiskRejection::SportCapExceeded {
                sport: input.sport.to_string(),
                held: input.held_positions_per_sport,
                cap: self.limits.max_positions_per_sport,
            };
            warn!(?rejection, "risk gate rejected buy");
            return Err(rejection);
        }

        let projected = input.current_aggregate_exposure_cents + input.requested_cost_cents;
        if projected > self.limits.max_aggregate_exposure_cents {
            let rejection = RiskRejection::AggregateExposureExceeded {
                projected_cents: projected,
                cap_cents: self.limits.max_aggregate_exposure_cents,
            };
            warn!(?rejection, "risk gate rejected buy");
            return Err(rejection);
        }

        if input.distinct_markets_held >= self.limits.max_concurrent_markets {
            let rejection = RiskRejection::TooManyConcurrentMarkets {
                held: input.distinct_markets_held,
                cap: self.limits.max_concurrent_markets,
            };
            warn!(?rejection, "risk gate rejected buy");
            return Err(rejection);
        }

        if input.volume < self.limits.min_volume {
            let rejection = RiskRejection::InsufficientVolume {
                volume: input.volume,
                min_volume: self.limits.min_volume,
            };
            warn!(?rejection, "risk gate rejected buy");
            return Err(rejection);
        }

        let spread = input.best_ask.saturating_sub(input.best_bid);
        if spread > self.limits.max_spread_cents {
            let rejection = RiskRejection::SpreadTooWide {
                spread_cents: spread,
                max_spread_cents: self.limits.max_spread_cents,
            };
            warn!(?rejection, "risk gate rejected buy");
            return Err(rejection);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> RiskCheckInput<'static> {
        RiskCheckInput {
            ticker: "NBA-LAL-BOS",
            sport: "NBA",
            requested_quantity: 10,
            requested_cost_cents: 600,
            best_bid: 58,
            best_ask: 60,
            volume: 100,
            current_aggregate_exposure_cents: 0,
            held_positions_per_sport: 0,
            distinct_markets_held: 0,
        }
    }

    #[test]
    fn admits_a_clean_buy() {
        let manager = RiskManager::new(RiskLimits::default());
        assert!(manager.check(&base_input()).is_ok());
    }

    #[test]
    fn rejects_ticker_cap_exceeded() {
        let manager = RiskManager::new(RiskLimits::default());
        let mut input = base_input();
        input.requested_quantity = 10_000;
        assert!(matches!(
            manager.check(&input),
            Err(RiskRejection::TickerCapExceeded { .. })
        ));
    }

    #[test]
    fn rejects_sport_cap_exceeded() {
        let manager = RiskManager::new(RiskLimits::default());
        let mut input = base_input();
        input.held_positions_per_sport = 5;
        assert!(matches!(
            manager.check(&input),
            Err(RiskRejection::SportCapExceeded { .. })
        ));
    }

    #[test]
    fn rejects_aggregate_exposure_exceeded() {
        let manager = RiskManager::new(RiskLimits::default());
        let mut input = base_input();
        input.current_aggregate_exposure_cents = 99_999;
        input.requested_cost_cents = 500;
        assert!(matches!(
            manager.check(&input),
            Err(RiskRejection::AggregateExposureExceeded { .. })
        ));
    }

    #[test]
    fn rejects_insufficient_volume() {
        let manager = RiskManager::new(RiskLimits::default());
        let mut input = base_input();
        input.volume = 1;
        assert!(matches!(
            manager.check(&input),
            Err(RiskRejection::InsufficientVolume { .. })
        ));
    }

    #[test]
    fn rejects_spread_too_wide() {
        let manager = RiskManager::new(RiskLimits::default());
        let mut input = base_input();
        input.best_bid = 40;
        input.best_ask = 60;
        assert!(matches!(
            manager.check(&input),
            Err(RiskRejection::SpreadTooWide { .. })
        ));
    }
}
