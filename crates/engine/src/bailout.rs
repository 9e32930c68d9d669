//! Forces an exit on a held position once both enough time has passed (it's
//! close enough to expiry that a later recovery is unlikely to matter) and
//! the position has moved against us by more than the configured trigger.
//! Stateless: unlike the auto-close controller, bailout doesn't track a
//! resting order of its own — the engine loop cancels anything outstanding
//! for the ticker before issuing the bailout IOC.

use algo_trade_core::events::{Position, Side};
use algo_trade_core::BailoutConfig;
use algo_trade_market::BestQuotes;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BailoutAction {
    None,
    Bail { ticker: String, side: Side, price: u32, qty: u64 },
}

pub struct BailoutController;

impl BailoutController {
    /// Resolves the bid for the side actually held. The NO side prefers its
    /// own book level; the `100 - yes_ask` approximation is used only when
    /// the book has no resting NO-side levels at all.
    fn bid_for_side(side: Side, quotes: &BestQuotes) -> u32 {
        match side {
            Side::Yes => quotes.yes_bid,
            Side::No if quotes.no_bid > 0 => quotes.no_bid,
            Side::No => 100u32.saturating_sub(quotes.yes_ask),
        }
    }

    #[must_use]
    pub fn evaluate(
        position: &Position,
        quotes: &BestQuotes,
        expiration_time: DateTime<Utc>,
        now: DateTime<Utc>,
        config: &BailoutConfig,
    ) -> BailoutAction {
        if !config.bailout_enabled {
            return BailoutAction::None;
        }

        let hours_to_expiry = (expiration_time - now).num_seconds() as f64 / 3600.0;
        if hours_to_expiry > config.bailout_hours_before_expiry {
            return BailoutAction::None;
        }

        let bid_for_side = Self::bid_for_side(position.side, quotes);
        if position.avg_price == 0 {
            return BailoutAction::None;
        }
        let pnl_fraction =
            (f64::from(bid_for_side) - f64::from(position.avg_price)) / f64::from(position.avg_price);

        if pnl_fraction < -(config.bailout_trigger_pct / 100.0) {
            BailoutAction::Bail {
                ticker: position.ticker.clone(),
                side: position.side,
                price: bid_for_side,
                qty: position.quantity,
            }
        } else {
            BailoutAction::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algo_trade_core::events::SettlementStatus;
    use chrono::Duration as ChronoDuration;

    fn position(side: Side, avg_price: u32) -> Position {
        Position {
            ticker: "T1".to_string(),
            side,
            quantity: 10,
            avg_price,
            cost_basis: u64::from(avg_price) * 10,
            fees_paid: 0,
            settlement_status: SettlementStatus::Unsettled,
            realized_pnl: None,
        }
    }

    fn config() -> BailoutConfig {
        BailoutConfig { bailout_enabled: true, bailout_hours_before_expiry: 2.0, bailout_trigger_pct: 25.0 }
    }

    #[test]
    fn skips_when_far_from_expiry() {
        let now = Utc::now();
        let expiry = now + ChronoDuration::hours(10);
        let quotes = BestQuotes { yes_bid: 10, yes_ask: 12, no_bid: 85, no_ask: 90 };
        let action = BailoutController::evaluate(&position(Side::Yes, 50), &quotes, expiry, now, &config());
        assert_eq!(action, BailoutAction::None);
    }

    #[test]
    fn bails_when_close_to_expiry_and_deep_underwater() {
        let now = Utc::now();
        let expiry = now + ChronoDuration::hours(1);
        // avg_price 50, yes_bid 30: pnl_fraction = -0.4, worse than -0.25 trigger.
        let quotes = BestQuotes { yes_bid: 30, yes_ask: 32, no_bid: 65, no_ask: 70 };
        let action = BailoutController::evaluate(&position(Side::Yes, 50), &quotes, expiry, now, &config());
        assert_eq!(
            action,
            BailoutAction::Bail { ticker: "T1".to_string(), side: Side::Yes, price: 30, qty: 10 }
        );
    }

    #[test]
    fn does_not_bail_when_within_trigger_tolerance() {
        let now = Utc::now();
        let expiry = now + ChronoDuration::hours(1);
        // pnl_fraction = -0.1, within the 25% trigger.
        let quotes = BestQuotes { yes_bid: 45, yes_ask: 47, no_bid: 50, no_ask: 55 };
        let action = BailoutController::evaluate(&position(Side::Yes, 50), &quotes, expiry, now, &config());
        assert_eq!(action, BailoutAction::None);
    }

    #[test]
    fn disabled_bailout_never_fires() {
        let now = Utc::now();
        let expiry = now + ChronoDuration::hours(1);
        let quotes = BestQuotes { yes_bid: 10, yes_ask: 12, no_bid: 85, no_ask: 90 };
        let mut cfg = config();
        cfg.bailout_enabled = false;
        let action = BailoutController::evaluate(&position(Side::Yes, 50), &quotes, expiry, now, &cfg);
        assert_eq!(action, BailoutAction::None);
    }

    #[test]
    fn no_side_prefers_explicit_book_level_over_approximation() {
        let now = Utc::now();
        let expiry = now + ChronoDuration::hours(1);
        // If we used 100 - yes_ask (=90), pnl would look fine; the explicit
        // no_bid of 30 is the one that should drive the decision.
        let quotes = BestQuotes { yes_bid: 8, yes_ask: 10, no_bid: 30, no_ask: 35 };
        let action = BailoutController::evaluate(&position(Side::No, 50), &quotes, expiry, now, &config());
        assert_eq!(
            action,
            BailoutAction::Bail { ticker: "T1".to_string(), side: Side::No, price: 30, qty: 10 }
        );
    }

    #[test]
    fn no_side_falls_back_to_approximation_when_book_empty() {
        let now = Utc::now();
        let expiry = now + ChronoDuration::hours(1);
        // no_bid undefined (0); fall back to 100 - yes_ask = 100 - 90 = 10.
        let quotes = BestQuotes { yes_bid: 85, yes_ask: 90, no_bid: 0, no_ask: 100 };
        let action = BailoutController::evaluate(&position(Side::No, 50), &quotes, expiry, now, &config());
        assert_eq!(
            action,
            BailoutAction::Bail { ticker: "T1".to_string(), side: Side::No, price: 10, qty: 10 }
        );
    }
}
