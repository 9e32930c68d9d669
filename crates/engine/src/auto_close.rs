//! Quotes an exit for every held position that isn't already being closed.
//! The target price is never below either the current fair value or
//! break-even, so an auto-close never locks in a loss that could have been
//! avoided by just holding.
//!
//! Per-ticker "is there already a resting sell here" state lives in this
//! controller, not behind a process-global singleton — it's owned by
//! whichever engine loop instance holds the controller.

use algo_trade_core::events::{Position, Side};
use algo_trade_fees::FeeCalculator;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct ActiveSell {
    order_id: Option<String>,
    price: u32,
}

/// What the engine loop should do for one held position this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoCloseAction {
    /// Nothing to do: either no edge to quote yet, or the resting sell is
    /// already at the right price.
    None,
    /// No sell order exists for this ticker yet; place one.
    Place { ticker: String, side: Side, price: u32, qty: u64 },
    /// A sell order exists at the wrong price; cancel it, then place a new
    /// one at `price` once the cancel confirms.
    Replace { ticker: String, side: Side, old_order_id: Option<String>, price: u32, qty: u64 },
}

#[derive(Default)]
pub struct AutoCloseController {
    active: HashMap<String, ActiveSell>,
}

impl AutoCloseController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `fair_value_cents` must already be for the held side (the caller
    /// inverts it via the matcher's `is_inverse` flag before calling this).
    #[must_use]
    pub fn evaluate(
        &self,
        position: &Position,
        fair_value_cents: u32,
        fees: &FeeCalculator,
        auto_close_margin_pct: f64,
    ) -> AutoCloseAction {
        let min_sell_price = fees.break_even_sell_price(position.cost_basis, position.quantity, true);
        let base = f64::from(fair_value_cents.max(min_sell_price));
        let target = (base * (1.0 + auto_close_margin_pct / 100.0))
            .floor()
            .min(99.0) as u32;

        match self.active.get(&position.ticker) {
            None => AutoCloseAction::Place {
                ticker: position.ticker.clone(),
                side: position.side,
                price: target,
                qty: position.quantity,
            },
            Some(existing) if existing.price != target => AutoCloseAction::Replace {
                ticker: position.ticker.clone(),
                side: position.side,
                old_order_id: existing.order_id.clone(),
                price: target,
                qty: position.quantity,
            },
            Some(_) => AutoCloseAction::None,
        }
    }

    /// Records that a sell is now resting at `price` for `ticker`, after the
    /// engine loop has actually submitted it (or re-submitted it following a
    /// `Replace`).
    pub fn record_placed(&mut self, ticker: &str, order_id: Option<String>, price: u32) {
        self.active.insert(ticker.to_string(), ActiveSell { order_id, price });
    }

    /// Drops tracking for `ticker` — the position closed, or the sell was
    /// cancelled without a replacement being placed yet.
    pub fn clear(&mut self, ticker: &str) {
        self.active.remove(ticker);
    }
}
