//! Decides whether, and how, to enter a position: Kelly-sizes both a taker
//! and a maker path against the current book, then picks whichever clears
//! its threshold and nets a profit after fees — or skips.

use algo_trade_core::events::{StrategySignal, TradeAction};
use algo_trade_fees::FeeCalculator;

#[derive(Debug, Clone, Copy)]
pub struct EvaluatorConfig {
    pub taker_threshold_cents: u8,
    pub maker_threshold_cents: u8,
    pub min_edge_after_fees_cents: i64,
    pub bankroll_cents: u64,
    pub kelly_fraction: f64,
    pub max_contracts: u64,
    pub slippage_buffer_cents: u8,
}

/// Kelly-optimal stake for a binary contract costing `price_cents` that pays
/// out 100 cents, using `fair_value_cents` as the true win probability.
/// `f* = (b·p − q)/b` with `b = (100 − price)/price`.
#[must_use]
pub fn kelly_size(fair_value_cents: u32, price_cents: u32, bankroll_cents: u64, kelly_fraction: f64) -> u64 {
    if price_cents == 0 || price_cents >= 100 {
        return 0;
    }
    let p = f64::from(fair_value_cents) / 100.0;
    let q = 1.0 - p;
    let b = (100.0 - f64::from(price_cents)) / f64::from(price_cents);
    if b <= 0.0 {
        return 0;
    }
    let f_star = (b * p - q) / b;
    if f_star <= 0.0 {
        return 0;
    }
    let stake_cents = f_star * kelly_fraction * bankroll_cents as f64;
    (stake_cents / f64::from(price_cents)).floor().max(0.0) as u64
}

/// Evaluates a single market with a slippage buffer applied to the raw edge
/// before comparing against thresholds.
#[must_use]
pub fn evaluate(
    fees: &FeeCalculator,
    config: &EvaluatorConfig,
    fair_value_cents: u32,
    best_bid: u32,
    best_ask: u32,
) -> StrategySignal {
    if best_ask == 0 || fair_value_cents == 0 {
        return StrategySignal::skip(0);
    }

    let raw_edge = fair_value_cents as i32 - best_ask as i32;
    let effective_edge = raw_edge - i32::from(config.slippage_buffer_cents);

    if effective_edge < i32::from(config.maker_threshold_cents) {
        return StrategySignal::skip(raw_edge);
    }

    let taker_qty = kelly_size(fair_value_cents, best_ask, config.bankroll_cents, config.kelly_fraction)
        .min(config.max_contracts);
    let taker_entry_fee = fees.fee(best_ask, taker_qty, true) as i64;
    let taker_exit_fee = fees.fee(fair_value_cents, taker_qty, false) as i64;
    let taker_profit = (fair_value_cents as i64 - best_ask as i64) * taker_qty as i64
        - taker_entry_fee
        - taker_exit_fee
        - i64::from(config.slippage_buffer_cents) * taker_qty as i64;

    let maker_price = best_bid.saturating_add(1).min(99);
    let maker_qty = kelly_size(fair_value_cents, maker_price, config.bankroll_cents, config.kelly_fraction)
        .min(config.max_contracts);
    let maker_entry_fee = fees.fee(maker_price, maker_qty, false) as i64;
    let maker_exit_fee = fees.fee(fair_value_cents, maker_qty, false) as i64;
    let maker_profit = (fair_value_cents as i64 - maker_price as i64) * maker_qty as i64
        - maker_entry_fee
        - maker_exit_fee;

    if effective_edge >= i32::from(config.taker_threshold_cents)
        && taker_profit >= config.min_edge_after_fees_cents
    {
        StrategySignal {
            action: TradeAction::TakerBuy,
            price: best_ask,
            quantity: taker_qty,
            edge_cents: raw_edge,
            net_profit_estimate_cents: taker_profit,
        }
    } else if effective_edge >= i32::from(config.maker_threshold_cents)
        && maker_profit >= config.min_edge_after_fees_cents
    {
        StrategySignal {
            action: TradeAction::MakerBuy { bid_price: maker_price },
            price: maker_price,
            quantity: maker_qty,
            edge_cents: raw_edge,
            net_profit_estimate_cents: maker_profit,
        }
    } else {
        StrategySignal::skip(raw_edge)
    }
}

/// Which side ended up being the better trade in [`evaluate_best_side`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatedSide {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy)]
pub struct DualSideSignal {
    pub signal: StrategySignal,
    pub side: EvaluatedSide,
}

/// Evaluates both YES and NO sides of the same market (NO's fair value is
/// the complement) and returns whichever is the better opportunity.
#[must_use]
pub fn evaluate_best_side(
    fees: &FeeCalculator,
    config: &EvaluatorConfig,
    fair_value_cents: u32,
    yes_bid: u32,
    yes_ask: u32,
    no_bid: u32,
    no_ask: u32,
) -> DualSideSignal {
    let yes_signal = evaluate(fees, config, fair_value_cents, yes_bid, yes_ask);
    let no_fair_value = 100u32.saturating_sub(fair_value_cents);
    let no_signal = evaluate(fees, config, no_fair_value, no_bid, no_ask);

    let score = |s: &StrategySignal| -> i64 {
        if s.action != TradeAction::Skip {
            s.net_profit_estimate_cents
        } else {
            i64::from(s.edge_cents)
        }
    };

    if no_signal.action != TradeAction::Skip && score(&no_signal) > score(&yes_signal) {
        DualSideSignal { signal: no_signal, side: EvaluatedSide::No }
    } else {
        DualSideSignal { signal: yes_signal, side: EvaluatedSide::Yes }
    }
}

/// Downgrades a signal based on a momentum score: below the maker threshold
/// forces a skip; between maker and taker thresholds caps a taker buy down
/// to a maker buy; at or above the taker threshold, passes through.
#[must_use]
pub fn momentum_gate(
    signal: StrategySignal,
    momentum_score: f64,
    maker_momentum_threshold: u8,
    taker_momentum_threshold: u8,
) -> StrategySignal {
    match signal.action {
        TradeAction::Skip => signal,
        TradeAction::TakerBuy => {
            if momentum_score < f64::from(maker_momentum_threshold) {
                StrategySignal { action: TradeAction::Skip, quantity: 0, ..signal }
            } else if momentum_score < f64::from(taker_momentum_threshold) {
                let bid_price = signal.price.saturating_sub(1).max(1);
                StrategySignal { action: TradeAction::MakerBuy { bid_price }, price: bid_price, ..signal }
            } else {
                signal
            }
        }
        TradeAction::MakerBuy { .. } => {
            if momentum_score < f64::from(maker_momentum_threshold) {
                StrategySignal { action: TradeAction::Skip, quantity: 0, ..signal }
            } else {
                signal
            }
        }
    }
}
