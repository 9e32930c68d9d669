//! The per-tick decision cycle: drain the kill switch, expire stale pending
//! orders, refresh market/fair-value state, evaluate every tracked matchup,
//! then run the auto-close and bailout passes over whatever is already
//! held. One tick runs to completion before the next begins — there is no
//! concurrent mutation of the registry or position ledger mid-tick.

use crate::auto_close::{AutoCloseAction, AutoCloseController};
use crate::bailout::{BailoutAction, BailoutController};
use crate::kill_switch::KillSwitch;
use algo_trade_core::events::{Position, Side};
use algo_trade_core::traits::{ExecutionHandler, FairValueProvider};
use algo_trade_core::EngineConfig;
use algo_trade_fees::FeeCalculator;
use algo_trade_kalshi::KalshiExecutor;
use algo_trade_market::{BestQuotes, MarketIndex, OrderBookCache, StalenessTracker};
use algo_trade_position::{PendingOrderRegistry, PositionTracker};
use algo_trade_strategy::{evaluate_best_side, EvaluatedSide, EvaluatorConfig, RiskCheckInput, RiskLimits, RiskManager};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// One game the engine loop is configured to evaluate every tick. There is
/// no live schedule-discovery subsystem here; the operator supplies the
/// watchlist (e.g. from a slate pulled once each morning) and the loop just
/// resolves each entry against whatever [`MarketIndex`] currently holds.
#[derive(Debug, Clone)]
pub struct TrackedMatchup {
    pub sport: String,
    pub target_team: String,
    pub home_team: String,
    pub away_team: String,
    pub date: NaiveDate,
}

/// Resolved once a matchup's ticker is found in the index, so the auto-close
/// pass can recover which sport/team/orientation a held ticker belongs to
/// without re-running the matcher over every tracked matchup each tick.
#[derive(Debug, Clone)]
struct TickerInfo {
    sport: String,
    target_team: String,
    is_inverse: bool,
}

pub enum TickOutcome {
    /// The tick ran normally; the loop should keep going.
    Continued,
    /// The kill switch fired this tick. Every ACKed order was cancelled and
    /// the registry drained; the caller should stop calling `tick`.
    Killed,
}

/// Converts a ticker's live quotes into the orientation the strategy and
/// fair-value provider both reason in (the target team's YES side),
/// matching the swap [`algo_trade_market::MatchedMarket::is_inverse`]
/// already applies to the REST snapshot.
fn target_oriented_quotes(quotes: BestQuotes, is_inverse: bool) -> BestQuotes {
    if is_inverse {
        BestQuotes {
            yes_bid: quotes.no_bid,
            yes_ask: quotes.no_ask,
            no_bid: quotes.yes_bid,
            no_ask: quotes.yes_ask,
        }
    } else {
        quotes
    }
}

/// Translates a target-oriented fair value into the probability that the
/// *exchange's* `exchange_side` of an (possibly inverted) listed market
/// resolves true, for the auto-close controller, which needs a fair value
/// in terms of the side actually held rather than the target team's side.
fn fair_value_for_exchange_side(target_fv_cents: u32, is_inverse: bool, exchange_side: Side) -> u32 {
    let exchange_side_is_target_win = match (is_inverse, exchange_side) {
        (false, Side::Yes) | (true, Side::No) => true,
        (false, Side::No) | (true, Side::Yes) => false,
    };
    if exchange_side_is_target_win {
        target_fv_cents
    } else {
        100u32.saturating_sub(target_fv_cents)
    }
}

pub struct EngineLoop {
    executor: KalshiExecutor,
    orderbook: Arc<Mutex<OrderBookCache>>,
    market_index: MarketIndex,
    sport: String,
    matchups: Vec<TrackedMatchup>,
    ticker_info: HashMap<String, TickerInfo>,
    staleness: Arc<StalenessTracker>,
    positions: Arc<PositionTracker>,
    registry: Arc<PendingOrderRegistry>,
    auto_close: AutoCloseController,
    risk: RiskManager,
    fees: FeeCalculator,
    fair_value: Arc<dyn FairValueProvider>,
    config: EngineConfig,
    kill_switch: KillSwitch,
    paused: bool,
    last_market_poll: Option<DateTime<Utc>>,
    last_portfolio_poll: Option<DateTime<Utc>>,
}

const MARKETS_SOURCE: &str = "kalshi:markets";
const PORTFOLIO_POLL_INTERVAL_SECS: i64 = 5;
const WS_FRESHNESS_HORIZON_SECS: u64 = 15;

impl EngineLoop {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        executor: KalshiExecutor,
        orderbook: Arc<Mutex<OrderBookCache>>,
        staleness: Arc<StalenessTracker>,
        sport: String,
        matchups: Vec<TrackedMatchup>,
        positions: Arc<PositionTracker>,
        registry: Arc<PendingOrderRegistry>,
        fair_value: Arc<dyn FairValueProvider>,
        config: EngineConfig,
        kill_switch: KillSwitch,
    ) -> Self {
        let risk = RiskManager::new(RiskLimits {
            max_contracts_per_ticker: u64::from(config.edges.trade_size_contracts),
            max_positions_per_sport: config.risk.max_positions_per_sport,
            max_aggregate_exposure_cents: config.risk.aggregate_exposure_cap_cents,
            max_concurrent_markets: config.risk.max_positions,
            min_volume: config.risk.min_liquidity_contracts,
            max_spread_cents: config.risk.max_bid_ask_spread_cents,
        });

        Self {
            executor,
            orderbook,
            market_index: MarketIndex::new(&sport),
            sport,
            matchups,
            ticker_info: HashMap::new(),
            staleness,
            positions,
            registry,
            auto_close: AutoCloseController::new(),
            risk,
            fees: FeeCalculator::new(),
            fair_value,
            config,
            kill_switch,
            paused: false,
            last_market_poll: None,
            last_portfolio_poll: None,
        }
    }

    fn evaluator_config(&self) -> EvaluatorConfig {
        let edges = &self.config.edges;
        EvaluatorConfig {
            taker_threshold_cents: edges.taker_edge_threshold_cents,
            maker_threshold_cents: edges.maker_edge_threshold_cents,
            min_edge_after_fees_cents: i64::from(edges.min_edge_after_fees_cents),
            bankroll_cents: self.config.risk.bankroll_cents,
            kelly_fraction: edges.kelly_fraction,
            max_contracts: u64::from(edges.trade_size_contracts),
            slippage_buffer_cents: edges.slippage_buffer_cents,
        }
    }

    /// Runs one tick. `now` is passed in rather than read internally so
    /// tests can drive the clock explicitly.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> anyhow::Result<TickOutcome> {
        if self.kill_switch.poll() {
            self.handle_kill().await?;
            return Ok(TickOutcome::Killed);
        }
        if self.paused {
            return Ok(TickOutcome::Continued);
        }

        self.expire_stale_orders(now).await;

        if self.should_poll_markets(now) {
            self.poll_markets(now).await?;
        }

        self.evaluate_matchups(now).await;
        self.run_auto_close().await;
        self.run_bailout(now).await;

        if self.should_poll_portfolio(now) {
            self.poll_portfolio(now).await?;
        }

        Ok(TickOutcome::Continued)
    }

    /// Step 1: no new orders are submitted once a kill is observed; every
    /// ACKed order is cancelled, then the registry is emptied, before this
    /// returns and the caller stops ticking.
    async fn handle_kill(&mut self) -> anyhow::Result<()> {
        self.paused = true;
        let drained = self.registry.drain();
        for entry in drained {
            if let Some(order_id) = entry.order_id {
                if let Err(e) = self.executor.cancel(&order_id).await {
                    warn!(order_id, error = %e, "kill switch: failed to cancel order");
                }
            }
        }
        info!("kill switch observed, engine loop stopping");
        Ok(())
    }

    /// Step 2: orders that never resolved within `order_timeout_s`. If the
    /// exchange did ACK one before it timed out, the cancel is best-effort —
    /// logged on failure, never fatal for the tick.
    async fn expire_stale_orders(&mut self, now: DateTime<Utc>) {
        let max_age = ChronoDuration::seconds(self.config.cadence.order_timeout_s as i64);
        for expired in self.registry.expire_older_than(max_age, now) {
            if let Some(order_id) = expired.order_id {
                if let Err(e) = self.executor.cancel(&order_id).await {
                    warn!(ticker = %expired.ticker, order_id, error = %e, "failed to cancel expired order");
                }
            }
        }
    }

    fn should_poll_markets(&self, now: DateTime<Utc>) -> bool {
        let interval = if self.config.cadence.turbo_mode {
            self.config.cadence.poll_interval_turbo_s
        } else {
            self.config.cadence.poll_interval_normal_s
        };
        match self.last_market_poll {
            None => true,
            Some(last) => now - last >= ChronoDuration::seconds(interval as i64),
        }
    }

    /// Step 3: refreshes the market index from a fresh `GET /markets` poll
    /// and rebuilds the ticker→matchup cache used by the auto-close pass.
    async fn poll_markets(&mut self, now: DateTime<Utc>) -> anyhow::Result<()> {
        let markets = self
            .executor
            .client()
            .get_markets(None, Some("open"))
            .await?
            .into_iter()
            .filter_map(|m| m.into_exchange_market())
            .collect::<Vec<_>>();

        self.market_index.rebuild(markets);
        self.staleness.record_fetch(MARKETS_SOURCE, now);
        self.last_market_poll = Some(now);

        self.ticker_info.clear();
        for matchup in &self.matchups {
            if let Some(matched) =
                self.market_index
                    .find_match(&matchup.target_team, &matchup.home_team, &matchup.away_team, matchup.date)
            {
                self.ticker_info.insert(
                    matched.market.ticker.clone(),
                    TickerInfo {
                        sport: matchup.sport.clone(),
                        target_team: matchup.target_team.clone(),
                        is_inverse: matched.is_inverse,
                    },
                );
            }
        }
        Ok(())
    }

    /// Step 5: for every tracked matchup whose market is matched and fresh,
    /// compute fair value, evaluate both sides, gate through risk, and
    /// submit if the registry doesn't already have this ticker outstanding.
    ///
    /// Step 4 (applying WS snapshot/delta messages into the depth book) is
    /// not performed here — the streaming client owns that cache directly
    /// and is driven by its own background task; this step only reads the
    /// book it maintains.
    async fn evaluate_matchups(&mut self, now: DateTime<Utc>) {
        let evaluator_cfg = self.evaluator_config();
        let matchups = self.matchups.clone();

        for matchup in &matchups {
            let Some(matched) = self.market_index.find_match(
                &matchup.target_team,
                &matchup.home_team,
                &matchup.away_team,
                matchup.date,
            ) else {
                continue;
            };
            let ticker = matched.market.ticker.clone();

            if !self.staleness.fetch_fresh(MARKETS_SOURCE, now) {
                continue;
            }
            let ws_fresh = self.staleness.data_fresh(&ticker, Duration::from_secs(WS_FRESHNESS_HORIZON_SECS), now);
            if !ws_fresh {
                continue;
            }
            if self.registry.is_pending(&ticker) {
                continue;
            }

            let (fair_value_cents, _bookmaker_count, _spread) =
                match self.fair_value.fair_value(&matchup.sport, &matchup.target_team).await {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(ticker = %ticker, error = %e, "no usable fair value this tick, skipping");
                        continue;
                    }
                };

            let raw_quotes = self.orderbook.lock().best(&ticker);
            let quotes = target_oriented_quotes(raw_quotes, matched.is_inverse);

            let dual = evaluate_best_side(
                &self.fees,
                &evaluator_cfg,
                fair_value_cents,
                quotes.yes_bid,
                quotes.yes_ask,
                quotes.no_bid,
                quotes.no_ask,
            );

            use algo_trade_core::events::TradeAction;
            if dual.signal.action == TradeAction::Skip {
                continue;
            }

            if let Err(rejection) = self.gate_risk(&matchup.sport, &ticker, &dual.signal, matched.market.volume, &raw_quotes) {
                warn!(ticker = %ticker, ?rejection, "risk gate rejected candidate buy");
                continue;
            }

            self.submit_entry(&ticker, dual.side, matched.is_inverse, &dual.signal, now).await;
        }
    }

    fn gate_risk(
        &self,
        sport: &str,
        ticker: &str,
        signal: &algo_trade_core::events::StrategySignal,
        volume: u64,
        raw_quotes: &BestQuotes,
    ) -> Result<(), algo_trade_strategy::RiskRejection> {
        let held = self.positions.held_positions();
        let pending = self.registry.all_pending();
        let current_aggregate_exposure_cents = held.iter().map(|p| p.cost_basis).sum::<u64>()
            + pending.iter().map(|p| u64::from(p.price) * p.quantity).sum::<u64>();

        self.risk.check(&RiskCheckInput {
            ticker,
            sport,
            requested_quantity: signal.quantity,
            requested_cost_cents: u64::from(signal.price) * signal.quantity,
            best_bid: raw_quotes.yes_bid,
            best_ask: raw_quotes.yes_ask,
            volume,
            current_aggregate_exposure_cents,
            held_positions_per_sport: held.len() as u32,
            distinct_markets_held: (held.len() + pending.len()) as u32,
        })
    }

    async fn submit_entry(
        &mut self,
        ticker: &str,
        side: EvaluatedSide,
        is_inverse: bool,
        signal: &algo_trade_core::events::StrategySignal,
        now: DateTime<Utc>,
    ) {
        use algo_trade_core::events::TradeAction;

        if !self.registry.try_register(ticker, signal.quantity, signal.price, signal.action == TradeAction::TakerBuy, now) {
            return;
        }
        if self.config.dry_run {
            info!(ticker, ?side, price = signal.price, qty = signal.quantity, "dry run: would submit entry");
            return;
        }

        // `side` is in target-oriented terms; translate to the side actually
        // quoted on this ticker before submitting, undoing the matcher's swap.
        let target_side = match side {
            EvaluatedSide::Yes => Side::Yes,
            EvaluatedSide::No => Side::No,
        };
        let exchange_side = if is_inverse { target_side.opposite() } else { target_side };
        let is_taker = signal.action == TradeAction::TakerBuy;

        match self
            .executor
            .submit(ticker, exchange_side, false, signal.price, signal.quantity, is_taker)
            .await
        {
            Ok(ack) => {
                self.registry.set_order_id(ticker, ack.order_id.clone());
                if ack.filled_count > 0 {
                    self.positions.record_optimistic(
                        Position {
                            ticker: ticker.to_string(),
                            side: exchange_side,
                            quantity: ack.filled_count,
                            avg_price: signal.price,
                            cost_basis: u64::from(signal.price) * ack.filled_count,
                            fees_paid: self.fees.fee(signal.price, ack.filled_count, is_taker),
                            settlement_status: algo_trade_core::events::SettlementStatus::Unsettled,
                            realized_pnl: None,
                        },
                        now,
                    );
                }
            }
            Err(e) => {
                warn!(ticker, error = %e, "order submission failed");
                self.registry.remove(ticker);
            }
        }
    }

    /// Step 6: quotes or re-quotes an exit for everything currently held.
    async fn run_auto_close(&mut self) {
        for position in self.positions.held_positions() {
            let Some(info) = self.ticker_info.get(&position.ticker).cloned() else {
                continue;
            };
            let Ok((target_fv, _, _)) = self.fair_value.fair_value(&info.sport, &info.target_team).await else {
                continue;
            };
            let held_fv = fair_value_for_exchange_side(target_fv, info.is_inverse, position.side);

            let action = self.auto_close.evaluate(&position, held_fv, &self.fees, self.config.auto_close.auto_close_margin_pct);
            match action {
                AutoCloseAction::None => {}
                AutoCloseAction::Place { ticker, side, price, qty } => {
                    self.place_close_order(&ticker, side, price, qty).await;
                }
                AutoCloseAction::Replace { ticker, side, old_order_id, price, qty } => {
                    if let Some(id) = &old_order_id {
                        if let Err(e) = self.executor.cancel(id).await {
                            warn!(ticker = %ticker, order_id = %id, error = %e, "failed to cancel resting auto-close order");
                        }
                    }
                    self.place_close_order(&ticker, side, price, qty).await;
                }
            }
        }
    }

    async fn place_close_order(&mut self, ticker: &str, side: Side, price: u32, qty: u64) {
        if self.config.dry_run {
            info!(ticker, ?side, price, qty, "dry run: would place auto-close sell");
            self.auto_close.record_placed(ticker, None, price);
            return;
        }
        match self.executor.submit(ticker, side, true, price, qty, false).await {
            Ok(ack) => self.auto_close.record_placed(ticker, Some(ack.order_id), price),
            Err(e) => warn!(ticker, error = %e, "failed to place auto-close sell"),
        }
    }

    /// Step 7: forces an exit once a position is close enough to expiry and
    /// deep enough underwater. Any resting auto-close sell is cancelled
    /// first so the bailout's IOC doesn't compete against our own maker
    /// order for the same fill.
    async fn run_bailout(&mut self, now: DateTime<Utc>) {
        for position in self.positions.held_positions() {
            let Some(expiration_time) = self.expiration_for(&position.ticker) else {
                continue;
            };
            let quotes = self.orderbook.lock().best(&position.ticker);
            let action =
                BailoutController::evaluate(&position, &quotes, expiration_time, now, &self.config.bailout);

            if let BailoutAction::Bail { ticker, side, price, qty } = action {
                if let Some(id) = self.registry.get_order_id(&ticker) {
                    if let Err(e) = self.executor.cancel(&id).await {
                        warn!(ticker = %ticker, error = %e, "failed to cancel resting order before bailout");
                    }
                }
                self.auto_close.clear(&ticker);

                if self.config.dry_run {
                    info!(ticker, ?side, price, qty, "dry run: would bail out of position");
                    continue;
                }
                if let Err(e) = self.executor.submit(&ticker, side, true, price, qty, true).await {
                    warn!(ticker, error = %e, "bailout sell failed");
                }
            }
        }
    }

    fn expiration_for(&self, ticker: &str) -> Option<DateTime<Utc>> {
        self.ticker_info.get(ticker)?;
        self.matchups.iter().find_map(|m| {
            let matched = self.market_index.find_match(&m.target_team, &m.home_team, &m.away_team, m.date)?;
            (matched.market.ticker == ticker).then_some(matched.market.expiration_time)
        })
    }

    fn should_poll_portfolio(&self, now: DateTime<Utc>) -> bool {
        match self.last_portfolio_poll {
            None => true,
            Some(last) => now - last >= ChronoDuration::seconds(PORTFOLIO_POLL_INTERVAL_SECS),
        }
    }

    /// Step 8: reconciles the local ledger against an exchange portfolio
    /// poll, the authoritative source once it responds.
    async fn poll_portfolio(&mut self, now: DateTime<Utc>) -> anyhow::Result<()> {
        let reported = self
            .executor
            .client()
            .get_positions()
            .await?
            .into_iter()
            .map(|p| p.into_core_position())
            .collect::<Vec<_>>();

        let poll_interval = Duration::from_secs(PORTFOLIO_POLL_INTERVAL_SECS as u64);
        let registry = Arc::clone(&self.registry);
        self.positions.merge_exchange_positions(&reported, now, poll_interval, |ticker| registry.is_pending(ticker));
        self.last_portfolio_poll = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algo_trade_core::events::SettlementStatus;

    #[test]
    fn target_oriented_quotes_passes_through_when_not_inverse() {
        let quotes = BestQuotes { yes_bid: 10, yes_ask: 12, no_bid: 85, no_ask: 90 };
        assert_eq!(target_oriented_quotes(quotes, false), quotes);
    }

    #[test]
    fn target_oriented_quotes_swaps_when_inverse() {
        let quotes = BestQuotes { yes_bid: 10, yes_ask: 12, no_bid: 85, no_ask: 90 };
        let swapped = target_oriented_quotes(quotes, true);
        assert_eq!(swapped.yes_bid, 85);
        assert_eq!(swapped.yes_ask, 90);
        assert_eq!(swapped.no_bid, 10);
        assert_eq!(swapped.no_ask, 12);
    }

    #[test]
    fn fair_value_for_exchange_side_matches_direct_listing() {
        assert_eq!(fair_value_for_exchange_side(65, false, Side::Yes), 65);
        assert_eq!(fair_value_for_exchange_side(65, false, Side::No), 35);
    }

    #[test]
    fn fair_value_for_exchange_side_inverts_per_scenario() {
        // Target's YES fair value is 65; the listed market only quotes the
        // opposite team, so exchange-YES represents "target loses".
        assert_eq!(fair_value_for_exchange_side(65, true, Side::Yes), 35);
        assert_eq!(fair_value_for_exchange_side(65, true, Side::No), 65);
    }

    fn sample_position() -> Position {
        Position {
            ticker: "T1".to_string(),
            side: Side::Yes,
            quantity: 10,
            avg_price: 50,
            cost_basis: 500,
            fees_paid: 0,
            settlement_status: SettlementStatus::Unsettled,
            realized_pnl: None,
        }
    }

    #[test]
    fn sample_position_round_trips_through_fair_value_helper() {
        let p = sample_position();
        assert_eq!(fair_value_for_exchange_side(60, false, p.side), 60);
    }
}
