use serde::{Deserialize, Serialize};

/// Top-level configuration for the trading engine. Grouped into sections that
/// mirror the component list in the design: risk limits, edge thresholds,
/// cadences, and bailout/auto-close behavior each get their own sub-struct so
/// a TOML file can override just the section it cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub edges: EdgeConfig,
    #[serde(default)]
    pub cadence: CadenceConfig,
    #[serde(default)]
    pub auto_close: AutoCloseConfig,
    #[serde(default)]
    pub bailout: BailoutConfig,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    pub max_positions: u32,
    pub max_positions_per_ticker: u32,
    pub max_positions_per_sport: u32,
    pub enable_sport_diversification: bool,
    pub min_liquidity_contracts: u64,
    pub max_bid_ask_spread_cents: u32,
    pub enable_liquidity_checks: bool,
    pub aggregate_exposure_cap_cents: u64,
    pub bankroll_cents: u64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_positions: 20,
            max_positions_per_ticker: 1,
            max_positions_per_sport: 5,
            enable_sport_diversification: true,
            min_liquidity_contracts: 10,
            max_bid_ask_spread_cents: 8,
            enable_liquidity_checks: true,
            aggregate_exposure_cap_cents: 500_00,
            bankroll_cents: 1_000_00,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeConfig {
    pub taker_edge_threshold_cents: u8,
    pub maker_edge_threshold_cents: u8,
    pub min_edge_after_fees_cents: u8,
    pub slippage_buffer_cents: u8,
    pub kelly_fraction: f64,
    pub trade_size_contracts: u32,
    pub margin_pct: f64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            taker_edge_threshold_cents: 5,
            maker_edge_threshold_cents: 2,
            min_edge_after_fees_cents: 1,
            slippage_buffer_cents: 1,
            kelly_fraction: 0.25,
            trade_size_contracts: 100,
            margin_pct: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadenceConfig {
    pub turbo_mode: bool,
    pub poll_interval_normal_s: u64,
    pub poll_interval_turbo_s: u64,
    pub stale_data_threshold_s: u64,
    pub order_timeout_s: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            turbo_mode: false,
            poll_interval_normal_s: 15,
            poll_interval_turbo_s: 3,
            stale_data_threshold_s: 30,
            order_timeout_s: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoCloseConfig {
    /// Percentage added on top of `max(fair_value, break_even)` when quoting
    /// an exit. Must be non-negative: see `ConfigLoader::load` validation.
    pub auto_close_margin_pct: f64,
}

impl Default for AutoCloseConfig {
    fn default() -> Self {
        Self {
            auto_close_margin_pct: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BailoutConfig {
    pub bailout_enabled: bool,
    pub bailout_hours_before_expiry: f64,
    pub bailout_trigger_pct: f64,
}

impl Default for BailoutConfig {
    fn default() -> Self {
        Self {
            bailout_enabled: true,
            bailout_hours_before_expiry: 2.0,
            bailout_trigger_pct: 25.0,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk: RiskConfig::default(),
            edges: EdgeConfig::default(),
            cadence: CadenceConfig::default(),
            auto_close: AutoCloseConfig::default(),
            bailout: BailoutConfig::default(),
            dry_run: true,
        }
    }
}
