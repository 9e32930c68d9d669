//! The engine loop: ties the matcher, depth book, strategy evaluator, risk
//! manager, position tracker, pending-order registry, and exchange executor
//! together into the per-tick decision cycle, plus the auto-close and
//! bailout controllers that run over already-held positions.
//!
//! Everything that mutates shared state (the depth book, the registry, the
//! position ledger) does so between `await` points only — one tick's
//! evaluations run to completion before the next begins.

pub mod auto_close;
pub mod bailout;
pub mod fair_value_provider;
pub mod kill_switch;
pub mod run_loop;

pub use algo_trade_market::StalenessTracker;
pub use auto_close::{AutoCloseAction, AutoCloseController};
pub use bailout::{BailoutAction, BailoutController};
pub use fair_value_provider::{
    DevigFairValueProvider, GameState, OddsSource, PerSportFairValueProvider, ScoreFairValueProvider,
    ScoreSource,
};
pub use kill_switch::{KillCommand, KillSwitch};
pub use run_loop::{EngineLoop, TickOutcome, TrackedMatchup};
