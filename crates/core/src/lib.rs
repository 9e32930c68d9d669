pub mod config;
pub mod config_loader;
pub mod errors;
pub mod events;
pub mod traits;

pub use config::{AutoCloseConfig, BailoutConfig, CadenceConfig, EdgeConfig, EngineConfig, RiskConfig};
pub use config_loader::ConfigLoader;
pub use errors::EngineError;
pub use events::{
    normalize_team, ExchangeMarket, MatchKey, PendingOrder, Position, SettlementStatus, Side,
    StrategySignal, TradeAction,
};
pub use traits::{ExecutionHandler, FairValueProvider, OrderAck, PendingOrderSource, PositionSource};
