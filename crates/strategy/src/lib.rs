pub mod evaluator;
pub mod risk;

pub use evaluator::{
    evaluate, evaluate_best_side, kelly_size, momentum_gate, DualSideSignal, EvaluatedSide,
    EvaluatorConfig,
};
pub use risk::{RiskCheckInput, RiskLimits, RiskManager, RiskRejection};
