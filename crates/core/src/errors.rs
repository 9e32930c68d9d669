//! Shared error taxonomy. Every leaf crate's own error type maps into one of
//! these kinds so the engine loop can decide propagation policy without
//! string-matching: retry locally, drop-and-log, skip-this-market, pause, or
//! refuse to start.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Network blips, timeouts, rate limiting, or a request aborted because a
    /// newer poll superseded it. Retried locally; never halts the engine.
    #[error("transient: {0}")]
    Transient(String),

    /// Malformed JSON, an unrecognized message type, or a depth-book delta
    /// that would drive a level negative. The offending message is dropped.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// A decision-level rule rejected this market for this tick: devig
    /// spread too high, title failed to parse, match key missing.
    #[error("logical: {0}")]
    Logical(String),

    /// The exchange rejected our signature or API key.
    #[error("credentials rejected: {0}")]
    Credentials(String),

    /// Startup reconciliation exhausted its retries, or the account lacks
    /// funds for a submission already in flight. The engine must not trade.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl EngineError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Whether the engine must pause all trading until a human intervenes.
    #[must_use]
    pub fn is_halting(&self) -> bool {
        matches!(self, Self::Credentials(_) | Self::Fatal(_))
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_retryable_others_are_not() {
        assert!(EngineError::Transient("timeout".into()).is_retryable());
        assert!(!EngineError::Protocol("bad json".into()).is_retryable());
        assert!(!EngineError::Fatal("no funds".into()).is_retryable());
    }

    #[test]
    fn credentials_and_fatal_are_halting() {
        assert!(EngineError::Credentials("bad sig".into()).is_halting());
        assert!(EngineError::Fatal("reconcile failed".into()).is_halting());
        assert!(!EngineError::Logical("spread too high".into()).is_halting());
    }
}
