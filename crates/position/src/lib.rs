//! Authoritative position ledger and in-flight order registry. The rest of
//! the engine treats these as the single source of truth for "what do we
//! hold" and "what might still be working" between exchange polls.

pub mod registry;
pub mod tracker;

pub use registry::PendingOrderRegistry;
pub use tracker::{reconcile_startup, PositionTracker};
