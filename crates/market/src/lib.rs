//! Market matching and order book state for the sports-arbitrage engine.
//!
//! - [`matcher`]: builds a key-based index of exchange markets by matchup
//!   and resolves a target team to its (possibly inverted) market.
//! - [`orderbook`]: per-ticker depth book driven by snapshot + delta
//!   messages from the exchange's streaming feed.
//! - [`staleness`]: tracks last-update times so stale feeds suppress new
//!   bids instead of trading on a frozen quote.

pub mod matcher;
pub mod orderbook;
pub mod staleness;

pub use matcher::{MarketIndex, MatchedMarket};
pub use orderbook::{BestQuotes, BookSide, OrderBookCache};
pub use staleness::StalenessTracker;
