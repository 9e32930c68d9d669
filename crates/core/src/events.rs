//! Domain types shared across the engine's crates: the exchange market
//! shape, the side enum, positions, pending orders, and the strategy's
//! signal type. Kept here (rather than duplicated per-crate) because every
//! one of `market`, `strategy`, `position`, and `engine` needs the same
//! definitions to talk to each other without a conversion layer at every
//! boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which side of a binary market a position or order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

/// Order-independent join key for a matchup: normalized team names plus the
/// game date, so that `(sport, date, {A, B})` always collides regardless of
/// which team is passed as home vs. away.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub sport: String,
    pub date: NaiveDate,
    pub teams: BTreeSet<String>,
}

impl MatchKey {
    #[must_use]
    pub fn new(sport: &str, date: NaiveDate, team_a: &str, team_b: &str) -> Self {
        let mut teams = BTreeSet::new();
        teams.insert(normalize_team(team_a));
        teams.insert(normalize_team(team_b));
        Self {
            sport: sport.to_ascii_uppercase(),
            date,
            teams,
        }
    }
}

/// Upper-cases, strips punctuation, drops common mascot suffixes, and
/// applies the handful of spelling normalizations odds feeds and exchanges
/// disagree on (`&` vs `AND`, `SAINT` vs `ST`).
#[must_use]
pub fn normalize_team(name: &str) -> String {
    const MASCOTS: &[&str] = &[
        "EAGLES", "HAWKS", "BEARS", "LIONS", "TIGERS", "BULLS", "CARDINALS", "FALCONS", "GIANTS",
        "JETS", "PACKERS", "PATRIOTS", "RAIDERS", "RAMS", "SAINTS", "TITANS", "BRONCOS",
        "BENGALS", "BROWNS", "COLTS", "JAGUARS", "CHIEFS", "CHARGERS", "DOLPHINS", "VIKINGS",
        "PANTHERS", "BUCCANEERS", "SEAHAWKS", "COMMANDERS", "COWBOYS", "STEELERS", "REDSKINS",
    ];

    let upper = name.to_ascii_uppercase();
    let cleaned: String = upper
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == ' ' || c == '&' { c } else { ' ' })
        .collect();
    let cleaned = cleaned.replace('&', "AND").replace("SAINT", "ST");

    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() > 1 {
        if let Some(last) = words.last() {
            if MASCOTS.contains(last) {
                words.pop();
            }
        }
    }
    words.join(" ")
}

/// An exchange's listing for one side of a matchup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeMarket {
    pub ticker: String,
    pub title: String,
    pub series: String,
    pub expiration_time: chrono::DateTime<chrono::Utc>,
    pub yes_bid: u32,
    pub yes_ask: u32,
    pub no_bid: u32,
    pub no_ask: u32,
    pub volume: u64,
}

impl ExchangeMarket {
    /// `yes_bid + no_ask <= 100` and `no_bid + yes_ask <= 100` and
    /// `yes_bid <= yes_ask` when both sides quote. Exchanges occasionally
    /// send momentarily-inconsistent books during fast updates; this is used
    /// to decide whether to trust a snapshot for this tick.
    #[must_use]
    pub fn prices_consistent(&self) -> bool {
        self.yes_bid + self.no_ask <= 100
            && self.no_bid + self.yes_ask <= 100
            && (self.yes_bid == 0 || self.yes_ask == 0 || self.yes_bid <= self.yes_ask)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementStatus {
    Unsettled,
    Settled,
}

/// A held position, maintained by the position tracker (authoritative) and
/// optimistically updated by the executor between polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub side: Side,
    pub quantity: u64,
    pub avg_price: u32,
    pub cost_basis: u64,
    pub fees_paid: u64,
    pub settlement_status: SettlementStatus,
    pub realized_pnl: Option<i64>,
}

/// An order the engine believes is (or was) in flight. `order_id` is absent
/// until the exchange ACKs the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub ticker: String,
    pub quantity: u64,
    pub price: u32,
    pub is_taker: bool,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub order_id: Option<String>,
}

/// The decision a single strategy evaluation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Skip,
    MakerBuy { bid_price: u32 },
    TakerBuy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategySignal {
    pub action: TradeAction,
    pub price: u32,
    pub quantity: u64,
    pub edge_cents: i32,
    pub net_profit_estimate_cents: i64,
}

impl StrategySignal {
    #[must_use]
    pub fn skip(edge_cents: i32) -> Self {
        Self {
            action: TradeAction::Skip,
            price: 0,
            quantity: 0,
            edge_cents,
            net_profit_estimate_cents: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent_across_spacing_and_case() {
        assert_eq!(
            normalize_team("Los Angeles Clippers"),
            normalize_team("los  angeles clippers")
        );
    }

    #[test]
    fn normalize_strips_mascot_and_ampersand() {
        assert_eq!(normalize_team("Philadelphia Eagles"), "PHILADELPHIA");
        assert_eq!(normalize_team("St. Louis & Sons"), "ST LOUIS AND SONS");
    }

    #[test]
    fn match_key_independent_of_team_order() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 30).unwrap();
        let a = MatchKey::new("NBA", date, "Lakers", "Celtics");
        let b = MatchKey::new("NBA", date, "Celtics", "Lakers");
        assert_eq!(a, b);
    }

    #[test]
    fn prices_consistent_rejects_crossed_book() {
        let mut market = ExchangeMarket {
            ticker: "T".into(),
            title: "X at Y".into(),
            series: "S".into(),
            expiration_time: chrono::Utc::now(),
            yes_bid: 60,
            yes_ask: 55,
            no_bid: 40,
            no_ask: 45,
            volume: 0,
        };
        assert!(!market.prices_consistent());
        market.yes_bid = 50;
        assert!(market.prices_consistent());
    }
}
