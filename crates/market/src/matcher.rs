//! Builds a key-based index of exchange markets by matchup so the strategy
//! can look up "give me the market for the Lakers vs. Celtics tonight" in
//! O(1), instead of scanning every ticker for a three-letter abbreviation —
//! the older approach, which was O(N·M) and silently matched wrong teams
//! (`EAGLES` vs. `GOLDEN EAGLES`).

use algo_trade_core::events::{normalize_team, ExchangeMarket, MatchKey};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchupSide {
    Home,
    Away,
}

#[derive(Debug, Clone, Default)]
struct MatchEntry {
    away_team: String,
    home_team: String,
    away_market: Option<ExchangeMarket>,
    home_market: Option<ExchangeMarket>,
}

/// A market returned by [`MarketIndex::find_match`]. `is_inverse` tells the
/// caller whether the returned quotes need YES/NO swapped before use.
#[derive(Debug, Clone)]
pub struct MatchedMarket {
    pub market: ExchangeMarket,
    pub is_inverse: bool,
}

/// Per-sport index of markets keyed by matchup.
#[derive(Debug, Default)]
pub struct MarketIndex {
    sport: String,
    entries: HashMap<MatchKey, MatchEntry>,
}

impl MarketIndex {
    #[must_use]
    pub fn new(sport: &str) -> Self {
        Self {
            sport: sport.to_ascii_uppercase(),
            entries: HashMap::new(),
        }
    }

    /// Parses `"X at Y Winner?"` or `"X vs Y Winner?"` into `(away, home)`.
    #[must_use]
    pub fn parse_title(title: &str) -> Option<(String, String)> {
        let lower = title.to_ascii_lowercase();
        let (sep, sep_len) = if let Some(idx) = lower.find(" at ") {
            (idx, 4)
        } else if let Some(idx) = lower.find(" vs ") {
            (idx, 4)
        } else {
            return None;
        };

        let away = title[..sep].trim();
        let rest = title[sep + sep_len..].trim();
        let home = rest
            .trim_end_matches('?')
            .trim_end()
            .strip_suffix("Winner")
            .or(Some(rest.trim_end_matches('?').trim_end()))
            .unwrap_or(rest)
            .trim();

        if away.is_empty() || home.is_empty() {
            return None;
        }
        Some((away.to_string(), home.to_string()))
    }

    /// Heuristically determines which side of the matchup a market's ticker
    /// settles YES for, from its trailing `-`-separated segment.
    fn determine_side(ticker: &str, home_norm: &str, away_norm: &str) -> Option<MatchupSide> {
        let suffix = ticker.rsplit('-').next()?.to_ascii_uppercase();
        if suffix.is_empty() {
            return None;
        }
        if home_norm.split_whitespace().any(|w| w.starts_with(&suffix)) {
            return Some(MatchupSide::Home);
        }
        if away_norm.split_whitespace().any(|w| w.starts_with(&suffix)) {
            return Some(MatchupSide::Away);
        }
        None
    }

    /// Rebuilds the index from a fresh batch of markets, replacing whatever
    /// was there before. Markets whose title doesn't parse are logged and
    /// skipped rather than aborting the whole batch.
    pub fn rebuild(&mut self, markets: Vec<ExchangeMarket>) {
        self.entries.clear();
        for market in markets {
            let Some((away, home)) = Self::parse_title(&market.title) else {
                warn!(ticker = %market.ticker, title = %market.title, "unparsable market title, skipping");
                continue;
            };

            let date = market.expiration_time.date_naive();
            let key = MatchKey::new(&self.sport, date, &away, &home);
            let away_norm = normalize_team(&away);
            let home_norm = normalize_team(&home);

            let Some(side) = Self::determine_side(&market.ticker, &home_norm, &away_norm) else {
                warn!(ticker = %market.ticker, "could not determine matchup side from ticker, skipping");
                continue;
            };

            let entry = self.entries.entry(key).or_insert_with(|| MatchEntry {
                away_team: away.clone(),
                home_team: home.clone(),
                away_market: None,
                home_market: None,
            });

            match side {
                MatchupSide::Away => entry.away_market = Some(market),
                MatchupSide::Home => entry.home_market = Some(market),
            }
        }
    }

    /// Looks up the market for `target_team` in the `(home, away)` matchup on
    /// `date`. If only the opposite side was listed, returns it inverted
    /// (trading YES on `target` is equivalent to trading NO on the listed
    /// side) rather than reporting no match.
    #[must_use]
    pub fn find_match(
        &self,
        target_team: &str,
        home_team: &str,
        away_team: &str,
        date: NaiveDate,
    ) -> Option<MatchedMarket> {
        let key = MatchKey::new(&self.sport, date, home_team, away_team);
        let entry = self.entries.get(&key)?;

        let target_norm = normalize_team(target_team);
        let away_norm = normalize_team(away_team);
        let home_norm = normalize_team(home_team);

        if target_norm == away_norm {
            if let Some(m) = &entry.away_market {
                return Some(MatchedMarket { market: m.clone(), is_inverse: false });
            }
            if let Some(m) = &entry.home_market {
                return Some(MatchedMarket { market: invert(m), is_inverse: true });
            }
        } else if target_norm == home_norm {
            if let Some(m) = &entry.home_market {
                return Some(MatchedMarket { market: m.clone(), is_inverse: false });
            }
            if let Some(m) = &entry.away_market {
                return Some(MatchedMarket { market: invert(m), is_inverse: true });
            }
        }
        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Swaps YES and NO quotes: trading YES on the target team is equivalent to
/// trading NO on whichever side the listed market actually quotes.
fn invert(market: &ExchangeMarket) -> ExchangeMarket {
    let mut inverted = market.clone();
    inverted.yes_bid = market.no_bid;
    inverted.yes_ask = market.no_ask;
    inverted.no_bid = market.yes_bid;
    inverted.no_ask = market.yes_ask;
    inverted
}
