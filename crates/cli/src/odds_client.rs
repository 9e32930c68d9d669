//! `OddsSource` implementation over The Odds API's `h2h` (moneyline) market,
//! the external sportsbook feed §4.B's multi-book devigging consumes.
//!
//! Wire shapes mirror the DraftKings/The Odds API integration this is
//! grounded on: an event carries `home_team`/`away_team` and a list of
//! bookmakers, each quoting American odds per outcome.

use algo_trade_engine::OddsSource;
use algo_trade_fair_value::vig_free_probability;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

const THE_ODDS_API_BASE: &str = "https://api.the-odds-api.com/v4";

#[derive(Debug, Clone, Deserialize)]
struct Outcome {
    name: String,
    price: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct MarketOdds {
    key: String,
    outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, Deserialize)]
struct BookmakerOdds {
    markets: Vec<MarketOdds>,
}

#[derive(Debug, Clone, Deserialize)]
struct GameEvent {
    home_team: String,
    away_team: String,
    bookmakers: Vec<BookmakerOdds>,
}

/// Maps this engine's sport identifiers onto The Odds API's sport keys.
/// Unrecognized sports fall through to their lowercased form, which lets an
/// operator add a new league by config without a code change if the API
/// already uses the obvious key.
fn sport_key(sport: &str) -> String {
    match sport.to_ascii_uppercase().as_str() {
        "NBA" => "basketball_nba".to_string(),
        "NFL" => "americanfootball_nfl".to_string(),
        "NHL" => "icehockey_nhl".to_string(),
        "MLB" => "baseball_mlb".to_string(),
        "NCAAB" => "basketball_ncaab".to_string(),
        "NCAAF" => "americanfootball_ncaaf".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

pub struct TheOddsApiSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    /// The `regions` query parameter sent with every odds request (e.g.
    /// `"us"`), controlling which region's bookmakers the API returns.
    regions: String,
}

impl TheOddsApiSource {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: THE_ODDS_API_BASE.to_string(),
            regions: "us".to_string(),
        }
    }

    async fn fetch_events(&self, sport: &str) -> anyhow::Result<Vec<GameEvent>> {
        let url = format!("{}/sports/{}/odds", self.base_url, sport_key(sport));
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", self.regions.as_str()),
                ("markets", "h2h"),
                ("oddsFormat", "american"),
            ])
            .send()
            .await
            .context("the odds api request failed")?
            .error_for_status()
            .context("the odds api returned an error status")?;

        resp.json::<Vec<GameEvent>>()
            .await
            .context("failed to decode the odds api response")
    }
}

#[async_trait]
impl OddsSource for TheOddsApiSource {
    async fn vig_free_probabilities(&self, sport: &str, target_team: &str) -> anyhow::Result<Vec<f64>> {
        let events = self.fetch_events(sport).await?;

        let Some(event) = events
            .iter()
            .find(|e| e.home_team == target_team || e.away_team == target_team)
        else {
            anyhow::bail!("no odds api event found for {target_team} ({sport})");
        };

        let mut probs = Vec::with_capacity(event.bookmakers.len());
        for book in &event.bookmakers {
            let Some(h2h) = book.markets.iter().find(|m| m.key == "h2h") else {
                continue;
            };
            let by_name: HashMap<&str, f64> =
                h2h.outcomes.iter().map(|o| (o.name.as_str(), o.price)).collect();

            let Some(&target_price) = by_name.get(target_team) else {
                continue;
            };
            let others: Vec<f64> = by_name
                .iter()
                .filter(|(name, _)| **name != target_team)
                .map(|(_, price)| *price)
                .collect();
            if others.is_empty() {
                continue;
            }
            probs.push(vig_free_probability(target_price, &others));
        }

        if probs.is_empty() {
            warn!(sport, target_team, "odds api event had no usable bookmaker quotes");
        }
        Ok(probs)
    }
}
