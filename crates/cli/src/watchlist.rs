//! Loads the operator-supplied slate of matchups to track each tick (the
//! `TrackedMatchup` list `EngineLoop` takes at construction — this engine
//! has no live schedule-discovery subsystem of its own).

use algo_trade_engine::TrackedMatchup;
use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
struct WatchlistEntry {
    sport: String,
    target_team: String,
    home_team: String,
    away_team: String,
    date: NaiveDate,
}

/// Reads a JSON array of matchups, e.g.:
/// `[{"sport": "NBA", "target_team": "Lakers", "home_team": "Lakers", "away_team": "Celtics", "date": "2026-07-30"}]`
pub fn load(path: &Path) -> anyhow::Result<Vec<TrackedMatchup>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read watchlist file: {}", path.display()))?;
    let entries: Vec<WatchlistEntry> =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse watchlist file: {}", path.display()))?;

    Ok(entries
        .into_iter()
        .map(|e| TrackedMatchup {
            sport: e.sport,
            target_team: e.target_team,
            home_team: e.home_team,
            away_team: e.away_team,
            date: e.date,
        })
        .collect())
}
