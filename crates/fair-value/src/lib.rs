//! Vig-free fair value from multi-book American odds, plus an optional
//! score-based win-probability model for in-play sports. Both produce the
//! same `(fair_value_cents, bookmaker_count, spread)` contract.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FairValueError {
    /// Per-book vig-free probabilities disagree by more than the configured
    /// threshold (default 0.15) — treated as noise from stale or
    /// news-driven mispriced books, not a tradeable edge.
    #[error("bookmaker spread too high: min={min:.4} max={max:.4}")]
    SpreadTooHigh { min: f64, max: f64 },

    #[error("no bookmaker quotes available")]
    NoBooks,
}

const DEFAULT_MAX_SPREAD: f64 = 0.15;

/// Converts American odds to implied probability.
#[must_use]
pub fn american_to_probability(odds: f64) -> f64 {
    if odds > 0.0 {
        100.0 / (odds + 100.0)
    } else {
        let abs = odds.abs();
        abs / (abs + 100.0)
    }
}

/// Devigs two-way American odds. Returns `(home_fair_prob, away_fair_prob)`.
#[must_use]
pub fn devig(home_odds: f64, away_odds: f64) -> (f64, f64) {
    let home_implied = american_to_probability(home_odds);
    let away_implied = american_to_probability(away_odds);
    let total = home_implied + away_implied;
    if total == 0.0 {
        return (0.5, 0.5);
    }
    (home_implied / total, away_implied / total)
}

/// Devigs three-way American odds (home/away/draw). Returns
/// `(home_fair_prob, away_fair_prob, draw_fair_prob)`.
#[must_use]
pub fn devig_3way(home_odds: f64, away_odds: f64, draw_odds: f64) -> (f64, f64, f64) {
    let home_implied = american_to_probability(home_odds);
    let away_implied = american_to_probability(away_odds);
    let draw_implied = american_to_probability(draw_odds);
    let total = home_implied + away_implied + draw_implied;
    if total == 0.0 {
        return (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
    }
    (home_implied / total, away_implied / total, draw_implied / total)
}

/// Scales and clamps a probability to the `[1, 99]` integer-cent range.
#[must_use]
pub fn fair_value_cents(probability: f64) -> u32 {
    (probability * 100.0).round().clamp(1.0, 99.0) as u32
}

/// Computes the target team's vig-free probability for a single bookmaker's
/// head-to-head market: the target's implied probability divided by the sum
/// of all outcomes' implied probabilities (1 + vig).
#[must_use]
pub fn vig_free_probability(target_odds: f64, other_outcome_odds: &[f64]) -> f64 {
    let target_implied = american_to_probability(target_odds);
    let total: f64 = target_implied
        + other_outcome_odds
            .iter()
            .map(|&o| american_to_probability(o))
            .sum::<f64>();
    if total == 0.0 {
        return 0.0;
    }
    target_implied / total
}

/// Combines one vig-free probability per bookmaker into a single fair value,
/// rejecting the result if the books disagree by more than `max_spread`.
pub fn combine_books(
    vig_free_probs: &[f64],
    max_spread: f64,
) -> Result<(u32, u32, f64), FairValueError> {
    if vig_free_probs.is_empty() {
        return Err(FairValueError::NoBooks);
    }
    let min = vig_free_probs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = vig_free_probs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    if spread > max_spread {
        return Err(FairValueError::SpreadTooHigh { min, max });
    }
    let avg = vig_free_probs.iter().sum::<f64>() / vig_free_probs.len() as f64;
    Ok((fair_value_cents(avg), vig_free_probs.len() as u32, spread))
}

/// Convenience wrapper over [`combine_books`] using the default 0.15 spread
/// threshold from the design.
pub fn fair_value_from_books(vig_free_probs: &[f64]) -> Result<(u32, u32, f64), FairValueError> {
    combine_books(vig_free_probs, DEFAULT_MAX_SPREAD)
}

/// Logistic win-probability model for in-play scoring sports, used as an
/// alternative fair-value provider to multi-book devigging. The steepness
/// ramps from `k_start` at tip-off to `k_end` at the end of regulation,
/// reflecting that a given score differential matters more with less time
/// left.
#[derive(Debug, Clone, Copy)]
pub struct ScoreModel {
    pub home_court_advantage_pts: f64,
    pub k_start: f64,
    pub k_end: f64,
    pub regulation_minutes: f64,
}

impl Default for ScoreModel {
    fn default() -> Self {
        Self {
            home_court_advantage_pts: 2.5,
            k_start: 0.08,
            k_end: 0.35,
            regulation_minutes: 48.0,
        }
    }
}

impl ScoreModel {
    /// Win probability for the home team given the current score
    /// differential (home minus away) and elapsed minutes of regulation.
    #[must_use]
    pub fn home_win_probability(&self, score_diff: f64, elapsed_minutes: f64) -> f64 {
        let progress = (elapsed_minutes / self.regulation_minutes).clamp(0.0, 1.0);
        let k = self.k_start + (self.k_end - self.k_start) * progress;
        let adjusted_diff = score_diff + self.home_court_advantage_pts * (1.0 - progress);
        1.0 / (1.0 + (-k * adjusted_diff).exp())
    }

    /// Fair value contract for `target` given it is the home team.
    #[must_use]
    pub fn fair_value_for_home(&self, score_diff: f64, elapsed_minutes: f64) -> u32 {
        fair_value_cents(self.home_win_probability(score_diff, elapsed_minutes))
    }

    /// Fair value contract for `target` given it is the away team.
    #[must_use]
    pub fn fair_value_for_away(&self, score_diff: f64, elapsed_minutes: f64) -> u32 {
        fair_value_cents(1.0 - self.home_win_probability(score_diff, elapsed_minutes))
    }
}
