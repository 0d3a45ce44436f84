//! Estimation core for NBA minimum alternate totals: per-team scoring
//! profiles fitted from the season's game log, a Monte Carlo engine that
//! estimates the probability a game clears a given line, a deterministic
//! weighted-factor scorer, a decision layer reconciling the two signals,
//! and a backtest validator that replays everything against completed
//! games.
//!
//! Data collection (stats scraping, odds fetching) and result export live
//! outside this crate; it consumes the schemas in [`dataset`] and produces
//! [`decision::Decision`] and [`backtest::BacktestSummary`] values.

pub mod backtest;
pub mod config;
pub mod dataset;
pub mod decision;
pub mod error;
pub mod factor_score;
pub mod monte_carlo;
pub mod profile;
pub mod simulate;

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Probability estimates converge with instance count either way, but
/// deterministic tests and reproducible backtests need the explicit seed.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
