use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::dataset::{GameRecord, TeamSeasonStats, UpcomingGame};
use crate::decision::{self, Decision};
use crate::profile::ProfileSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetOutcome {
    Win,
    Loss,
    /// Reject decisions place no bet and stay out of the win-rate
    /// denominator.
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRecord {
    pub date: NaiveDateTime,
    pub decision: Decision,
    pub actual_total: f64,
    pub outcome: BetOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Validated,
    BelowTarget,
    InsufficientData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelStats {
    pub label: crate::decision::DecisionLabel,
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub total_games: usize,
    /// Decisions that placed a bet (everything except the reject label).
    pub decisions: usize,
    pub wins: usize,
    pub losses: usize,
    pub skipped: usize,
    /// Percentage, one decimal, over non-skipped decisions.
    pub win_rate: f64,
    pub verdict: Verdict,
    pub by_label: Vec<LabelStats>,
    pub records: Vec<BacktestRecord>,
}

/// Replays the full pipeline over completed games and grades each decision
/// against the known final total.
///
/// For every game the log is cut to games strictly before its date and the
/// profile set rebuilt from that slice, so no draw ever sees the future.
/// Each game gets its own rng derived from the base seed and its index,
/// which keeps the parallel replay deterministic.
pub fn run_backtest(
    stats: &[TeamSeasonStats],
    games: &[GameRecord],
    cfg: &EngineConfig,
    base_seed: u64,
) -> BacktestSummary {
    let records: Vec<BacktestRecord> = games
        .par_iter()
        .enumerate()
        .filter_map(|(idx, game)| {
            let mut rng = StdRng::seed_from_u64(game_seed(base_seed, idx));
            replay_game(stats, games, game, cfg, &mut rng)
        })
        .collect();

    summarize(records, games.len(), cfg)
}

fn game_seed(base_seed: u64, idx: usize) -> u64 {
    base_seed ^ (idx as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn replay_game(
    stats: &[TeamSeasonStats],
    games: &[GameRecord],
    game: &GameRecord,
    cfg: &EngineConfig,
    rng: &mut StdRng,
) -> Option<BacktestRecord> {
    let past: Vec<GameRecord> = games
        .iter()
        .filter(|g| g.date < game.date)
        .cloned()
        .collect();

    let profiles = ProfileSet::build(stats, &past, &cfg.profile);
    let line = estimate_line(&profiles, &game.away_team, &game.home_team, cfg);

    let request = UpcomingGame {
        away_team: game.away_team.clone(),
        home_team: game.home_team.clone(),
        tip_off: game.date,
        line,
        // Typical juice on an alternate total; irrelevant to grading.
        price: -110,
        spread: None,
    };

    let decision = match decision::evaluate_game(&profiles, stats, &past, &request, cfg, rng) {
        Ok(d) => d,
        Err(err) => {
            debug!(
                away = %game.away_team,
                home = %game.home_team,
                %err,
                "skipping game in backtest"
            );
            return None;
        }
    };

    let actual_total = game.total();
    let outcome = if decision.label.is_reject() {
        BetOutcome::Skipped
    } else if actual_total > line {
        BetOutcome::Win
    } else {
        BetOutcome::Loss
    };

    Some(BacktestRecord {
        date: game.date,
        decision,
        actual_total,
        outcome,
    })
}

/// What the minimum alternate would plausibly have been: combined expected
/// scoring minus a fixed margin, rounded to the nearest half point.
/// Profile means (not the stats table) so unknown teams still replay.
fn estimate_line(profiles: &ProfileSet, away: &str, home: &str, cfg: &EngineConfig) -> f64 {
    let combined = profiles.get(away).mean_ppg + profiles.get(home).mean_ppg;
    let raw = combined - cfg.backtest.line_margin;
    (raw * 2.0).round() / 2.0
}

fn summarize(
    mut records: Vec<BacktestRecord>,
    total_games: usize,
    cfg: &EngineConfig,
) -> BacktestSummary {
    records.sort_by(|a, b| a.date.cmp(&b.date));

    let wins = records
        .iter()
        .filter(|r| r.outcome == BetOutcome::Win)
        .count();
    let losses = records
        .iter()
        .filter(|r| r.outcome == BetOutcome::Loss)
        .count();
    let skipped = records
        .iter()
        .filter(|r| r.outcome == BetOutcome::Skipped)
        .count();

    let decisions = wins + losses;
    let win_rate = if decisions > 0 {
        round1(wins as f64 / decisions as f64 * 100.0)
    } else {
        0.0
    };

    let verdict = if decisions == 0 {
        Verdict::InsufficientData
    } else if win_rate >= cfg.backtest.acceptance_threshold {
        Verdict::Validated
    } else {
        Verdict::BelowTarget
    };

    use crate::decision::DecisionLabel::*;
    let by_label = [StrongYes, Yes, Maybe, LeanNo]
        .into_iter()
        .filter_map(|label| {
            let graded: Vec<&BacktestRecord> = records
                .iter()
                .filter(|r| r.decision.label == label && r.outcome != BetOutcome::Skipped)
                .collect();
            if graded.is_empty() {
                return None;
            }
            let wins = graded
                .iter()
                .filter(|r| r.outcome == BetOutcome::Win)
                .count();
            Some(LabelStats {
                label,
                games: graded.len(),
                wins,
                losses: graded.len() - wins,
                win_rate: round1(wins as f64 / graded.len() as f64 * 100.0),
            })
        })
        .collect();

    info!(
        total_games,
        decisions, wins, losses, skipped, win_rate, "backtest complete"
    );

    BacktestSummary {
        total_games,
        decisions,
        wins,
        losses,
        skipped,
        win_rate,
        verdict,
        by_label,
        records,
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
