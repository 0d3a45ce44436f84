use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{DecisionBands, EngineConfig, ReconcileConfig, StakePolicy};
use crate::dataset::{self, GameRecord, TeamSeasonStats, UpcomingGame};
use crate::error::EngineError;
use crate::factor_score::{FactorScore, FactorScorer};
use crate::monte_carlo::{self, SimRequest, SimulationResult};
use crate::profile::ProfileSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionLabel {
    StrongYes,
    Yes,
    Maybe,
    LeanNo,
    No,
}

impl DecisionLabel {
    pub fn is_reject(self) -> bool {
        self == DecisionLabel::No
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceTier {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

/// Outcome of comparing the static score against the simulated
/// probability. Exactly one variant applies per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reconciliation {
    /// Simulation surfaced risk the static score missed.
    Downgraded,
    /// Simulation found the bet safer than the static score suggested.
    Upgraded,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub away_team: String,
    pub home_team: String,
    pub line: f64,
    /// Heuristic confidence (factor score total).
    pub score: f64,
    /// Simulated hit probability.
    pub probability: f64,
    pub label: DecisionLabel,
    pub tier: ConfidenceTier,
    pub reconciliation: Reconciliation,
    /// Bankroll fraction to stake; zero outside the top two bands.
    pub stake_fraction: f64,
    pub reasons: Vec<String>,
    pub risk_factors: Vec<String>,
}

/// Maps a simulated probability into the configured bands. Also used on
/// its own as the simulation-only secondary label.
pub fn band(probability: f64, bands: &DecisionBands) -> (DecisionLabel, ConfidenceTier) {
    if probability >= bands.strong_yes {
        (DecisionLabel::StrongYes, ConfidenceTier::VeryHigh)
    } else if probability >= bands.yes {
        (DecisionLabel::Yes, ConfidenceTier::High)
    } else if probability >= bands.maybe {
        (DecisionLabel::Maybe, ConfidenceTier::Medium)
    } else if probability >= bands.lean_no {
        (DecisionLabel::LeanNo, ConfidenceTier::Low)
    } else {
        (DecisionLabel::No, ConfidenceTier::VeryLow)
    }
}

pub fn reconcile(score: f64, probability: f64, cfg: &ReconcileConfig) -> Reconciliation {
    if score >= cfg.high_score && probability < cfg.downgrade_below {
        Reconciliation::Downgraded
    } else if score < cfg.low_score && probability >= cfg.upgrade_at {
        Reconciliation::Upgraded
    } else {
        Reconciliation::None
    }
}

/// Combines the two signals into the final decision. The simulated
/// probability drives the label because it carries the variance the static
/// score cannot see.
pub fn decide(
    score: &FactorScore,
    sim: &SimulationResult,
    bands: &DecisionBands,
    reconcile_cfg: &ReconcileConfig,
    stake: &StakePolicy,
) -> Decision {
    let (label, tier) = band(sim.probability, bands);

    let stake_fraction = match label {
        DecisionLabel::StrongYes | DecisionLabel::Yes => stake.fraction,
        _ => 0.0,
    };

    Decision {
        away_team: sim.away_team.clone(),
        home_team: sim.home_team.clone(),
        line: sim.line,
        score: score.total,
        probability: sim.probability,
        label,
        tier,
        reconciliation: reconcile(score.total, sim.probability, reconcile_cfg),
        stake_fraction,
        reasons: score.reasons.clone(),
        risk_factors: sim.risk_factors.iter().map(|r| r.to_string()).collect(),
    }
}

/// Full pipeline for one upcoming game: rest days from the log, factor
/// score, Monte Carlo run, final decision.
pub fn evaluate_game(
    profiles: &ProfileSet,
    stats: &[TeamSeasonStats],
    games: &[GameRecord],
    request: &UpcomingGame,
    cfg: &EngineConfig,
    rng: &mut impl Rng,
) -> Result<Decision, EngineError> {
    let rest = |team: &str| {
        dataset::rest_days_before(games, team, request.tip_off)
            .map(|d| d.max(0) as u32)
            // No prior game in the log means fully rested.
            .unwrap_or(u32::MAX)
    };

    let scorer = FactorScorer::new(stats, games, &cfg.scoring);
    let score = scorer.score(
        &request.away_team,
        &request.home_team,
        request.line,
        request.tip_off,
    );

    let sim = monte_carlo::run_simulation(
        profiles,
        &SimRequest {
            away_team: &request.away_team,
            home_team: &request.home_team,
            line: request.line,
            away_rest_days: rest(&request.away_team),
            home_rest_days: rest(&request.home_team),
            spread: request.spread,
        },
        &cfg.sim,
        rng,
    )?;

    Ok(decide(&score, &sim, &cfg.bands, &cfg.reconcile, &cfg.stake))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(probability: f64) -> SimulationResult {
        SimulationResult {
            away_team: "Boston Celtics".to_string(),
            home_team: "Miami Heat".to_string(),
            line: 212.5,
            simulations: 10_000,
            hits: (probability * 100.0) as usize,
            probability,
            mean_total: 221.0,
            std_total: 12.0,
            min_total: 180.0,
            max_total: 262.0,
            p5_total: 201.0,
            p95_total: 241.0,
            risk_factors: Vec::new(),
        }
    }

    fn score(total: f64) -> FactorScore {
        FactorScore {
            offense: 0.0,
            pace: 0.0,
            form: 0.0,
            buffer: 0.0,
            rest: 0.0,
            total,
            reasons: vec!["test".to_string()],
        }
    }

    #[test]
    fn bands_cover_all_five_labels() {
        let b = DecisionBands::default();
        assert_eq!(band(95.0, &b).0, DecisionLabel::StrongYes);
        assert_eq!(band(92.0, &b).0, DecisionLabel::StrongYes);
        assert_eq!(band(88.0, &b).0, DecisionLabel::Yes);
        assert_eq!(band(80.0, &b).0, DecisionLabel::Maybe);
        assert_eq!(band(72.0, &b).0, DecisionLabel::LeanNo);
        assert_eq!(band(50.0, &b).0, DecisionLabel::No);
        assert_eq!(band(50.0, &b).1, ConfidenceTier::VeryLow);
    }

    #[test]
    fn confident_score_with_weak_simulation_downgrades() {
        let cfg = ReconcileConfig::default();
        assert_eq!(reconcile(85.0, 70.0, &cfg), Reconciliation::Downgraded);
    }

    #[test]
    fn weak_score_with_strong_simulation_upgrades() {
        let cfg = ReconcileConfig::default();
        assert_eq!(reconcile(60.0, 90.0, &cfg), Reconciliation::Upgraded);
    }

    #[test]
    fn agreeing_signals_do_not_flag() {
        let cfg = ReconcileConfig::default();
        assert_eq!(reconcile(90.0, 93.0, &cfg), Reconciliation::None);
        assert_eq!(reconcile(50.0, 60.0, &cfg), Reconciliation::None);
        // Middling score never triggers either direction.
        assert_eq!(reconcile(77.0, 95.0, &cfg), Reconciliation::None);
    }

    #[test]
    fn stake_only_for_top_two_bands() {
        let bands = DecisionBands::default();
        let rc = ReconcileConfig::default();
        let stake = StakePolicy::default();

        let d = decide(&score(88.0), &sim(93.0), &bands, &rc, &stake);
        assert_eq!(d.label, DecisionLabel::StrongYes);
        assert_eq!(d.stake_fraction, stake.fraction);

        let d = decide(&score(82.0), &sim(86.0), &bands, &rc, &stake);
        assert_eq!(d.label, DecisionLabel::Yes);
        assert_eq!(d.stake_fraction, stake.fraction);

        let d = decide(&score(70.0), &sim(80.0), &bands, &rc, &stake);
        assert_eq!(d.label, DecisionLabel::Maybe);
        assert_eq!(d.stake_fraction, 0.0);

        let d = decide(&score(40.0), &sim(55.0), &bands, &rc, &stake);
        assert_eq!(d.label, DecisionLabel::No);
        assert!(d.label.is_reject());
        assert_eq!(d.stake_fraction, 0.0);
    }
}
