use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ParlayConfig, SimConfig};
use crate::error::EngineError;
use crate::profile::ProfileSet;
use crate::simulate::Matchup;

/// A game handed to the engine for simulation. Rest days come from the
/// caller because the engine itself never looks at the calendar.
#[derive(Debug, Clone)]
pub struct SimRequest<'a> {
    pub away_team: &'a str,
    pub home_team: &'a str,
    pub line: f64,
    pub away_rest_days: u32,
    pub home_rest_days: u32,
    pub spread: Option<f64>,
}

/// Qualitative annotations attached to a simulation; transparency for the
/// decision record, never decision logic themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RiskFactor {
    HighVariance { team: String, std_ppg: f64 },
    BackToBack { team: String },
    BlowoutRisk { probability: f64 },
    SmallSample { team: String, games: usize },
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskFactor::HighVariance { team, std_ppg } => {
                write!(f, "{team} high variance (+/-{std_ppg:.1} ppg)")
            }
            RiskFactor::BackToBack { team } => write!(f, "{team} on back-to-back"),
            RiskFactor::BlowoutRisk { probability } => {
                write!(f, "blowout risk ({:.0}%), starters may rest", probability * 100.0)
            }
            RiskFactor::SmallSample { team, games } => {
                write!(f, "{team} limited data ({games} games)")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub away_team: String,
    pub home_team: String,
    pub line: f64,
    pub simulations: usize,
    pub hits: usize,
    /// hits / simulations, as a percentage rounded to 2 decimals.
    pub probability: f64,
    pub mean_total: f64,
    pub std_total: f64,
    pub min_total: f64,
    pub max_total: f64,
    pub p5_total: f64,
    pub p95_total: f64,
    pub risk_factors: Vec<RiskFactor>,
}

/// Runs `cfg.simulations` independent instances of the matchup and counts
/// how many totals strictly exceed the line.
pub fn run_simulation(
    profiles: &ProfileSet,
    req: &SimRequest<'_>,
    cfg: &SimConfig,
    rng: &mut impl Rng,
) -> Result<SimulationResult, EngineError> {
    if !req.line.is_finite() || req.line <= 0.0 {
        return Err(EngineError::InvalidLine(req.line));
    }
    if cfg.simulations == 0 {
        return Err(EngineError::InvalidConfig(
            "simulation count must be nonzero".to_string(),
        ));
    }

    let away = profiles.get(req.away_team);
    let home = profiles.get(req.home_team);
    let matchup = Matchup::new(
        away,
        home,
        req.away_rest_days,
        req.home_rest_days,
        req.spread,
        cfg,
    )?;

    let mut totals = Vec::with_capacity(cfg.simulations);
    let mut hits = 0usize;
    for _ in 0..cfg.simulations {
        let total = matchup.draw_total(rng);
        if total > req.line {
            hits += 1;
        }
        totals.push(total);
    }

    totals.sort_by(|a, b| a.total_cmp(b));

    let n = totals.len() as f64;
    let mean = totals.iter().sum::<f64>() / n;
    let var = totals.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;

    let mut risk_factors = Vec::new();
    for p in [away, home] {
        if p.std_ppg > cfg.high_variance_std {
            risk_factors.push(RiskFactor::HighVariance {
                team: p.team.clone(),
                std_ppg: p.std_ppg,
            });
        }
    }
    if matchup.away_on_b2b() {
        risk_factors.push(RiskFactor::BackToBack {
            team: away.team.clone(),
        });
    }
    if matchup.home_on_b2b() {
        risk_factors.push(RiskFactor::BackToBack {
            team: home.team.clone(),
        });
    }
    if matchup.blowout_prob() > cfg.blowout_risk_flag {
        risk_factors.push(RiskFactor::BlowoutRisk {
            probability: matchup.blowout_prob(),
        });
    }
    for p in [away, home] {
        if !p.reliable {
            risk_factors.push(RiskFactor::SmallSample {
                team: p.team.clone(),
                games: p.games_played,
            });
        }
    }

    let probability = round2(hits as f64 / n * 100.0);
    debug!(
        away = req.away_team,
        home = req.home_team,
        line = req.line,
        probability,
        "monte carlo run complete"
    );

    Ok(SimulationResult {
        away_team: req.away_team.to_string(),
        home_team: req.home_team.to_string(),
        line: req.line,
        simulations: cfg.simulations,
        hits,
        probability,
        mean_total: round1(mean),
        std_total: round1(var.sqrt()),
        min_total: round1(totals[0]),
        max_total: round1(totals[totals.len() - 1]),
        p5_total: round1(percentile_sorted(&totals, 5.0)),
        p95_total: round1(percentile_sorted(&totals, 95.0)),
        risk_factors,
    })
}

/// Combined probability of a set of games assumed independent: the product
/// of the per-game fractions, back as a percentage. Deliberately ignores
/// any slate-level correlation.
pub fn joint_probability(probs: &[f64]) -> f64 {
    let combined = probs.iter().fold(1.0, |acc, p| acc * (p / 100.0));
    round2(combined * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParlayVerdict {
    Recommended,
    Acceptable,
    NotRecommended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParlayAnalysis {
    pub legs: usize,
    pub probabilities: Vec<f64>,
    pub combined: f64,
    /// Index into `probabilities` of the weakest leg.
    pub weakest_leg: usize,
    pub weakest_prob: f64,
    pub verdict: ParlayVerdict,
}

pub fn analyze_parlay(probs: &[f64], cfg: &ParlayConfig) -> Option<ParlayAnalysis> {
    if probs.is_empty() {
        return None;
    }

    let combined = joint_probability(probs);
    let (weakest_leg, weakest_prob) = probs
        .iter()
        .copied()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    let verdict = if combined >= cfg.recommended {
        ParlayVerdict::Recommended
    } else if combined >= cfg.acceptable {
        ParlayVerdict::Acceptable
    } else {
        ParlayVerdict::NotRecommended
    };

    Some(ParlayAnalysis {
        legs: probs.len(),
        probabilities: probs.to_vec(),
        combined,
        weakest_leg,
        weakest_prob,
        verdict,
    })
}

/// Linear-interpolation percentile over an ascending slice.
fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;
    use crate::dataset::TeamSeasonStats;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn stats(team: &str, ppg: f64) -> TeamSeasonStats {
        TeamSeasonStats {
            team: team.to_string(),
            ppg,
            pace: 99.0,
            off_rating: 114.0,
        }
    }

    fn profiles() -> ProfileSet {
        ProfileSet::build(
            &[stats("Boston Celtics", 118.0), stats("Miami Heat", 109.0)],
            &[],
            &ProfileConfig::default(),
        )
    }

    fn request<'a>(line: f64) -> SimRequest<'a> {
        SimRequest {
            away_team: "Boston Celtics",
            home_team: "Miami Heat",
            line,
            away_rest_days: 3,
            home_rest_days: 3,
            spread: None,
        }
    }

    #[test]
    fn invalid_line_fails_before_sampling() {
        let cfg = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        for line in [0.0, -210.5, f64::NAN, f64::INFINITY] {
            let err = run_simulation(&profiles(), &request(line), &cfg, &mut rng);
            assert!(matches!(err, Err(EngineError::InvalidLine(_))));
        }
    }

    #[test]
    fn percentiles_bracket_the_mean() {
        let cfg = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let res = run_simulation(&profiles(), &request(215.5), &cfg, &mut rng).unwrap();
        assert!(res.p5_total <= res.mean_total);
        assert!(res.mean_total <= res.p95_total);
        assert!(res.min_total <= res.p5_total);
        assert!(res.p95_total <= res.max_total);
        assert!(res.probability >= 0.0 && res.probability <= 100.0);
        assert_eq!(res.simulations, cfg.simulations);
    }

    #[test]
    fn zero_game_profiles_are_flagged_as_small_sample() {
        let cfg = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let res = run_simulation(&profiles(), &request(215.5), &cfg, &mut rng).unwrap();
        let small: Vec<_> = res
            .risk_factors
            .iter()
            .filter(|r| matches!(r, RiskFactor::SmallSample { .. }))
            .collect();
        assert_eq!(small.len(), 2);
    }

    #[test]
    fn big_spread_flags_blowout_risk() {
        let cfg = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut req = request(215.5);
        req.spread = Some(-12.0);
        let res = run_simulation(&profiles(), &req, &cfg, &mut rng).unwrap();
        assert!(
            res.risk_factors
                .iter()
                .any(|r| matches!(r, RiskFactor::BlowoutRisk { .. }))
        );
    }

    #[test]
    fn joint_probability_is_product_of_fractions() {
        assert!((joint_probability(&[90.0, 90.0]) - 81.0).abs() < 1e-9);
        assert!((joint_probability(&[92.0, 88.0, 85.0]) - 68.82).abs() < 0.005);
        assert_eq!(joint_probability(&[]), 100.0);
    }

    #[test]
    fn parlay_verdict_follows_config_bands() {
        let cfg = ParlayConfig::default();
        let strong = analyze_parlay(&[95.0, 92.0], &cfg).unwrap();
        assert_eq!(strong.verdict, ParlayVerdict::Recommended);
        assert_eq!(strong.weakest_leg, 1);
        assert_eq!(strong.weakest_prob, 92.0);

        let mid = analyze_parlay(&[88.0, 80.0], &cfg).unwrap();
        assert_eq!(mid.verdict, ParlayVerdict::Acceptable);

        let weak = analyze_parlay(&[80.0, 75.0], &cfg).unwrap();
        assert_eq!(weak.verdict, ParlayVerdict::NotRecommended);

        assert!(analyze_parlay(&[], &cfg).is_none());
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_sorted(&data, 0.0), 1.0);
        assert_eq!(percentile_sorted(&data, 100.0), 5.0);
        assert_eq!(percentile_sorted(&data, 50.0), 3.0);
        assert!((percentile_sorted(&data, 25.0) - 2.0).abs() < 1e-12);
        assert!((percentile_sorted(&data, 5.0) - 1.2).abs() < 1e-12);
    }
}
