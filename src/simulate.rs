use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::SimConfig;
use crate::error::EngineError;
use crate::profile::TeamProfile;

/// Everything fixed about one game across all simulated instances: the two
/// scoring distributions plus the situational adjustments derived from
/// rest days and the point spread.
pub struct Matchup {
    away: Normal<f64>,
    home: Normal<f64>,
    pace: Normal<f64>,
    away_fatigue: f64,
    home_fatigue: f64,
    blowout_prob: f64,
    blowout_deduction: f64,
    score_floor: f64,
    score_ceiling: f64,
}

impl Matchup {
    pub fn new(
        away: &TeamProfile,
        home: &TeamProfile,
        away_rest_days: u32,
        home_rest_days: u32,
        spread: Option<f64>,
        cfg: &SimConfig,
    ) -> Result<Self, EngineError> {
        if let Some(s) = spread {
            if !s.is_finite() {
                return Err(EngineError::InvalidSpread(s));
            }
        }

        let dist = |p: &TeamProfile| {
            Normal::new(p.mean_ppg, p.std_ppg)
                .map_err(|e| EngineError::InvalidConfig(format!("score distribution: {e}")))
        };
        let pace = Normal::new(1.0, cfg.pace_sigma)
            .map_err(|e| EngineError::InvalidConfig(format!("pace distribution: {e}")))?;

        let fatigue = |rest_days: u32| {
            if rest_days <= cfg.b2b_rest_days {
                cfg.fatigue_penalty
            } else {
                1.0
            }
        };

        let abs_spread = spread.map(f64::abs).unwrap_or(0.0);

        Ok(Self {
            away: dist(away)?,
            home: dist(home)?,
            pace,
            away_fatigue: fatigue(away_rest_days),
            home_fatigue: fatigue(home_rest_days),
            blowout_prob: (abs_spread * cfg.blowout_per_point).min(cfg.blowout_cap),
            blowout_deduction: cfg.blowout_deduction,
            score_floor: cfg.score_floor,
            score_ceiling: cfg.score_ceiling,
        })
    }

    pub fn away_on_b2b(&self) -> bool {
        self.away_fatigue < 1.0
    }

    pub fn home_on_b2b(&self) -> bool {
        self.home_fatigue < 1.0
    }

    pub fn blowout_prob(&self) -> f64 {
        self.blowout_prob
    }

    /// One randomized total-score draw. The pace multiplier is sampled once
    /// and applied to both teams: pace is a property of the game, and a
    /// shared draw keeps the correlation it induces between the two sides.
    pub fn draw_total(&self, rng: &mut impl Rng) -> f64 {
        let pace = self.pace.sample(rng);

        // Garbage-time suppression: a blowout instance loses a fixed chunk
        // of the total, split evenly between the teams.
        let blowout_half = if rng.r#gen::<f64>() < self.blowout_prob {
            self.blowout_deduction / 2.0
        } else {
            0.0
        };

        let away = self.team_score(self.away, pace, self.away_fatigue, blowout_half, rng);
        let home = self.team_score(self.home, pace, self.home_fatigue, blowout_half, rng);
        away + home
    }

    fn team_score(
        &self,
        dist: Normal<f64>,
        pace: f64,
        fatigue: f64,
        blowout_half: f64,
        rng: &mut impl Rng,
    ) -> f64 {
        let raw = dist.sample(rng) * pace * fatigue - blowout_half;
        raw.clamp(self.score_floor, self.score_ceiling)
    }
}
