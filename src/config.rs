use serde::{Deserialize, Serialize};

/// Everything tunable in the core, grouped per component. Components take
/// their sub-config explicitly; nothing reads global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub profile: ProfileConfig,
    pub sim: SimConfig,
    pub scoring: ScoringConfig,
    pub bands: DecisionBands,
    pub reconcile: ReconcileConfig,
    pub stake: StakePolicy,
    pub parlay: ParlayConfig,
    pub backtest: BacktestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Games needed before a team's observed variance is trusted.
    pub min_reliable_games: usize,
    /// Floor on per-team scoring std dev; small samples must not report
    /// unrealistically tight tails.
    pub std_floor: f64,
    /// Std dev used when a team has fewer than two observed games.
    pub fallback_std: f64,
    /// Half-width of the min/max bounds for a zero-game profile.
    pub fallback_spread: f64,
    /// Bounds on the league-default profile for unknown identifiers.
    pub default_min: f64,
    pub default_max: f64,
    /// League-average ppg used only when the season-stats table is empty.
    pub default_league_ppg: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            min_reliable_games: 5,
            std_floor: 6.0,
            fallback_std: 10.0,
            fallback_spread: 25.0,
            default_min: 90.0,
            default_max: 140.0,
            default_league_ppg: 110.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Independent instances per game.
    pub simulations: usize,
    /// Std dev of the shared per-instance pace multiplier (mean 1.0). One
    /// draw per instance, applied to both teams.
    pub pace_sigma: f64,
    /// Scoring multiplier for a team on a back-to-back.
    pub fatigue_penalty: f64,
    /// Rest days at or below this count as a back-to-back.
    pub b2b_rest_days: u32,
    /// Blowout probability per point of spread, and its cap.
    pub blowout_per_point: f64,
    pub blowout_cap: f64,
    /// Points removed from the game total when an instance is a blowout
    /// (split evenly between the teams).
    pub blowout_deduction: f64,
    /// Plausible per-team score range; draws outside are clamped.
    pub score_floor: f64,
    pub score_ceiling: f64,
    /// Std dev above this flags a team as high variance.
    pub high_variance_std: f64,
    /// Blowout probability above this is worth a risk annotation.
    pub blowout_risk_flag: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            simulations: 10_000,
            pace_sigma: 0.03,
            fatigue_penalty: 0.97,
            b2b_rest_days: 1,
            blowout_per_point: 0.02,
            blowout_cap: 0.25,
            blowout_deduction: 8.0,
            score_floor: 85.0,
            score_ceiling: 160.0,
            high_variance_std: 12.0,
            blowout_risk_flag: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: FactorWeights,
    /// Average offensive-rating cutoffs for full / strong / partial credit.
    pub elite_ortg: f64,
    pub strong_ortg: f64,
    pub above_avg_ortg: f64,
    /// Average pace cutoffs.
    pub fast_pace: f64,
    pub above_avg_pace: f64,
    pub average_pace: f64,
    /// Recent-form window and the diff (recent avg minus season ppg) that
    /// marks a team hot or cold.
    pub form_window: usize,
    pub form_min_games: usize,
    pub hot_diff: f64,
    pub cold_diff: f64,
    /// Buffer tiers: combined season ppg above the line.
    pub strong_buffer: f64,
    pub good_buffer: f64,
    pub moderate_buffer: f64,
    pub small_buffer: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            elite_ortg: 116.0,
            strong_ortg: 114.0,
            above_avg_ortg: 112.0,
            fast_pace: 100.0,
            above_avg_pace: 98.0,
            average_pace: 96.0,
            form_window: 6,
            form_min_games: 3,
            hot_diff: 3.0,
            cold_diff: -5.0,
            strong_buffer: 20.0,
            good_buffer: 15.0,
            moderate_buffer: 10.0,
            small_buffer: 5.0,
        }
    }
}

/// Maximum contribution of each factor. Defaults sum to 100, so the total
/// score reads directly as a confidence percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorWeights {
    pub offense: f64,
    pub pace: f64,
    pub form: f64,
    pub buffer: f64,
    pub rest: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            offense: 30.0,
            pace: 25.0,
            form: 20.0,
            buffer: 15.0,
            rest: 10.0,
        }
    }
}

impl FactorWeights {
    pub fn total(&self) -> f64 {
        self.offense + self.pace + self.form + self.buffer + self.rest
    }
}

/// Probability cutoffs for the five decision labels. Descending; a
/// probability below `lean_no` lands on the reject label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionBands {
    pub strong_yes: f64,
    pub yes: f64,
    pub maybe: f64,
    pub lean_no: f64,
}

impl Default for DecisionBands {
    fn default() -> Self {
        Self {
            strong_yes: 92.0,
            yes: 85.0,
            maybe: 78.0,
            lean_no: 70.0,
        }
    }
}

/// Cutoffs for flagging a material disagreement between the heuristic
/// score and the simulated probability. Kept independent from
/// `DecisionBands` on purpose; the two sets are tuned separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Heuristic score at or above this counts as a confident static read.
    pub high_score: f64,
    /// Simulated probability below this contradicts a confident score.
    pub downgrade_below: f64,
    /// Heuristic score below this counts as a low/moderate static read.
    pub low_score: f64,
    /// Simulated probability at or above this contradicts a low score.
    pub upgrade_at: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            high_score: 80.0,
            downgrade_below: 78.0,
            low_score: 75.0,
            upgrade_at: 85.0,
        }
    }
}

/// Fixed-fraction stake for the two strongest labels, zero otherwise.
/// Policy, not derived from the probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakePolicy {
    pub fraction: f64,
}

impl Default for StakePolicy {
    fn default() -> Self {
        Self { fraction: 0.03 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParlayConfig {
    pub recommended: f64,
    pub acceptable: f64,
}

impl Default for ParlayConfig {
    fn default() -> Self {
        Self {
            recommended: 75.0,
            acceptable: 65.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Realized win rate (percent) the system must reach to validate.
    pub acceptance_threshold: f64,
    /// Estimated minimum line sits this many points under the combined
    /// profile means, rounded to the nearest half point.
    pub line_margin: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 90.0,
            line_margin: 15.0,
        }
    }
}
