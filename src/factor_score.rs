use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::dataset::{self, GameRecord, TeamSeasonStats};

/// Deterministic 0-100 confidence estimate, independent of the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorScore {
    pub offense: f64,
    pub pace: f64,
    pub form: f64,
    pub buffer: f64,
    pub rest: f64,
    pub total: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Form {
    Hot,
    Cold,
    Neutral,
    Unknown,
}

/// Weighted-factor scorer over season aggregates and the game log. Holds
/// references only; built fresh per run like the profile set.
pub struct FactorScorer<'a> {
    stats: &'a [TeamSeasonStats],
    games: &'a [GameRecord],
    cfg: &'a ScoringConfig,
}

impl<'a> FactorScorer<'a> {
    pub fn new(
        stats: &'a [TeamSeasonStats],
        games: &'a [GameRecord],
        cfg: &'a ScoringConfig,
    ) -> Self {
        Self { stats, games, cfg }
    }

    pub fn score(
        &self,
        away_team: &str,
        home_team: &str,
        line: f64,
        tip_off: NaiveDateTime,
    ) -> FactorScore {
        let mut reasons = Vec::new();

        let away = self.team_stats(away_team);
        let home = self.team_stats(home_team);

        let offense = self.offense_component(away, home, &mut reasons);
        let pace = self.pace_component(away, home, &mut reasons);
        let form = self.form_component(away_team, home_team, &mut reasons);
        let buffer = self.buffer_component(away, home, line, &mut reasons);
        let rest = self.rest_component(away_team, home_team, tip_off, &mut reasons);

        FactorScore {
            offense,
            pace,
            form,
            buffer,
            rest,
            total: offense + pace + form + buffer + rest,
            reasons,
        }
    }

    fn team_stats(&self, team: &str) -> Option<&TeamSeasonStats> {
        self.stats.iter().find(|s| s.team == team)
    }

    fn offense_component(
        &self,
        away: Option<&TeamSeasonStats>,
        home: Option<&TeamSeasonStats>,
        reasons: &mut Vec<String>,
    ) -> f64 {
        let (Some(away), Some(home)) = (away, home) else {
            return 0.0;
        };
        let w = self.cfg.weights.offense;
        let avg_ortg = (away.off_rating + home.off_rating) / 2.0;

        let (score, label) = if avg_ortg >= self.cfg.elite_ortg {
            (w, "elite")
        } else if avg_ortg >= self.cfg.strong_ortg {
            (w * 2.0 / 3.0, "strong")
        } else if avg_ortg >= self.cfg.above_avg_ortg {
            (w / 3.0, "above-average")
        } else {
            (0.0, "weak")
        };

        if score > 0.0 {
            reasons.push(format!("{label} offense (avg ORtg {avg_ortg:.1})"));
        }
        score
    }

    fn pace_component(
        &self,
        away: Option<&TeamSeasonStats>,
        home: Option<&TeamSeasonStats>,
        reasons: &mut Vec<String>,
    ) -> f64 {
        let (Some(away), Some(home)) = (away, home) else {
            return 0.0;
        };
        let w = self.cfg.weights.pace;
        let avg_pace = (away.pace + home.pace) / 2.0;

        let (score, label) = if avg_pace >= self.cfg.fast_pace {
            (w, "fast")
        } else if avg_pace >= self.cfg.above_avg_pace {
            (w * 0.6, "above-average")
        } else if avg_pace >= self.cfg.average_pace {
            (w * 0.32, "average")
        } else {
            (0.0, "slow")
        };

        if score > 0.0 {
            reasons.push(format!("{label} pace ({avg_pace:.1})"));
        }
        score
    }

    fn form_component(&self, away_team: &str, home_team: &str, reasons: &mut Vec<String>) -> f64 {
        let away = self.team_form(away_team);
        let home = self.team_form(home_team);
        let w = self.cfg.weights.form;

        match (away, home) {
            (Form::Hot, Form::Hot) => {
                reasons.push("both teams scoring hot".to_string());
                w
            }
            (Form::Hot, _) => {
                reasons.push(format!("{away_team} scoring hot"));
                w * 0.6
            }
            (_, Form::Hot) => {
                reasons.push(format!("{home_team} scoring hot"));
                w * 0.6
            }
            // A cold team is a red flag regardless of the other side.
            (Form::Cold, _) | (_, Form::Cold) => 0.0,
            _ => w * 0.4,
        }
    }

    /// Hot = last-window average meaningfully above season ppg; cold =
    /// meaningfully below. Fewer than the minimum form games is Unknown,
    /// which scores like neutral but never like hot.
    fn team_form(&self, team: &str) -> Form {
        let recent = dataset::recent_scores(self.games, team, self.cfg.form_window);
        if recent.len() < self.cfg.form_min_games {
            return Form::Unknown;
        }
        let avg = recent.iter().sum::<f64>() / recent.len() as f64;
        let season_ppg = self
            .team_stats(team)
            .map(|s| s.ppg)
            .unwrap_or(avg);

        let diff = avg - season_ppg;
        if diff >= self.cfg.hot_diff {
            Form::Hot
        } else if diff <= self.cfg.cold_diff {
            Form::Cold
        } else {
            Form::Neutral
        }
    }

    fn buffer_component(
        &self,
        away: Option<&TeamSeasonStats>,
        home: Option<&TeamSeasonStats>,
        line: f64,
        reasons: &mut Vec<String>,
    ) -> f64 {
        let (Some(away), Some(home)) = (away, home) else {
            return 0.0;
        };
        let w = self.cfg.weights.buffer;
        let buffer = away.ppg + home.ppg - line;

        let (score, label) = if buffer >= self.cfg.strong_buffer {
            (w, "strong")
        } else if buffer >= self.cfg.good_buffer {
            (w * 2.0 / 3.0, "good")
        } else if buffer >= self.cfg.moderate_buffer {
            (w * 7.0 / 15.0, "moderate")
        } else if buffer >= self.cfg.small_buffer {
            (w * 0.2, "small")
        } else {
            (0.0, "tight")
        };

        if score > 0.0 {
            reasons.push(format!("{label} buffer ({buffer:.1} pts above line)"));
        }
        score
    }

    fn rest_component(
        &self,
        away_team: &str,
        home_team: &str,
        tip_off: NaiveDateTime,
        reasons: &mut Vec<String>,
    ) -> f64 {
        let w = self.cfg.weights.rest;
        let b2b = |team: &str| {
            dataset::rest_days_before(self.games, team, tip_off)
                .is_some_and(|d| d <= 1)
        };

        match (b2b(away_team), b2b(home_team)) {
            (true, true) => 0.0,
            (true, false) => {
                reasons.push(format!("{away_team} on back-to-back"));
                w * 0.5
            }
            (false, true) => {
                reasons.push(format!("{home_team} on back-to-back"));
                w * 0.5
            }
            (false, false) => {
                reasons.push("both teams rested".to_string());
                w
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, day)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap()
    }

    fn stats(team: &str, ppg: f64, pace: f64, ortg: f64) -> TeamSeasonStats {
        TeamSeasonStats {
            team: team.to_string(),
            ppg,
            pace,
            off_rating: ortg,
        }
    }

    fn game(day: u32, away: &str, home: &str, ap: u32, hp: u32) -> GameRecord {
        GameRecord {
            date: at(day),
            away_team: away.to_string(),
            home_team: home.to_string(),
            away_pts: ap,
            home_pts: hp,
        }
    }

    #[test]
    fn best_case_hits_the_full_hundred() {
        // Elite offense, fast pace, both hot, huge buffer, both rested.
        let stats = vec![
            stats("Indiana Pacers", 120.0, 102.0, 118.0),
            stats("Atlanta Hawks", 119.0, 101.0, 117.0),
        ];
        let log = vec![
            game(1, "Indiana Pacers", "Atlanta Hawks", 128, 127),
            game(4, "Atlanta Hawks", "Indiana Pacers", 126, 129),
            game(7, "Indiana Pacers", "Atlanta Hawks", 127, 125),
        ];
        let cfg = ScoringConfig::default();
        let scorer = FactorScorer::new(&stats, &log, &cfg);
        let s = scorer.score("Indiana Pacers", "Atlanta Hawks", 215.0, at(12));
        assert!((s.total - 100.0).abs() < 1e-9);
        assert_eq!(s.reasons.len(), 5);
    }

    #[test]
    fn total_is_bounded_for_any_inputs() {
        let cfg = ScoringConfig::default();
        let scorer = FactorScorer::new(&[], &[], &cfg);
        let s = scorer.score("Nobody", "Nothing", 500.0, at(12));
        assert!(s.total >= 0.0);
        // Missing stats zero out offense, pace and buffer; unknown form
        // scores neutral and an empty log counts as rested.
        assert_eq!(s.total, cfg.weights.rest + cfg.weights.form * 0.4);
    }

    #[test]
    fn offense_tiers_match_point_table() {
        let cfg = ScoringConfig::default();
        let cases = [
            (118.0, 117.0, 30.0), // elite
            (115.0, 114.0, 20.0), // strong
            (113.0, 112.0, 10.0), // above average
            (110.0, 108.0, 0.0),  // weak
        ];
        for (a, h, want) in cases {
            let stats = vec![stats("A", 112.0, 99.0, a), stats("H", 112.0, 99.0, h)];
            let scorer = FactorScorer::new(&stats, &[], &cfg);
            let s = scorer.score("A", "H", 300.0, at(12));
            assert!((s.offense - want).abs() < 1e-9, "ortg {a}/{h}");
        }
    }

    #[test]
    fn buffer_tiers_match_point_table() {
        let cfg = ScoringConfig::default();
        let cases = [
            (220.0, 15.0), // buffer 20
            (225.0, 10.0), // buffer 15
            (230.0, 7.0),  // buffer 10
            (235.0, 3.0),  // buffer 5
            (238.0, 0.0),  // too tight
        ];
        for (line, want) in cases {
            let stats = vec![
                stats("A", 120.0, 90.0, 100.0),
                stats("H", 120.0, 90.0, 100.0),
            ];
            let scorer = FactorScorer::new(&stats, &[], &cfg);
            let s = scorer.score("A", "H", line, at(12));
            assert!((s.buffer - want).abs() < 1e-9, "line {line}");
        }
    }

    #[test]
    fn cold_team_zeroes_the_form_component() {
        let stats = vec![
            stats("Memphis Grizzlies", 118.0, 99.0, 113.0),
            stats("Orlando Magic", 105.0, 97.0, 109.0),
        ];
        // Memphis scoring way below its season average.
        let log = vec![
            game(1, "Memphis Grizzlies", "Orlando Magic", 104, 105),
            game(3, "Orlando Magic", "Memphis Grizzlies", 104, 103),
            game(6, "Memphis Grizzlies", "Orlando Magic", 102, 106),
        ];
        let cfg = ScoringConfig::default();
        let scorer = FactorScorer::new(&stats, &log, &cfg);
        let s = scorer.score("Memphis Grizzlies", "Orlando Magic", 200.0, at(12));
        assert_eq!(s.form, 0.0);
    }

    #[test]
    fn back_to_back_halves_the_rest_component() {
        let stats = vec![
            stats("Chicago Bulls", 112.0, 99.0, 112.0),
            stats("Detroit Pistons", 110.0, 98.0, 111.0),
        ];
        let log = vec![game(11, "Chicago Bulls", "Utah Jazz", 115, 110)];
        let cfg = ScoringConfig::default();
        let scorer = FactorScorer::new(&stats, &log, &cfg);
        let s = scorer.score("Chicago Bulls", "Detroit Pistons", 207.0, at(12));
        assert_eq!(s.rest, cfg.weights.rest * 0.5);
        assert!(s.reasons.iter().any(|r| r.contains("back-to-back")));
    }
}
