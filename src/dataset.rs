use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of the season-stats table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub team: String,
    /// Season-average points per game.
    pub ppg: f64,
    /// Possessions-per-48 estimate.
    pub pace: f64,
    /// Offensive rating (points per 100 possessions).
    pub off_rating: f64,
}

/// One finished game from the historical log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDateTime,
    pub away_team: String,
    pub home_team: String,
    pub away_pts: u32,
    pub home_pts: u32,
}

impl GameRecord {
    pub fn total(&self) -> f64 {
        (self.away_pts + self.home_pts) as f64
    }

    pub fn involves(&self, team: &str) -> bool {
        self.away_team == team || self.home_team == team
    }

    /// Points this team scored, whichever side it played on.
    pub fn score_for(&self, team: &str) -> Option<f64> {
        if self.away_team == team {
            Some(self.away_pts as f64)
        } else if self.home_team == team {
            Some(self.home_pts as f64)
        } else {
            None
        }
    }
}

/// A game to be predicted, as handed over by the odds-collection layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingGame {
    pub away_team: String,
    pub home_team: String,
    pub tip_off: NaiveDateTime,
    /// The minimum alternate total being evaluated.
    pub line: f64,
    /// American price attached to that line; carried through untouched.
    pub price: i32,
    #[serde(default)]
    pub spread: Option<f64>,
}

/// Days between `date` and the team's most recent game strictly before it.
/// `None` when the log has no earlier game for the team (season opener, or
/// an unknown identifier); callers treat that as fully rested.
pub fn rest_days_before(games: &[GameRecord], team: &str, date: NaiveDateTime) -> Option<i64> {
    games
        .iter()
        .filter(|g| g.involves(team) && g.date < date)
        .map(|g| g.date)
        .max()
        .map(|last| (date.date() - last.date()).num_days())
}

/// The team's own scores over its last `n` games, oldest first.
pub fn recent_scores(games: &[GameRecord], team: &str, n: usize) -> Vec<f64> {
    let mut played: Vec<&GameRecord> = games.iter().filter(|g| g.involves(team)).collect();
    played.sort_by(|a, b| a.date.cmp(&b.date));

    let skip = played.len().saturating_sub(n);
    played
        .iter()
        .skip(skip)
        .filter_map(|g| g.score_for(team))
        .collect()
}
