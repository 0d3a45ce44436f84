use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProfileConfig;
use crate::dataset::{GameRecord, TeamSeasonStats};

/// A team's fitted scoring distribution, rebuilt on every historical-data
/// refresh and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamProfile {
    pub team: String,
    pub mean_ppg: f64,
    pub std_ppg: f64,
    pub min_ppg: f64,
    pub max_ppg: f64,
    pub games_played: usize,
    /// False until the team has enough observed games for its variance to
    /// be trusted. Consumers surface this as a risk factor, not an error.
    pub reliable: bool,
}

/// Profiles for every team seen in the season-stats table or the game log,
/// plus a league-average fallback for identifiers seen in neither.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    profiles: HashMap<String, TeamProfile>,
    league_avg_ppg: f64,
    default: TeamProfile,
}

impl ProfileSet {
    pub fn build(stats: &[TeamSeasonStats], games: &[GameRecord], cfg: &ProfileConfig) -> Self {
        let league_avg_ppg = if stats.is_empty() {
            cfg.default_league_ppg
        } else {
            stats.iter().map(|s| s.ppg).sum::<f64>() / stats.len() as f64
        };

        let mut names: HashSet<&str> = stats.iter().map(|s| s.team.as_str()).collect();
        for g in games {
            names.insert(g.away_team.as_str());
            names.insert(g.home_team.as_str());
        }

        let season_ppg: HashMap<&str, f64> =
            stats.iter().map(|s| (s.team.as_str(), s.ppg)).collect();

        let mut profiles = HashMap::with_capacity(names.len());
        for name in names {
            let fallback_ppg = season_ppg.get(name).copied().unwrap_or(league_avg_ppg);
            let profile = build_profile(name, games, fallback_ppg, cfg);
            profiles.insert(name.to_string(), profile);
        }

        debug!(
            teams = profiles.len(),
            league_avg_ppg, "built team scoring profiles"
        );

        Self {
            profiles,
            league_avg_ppg,
            default: league_default(league_avg_ppg, cfg),
        }
    }

    /// Assembles a set from already fitted profiles, e.g. ones restored
    /// from a cache instead of rebuilt from the raw log.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = TeamProfile>,
        league_avg_ppg: f64,
        cfg: &ProfileConfig,
    ) -> Self {
        let profiles: HashMap<String, TeamProfile> = profiles
            .into_iter()
            .map(|p| (p.team.clone(), p))
            .collect();
        Self {
            profiles,
            league_avg_ppg,
            default: league_default(league_avg_ppg, cfg),
        }
    }

    /// Unknown identifiers resolve to the league-average default rather
    /// than failing.
    pub fn get(&self, team: &str) -> &TeamProfile {
        self.profiles.get(team).unwrap_or(&self.default)
    }

    pub fn contains(&self, team: &str) -> bool {
        self.profiles.contains_key(team)
    }

    pub fn league_avg_ppg(&self) -> f64 {
        self.league_avg_ppg
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamProfile> {
        self.profiles.values()
    }
}

fn build_profile(
    team: &str,
    games: &[GameRecord],
    fallback_ppg: f64,
    cfg: &ProfileConfig,
) -> TeamProfile {
    let scores: Vec<f64> = games.iter().filter_map(|g| g.score_for(team)).collect();

    if scores.is_empty() {
        return TeamProfile {
            team: team.to_string(),
            mean_ppg: fallback_ppg,
            std_ppg: cfg.fallback_std,
            min_ppg: fallback_ppg - cfg.fallback_spread,
            max_ppg: fallback_ppg + cfg.fallback_spread,
            games_played: 0,
            reliable: false,
        };
    }

    let n = scores.len();
    let mean = scores.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;
        var.sqrt()
    } else {
        cfg.fallback_std
    };

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    TeamProfile {
        team: team.to_string(),
        mean_ppg: mean,
        std_ppg: std.max(cfg.std_floor),
        min_ppg: min,
        max_ppg: max,
        games_played: n,
        reliable: n >= cfg.min_reliable_games,
    }
}

fn league_default(league_avg_ppg: f64, cfg: &ProfileConfig) -> TeamProfile {
    TeamProfile {
        team: String::new(),
        mean_ppg: league_avg_ppg,
        std_ppg: cfg.fallback_std,
        min_ppg: cfg.default_min,
        max_ppg: cfg.default_max,
        games_played: 0,
        reliable: false,
    }
}
