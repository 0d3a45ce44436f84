use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use nba_minline::backtest::{BetOutcome, Verdict, run_backtest};
use nba_minline::config::EngineConfig;
use nba_minline::dataset::{GameRecord, TeamSeasonStats};

#[derive(Debug, Deserialize)]
struct BacktestInput {
    team_stats: Vec<TeamSeasonStats>,
    completed_games: Vec<GameRecord>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    config: Option<EngineConfig>,
}

// This binary is intentionally simple: it loads one JSON snapshot of the
// season (stats table + completed games) and prints the backtest report.
// It avoids network calls and is meant for quick threshold-tuning runs.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/season_snapshot.json"));

    let raw = fs::read_to_string(&path)?;
    let input: BacktestInput = serde_json::from_str(&raw)?;

    let cfg = input.config.unwrap_or_default();
    let summary = run_backtest(
        &input.team_stats,
        &input.completed_games,
        &cfg,
        input.seed.unwrap_or(0),
    );

    println!("Games evaluated:  {}", summary.total_games);
    println!("Bets placed:      {}", summary.decisions);
    println!("Wins:             {}", summary.wins);
    println!("Losses:           {}", summary.losses);
    println!("Skipped:          {}", summary.skipped);
    println!("Win rate:         {:.1}%", summary.win_rate);
    match summary.verdict {
        Verdict::Validated => println!(
            "Verdict:          VALIDATED (>= {:.0}% target)",
            cfg.backtest.acceptance_threshold
        ),
        Verdict::BelowTarget => println!(
            "Verdict:          BELOW TARGET (< {:.0}%)",
            cfg.backtest.acceptance_threshold
        ),
        Verdict::InsufficientData => println!("Verdict:          INSUFFICIENT DATA"),
    }

    if !summary.by_label.is_empty() {
        println!("\nBy decision label:");
        for row in &summary.by_label {
            println!(
                "  {:<10} {:>4} bets  {:>3} W / {:>3} L  ({:.1}%)",
                format!("{:?}", row.label),
                row.games,
                row.wins,
                row.losses,
                row.win_rate
            );
        }
    }

    for record in summary
        .records
        .iter()
        .filter(|r| r.outcome == BetOutcome::Loss)
    {
        println!(
            "\nLOSS {} @ {} on {}: line {} actual {} (mc {:.1}%, score {:.0})",
            record.decision.away_team,
            record.decision.home_team,
            record.date.date(),
            record.decision.line,
            record.actual_total,
            record.decision.probability,
            record.decision.score
        );
    }

    Ok(())
}
