//! Bench command - play random games in parallel and report statistics
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), summarize(), report_results()
//! - Level 3: play_random_game()
//! - Level 4: timing utilities, formatting

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use merge2048_core::{Game, GameStatus, DEFAULT_SIZE, MAX_SIZE, MIN_SIZE};

/// Offset between a game's tile seed and its player seed
const PLAYER_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchArgs {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Board size
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    pub size: usize,

    /// Maximum moves per game
    #[arg(long, default_value = "10000")]
    pub max_moves: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Settings for one benchmark run
#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub games: usize,
    pub size: usize,
    pub max_moves: u32,
    pub base_seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            games: 100,
            size: DEFAULT_SIZE,
            max_moves: 10_000,
            base_seed: 42,
        }
    }
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    status: GameStatus,
    score: u64,
    max_tile: u32,
    moves: u32,
}

/// Aggregated benchmark results
#[derive(Clone, Debug, Serialize)]
struct BenchResults {
    games: usize,
    size: usize,
    wins: usize,
    losses: usize,
    unfinished: usize,
    mean_score: f64,
    best_score: u64,
    best_tile: u32,
    mean_moves: f64,
    /// Games per highest tile reached
    max_tile_counts: BTreeMap<u32, usize>,
    total_time_ms: u64,
    games_per_second: f64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run bench command
///
/// 1. Play all games in parallel
/// 2. Summarize
/// 3. Report
pub fn run(args: BenchArgs, seed: Option<u64>) -> Result<()> {
    if !(MIN_SIZE..=MAX_SIZE).contains(&args.size) {
        anyhow::bail!(
            "Board size must be between {} and {}, got {}",
            MIN_SIZE,
            MAX_SIZE,
            args.size
        );
    }

    let config = BenchConfig {
        games: args.games,
        size: args.size,
        max_moves: args.max_moves,
        base_seed: seed.unwrap_or_else(|| thread_rng().gen()),
    };

    tracing::info!(
        "Starting benchmark: {} games on {}x{} (seed {})",
        config.games,
        config.size,
        config.size,
        config.base_seed
    );

    let start = Instant::now();
    let records = play_games(&config, !args.json)?;
    let results = summarize(&records, config.size, start.elapsed());

    report_results(&results, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play every game on the rayon pool
fn play_games(config: &BenchConfig, show_progress: bool) -> Result<Vec<GameRecord>> {
    let progress = if show_progress {
        let bar = ProgressBar::new(config.games as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} games ({elapsed})")?,
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let records = (0..config.games)
        .into_par_iter()
        .map(|i| {
            let record = play_random_game(config, config.base_seed.wrapping_add(i as u64));
            progress.inc(1);
            record
        })
        .collect::<Result<Vec<_>>>()?;

    progress.finish_and_clear();
    Ok(records)
}

fn summarize(records: &[GameRecord], size: usize, elapsed: Duration) -> BenchResults {
    let games = records.len();
    let count = |status: GameStatus| records.iter().filter(|r| r.status == status).count();
    let wins = count(GameStatus::Won);
    let losses = count(GameStatus::Lost);

    let mut max_tile_counts = BTreeMap::new();
    for record in records {
        *max_tile_counts.entry(record.max_tile).or_insert(0) += 1;
    }

    let mean = |total: f64| if games == 0 { 0.0 } else { total / games as f64 };

    BenchResults {
        games,
        size,
        wins,
        losses,
        unfinished: games - wins - losses,
        mean_score: mean(records.iter().map(|r| r.score as f64).sum()),
        best_score: records.iter().map(|r| r.score).max().unwrap_or(0),
        best_tile: records.iter().map(|r| r.max_tile).max().unwrap_or(0),
        mean_moves: mean(records.iter().map(|r| r.moves as f64).sum()),
        max_tile_counts,
        total_time_ms: elapsed.as_millis() as u64,
        games_per_second: if elapsed.as_secs_f64() > 0.0 {
            games as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        },
    }
}

fn report_results(results: &BenchResults, json: bool) {
    if json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - SINGLE GAME
// ============================================================================

/// Play uniformly random available moves until the game ends or runs out of moves
fn play_random_game(config: &BenchConfig, seed: u64) -> Result<GameRecord> {
    let mut game = Game::seeded(config.size, seed)?;
    let mut player = ChaCha8Rng::seed_from_u64(seed ^ PLAYER_SEED_OFFSET);
    let mut moves = 0;

    while moves < config.max_moves && !game.status().is_terminal() {
        let Some(&direction) = game.available_moves().choose(&mut player) else {
            break;
        };
        game.apply_move(direction);
        moves += 1;
    }

    Ok(GameRecord {
        status: game.status(),
        score: game.score(),
        max_tile: game.max_tile(),
        moves,
    })
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

/// Format duration for display
fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 60 {
        format!("{}m {:.1}s", d.as_secs() / 60, (d.as_secs() % 60) as f64 + d.subsec_millis() as f64 / 1000.0)
    } else if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    }
}

/// Print results as JSON
fn print_json_results(results: &BenchResults) {
    if let Ok(json) = serde_json::to_string_pretty(results) {
        println!("{}", json);
    }
}

/// Print results as text table
fn print_text_results(results: &BenchResults) {
    println!("\n=== MERGE2048 Random Play ({}x{}) ===", results.size, results.size);
    println!(
        "Games: {}  Won: {}  Lost: {}  Unfinished: {}",
        results.games, results.wins, results.losses, results.unfinished
    );
    println!(
        "Mean score: {:.1}  Best score: {}  Best tile: {}  Mean moves: {:.1}",
        results.mean_score, results.best_score, results.best_tile, results.mean_moves
    );
    println!(
        "Time: {}  ({:.1} games/s)\n",
        format_duration(Duration::from_millis(results.total_time_ms)),
        results.games_per_second
    );

    println!("{:>10} {:>8} {:>8}", "Max tile", "Games", "Share");
    println!("{}", "-".repeat(28));
    for (tile, count) in &results.max_tile_counts {
        println!(
            "{:>10} {:>8} {:>7.1}%",
            tile,
            count,
            100.0 * *count as f64 / results.games.max(1) as f64
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert!(format_duration(Duration::from_millis(500)).contains("ms"));
        assert!(format_duration(Duration::from_secs(5)).contains("s"));
        assert!(format_duration(Duration::from_secs(90)).contains("m"));
    }

    #[test]
    fn test_random_game_runs_to_the_end() {
        let config = BenchConfig::default();
        let record = play_random_game(&config, 7).unwrap();
        assert_ne!(record.status, GameStatus::Ongoing);
        assert!(record.moves > 0);
        assert!(record.max_tile >= 4);
    }

    #[test]
    fn test_random_game_is_reproducible() {
        let config = BenchConfig {
            size: 3,
            ..Default::default()
        };
        let a = play_random_game(&config, 11).unwrap();
        let b = play_random_game(&config, 11).unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.moves, b.moves);
    }

    #[test]
    fn test_move_cap_leaves_game_unfinished() {
        let config = BenchConfig {
            max_moves: 3,
            ..Default::default()
        };
        let record = play_random_game(&config, 5).unwrap();
        assert_eq!(record.moves, 3);
        assert_eq!(record.status, GameStatus::Ongoing);
    }

    #[test]
    fn test_summarize() {
        let records = vec![
            GameRecord { status: GameStatus::Lost, score: 100, max_tile: 64, moves: 80 },
            GameRecord { status: GameStatus::Lost, score: 300, max_tile: 128, moves: 120 },
            GameRecord { status: GameStatus::Ongoing, score: 20, max_tile: 8, moves: 10 },
        ];
        let results = summarize(&records, 4, Duration::from_secs(1));

        assert_eq!(results.games, 3);
        assert_eq!(results.losses, 2);
        assert_eq!(results.unfinished, 1);
        assert_eq!(results.best_score, 300);
        assert_eq!(results.best_tile, 128);
        assert!((results.mean_score - 140.0).abs() < 1e-9);
        assert_eq!(results.max_tile_counts.get(&64), Some(&1));
        assert!((results.games_per_second - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_play_games_collects_every_game() {
        let config = BenchConfig {
            games: 8,
            size: 3,
            ..Default::default()
        };
        let records = play_games(&config, false).unwrap();
        assert_eq!(records.len(), 8);
    }
}
