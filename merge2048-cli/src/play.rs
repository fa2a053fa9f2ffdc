//! Play command - play a game in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: start_game(), play_session()
//! - Level 3: apply_command(), persist()
//! - Level 4: parse_command(), render()

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use merge2048_core::{Direction, Game, GameStatus, SaveFile, DEFAULT_SIZE};

const HELP: &str = "\
Keys: w/a/s/d or up/down/left/right (U/D/L/R) to move
      n  new game
      q  quit";

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Board size for a new game
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    pub size: usize,

    /// Save file; resumed on start, cleared when the game ends
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,
}

/// One line of player input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Move(Direction),
    NewGame,
    Help,
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Resume the saved game or start a new one
/// 2. Read commands from stdin until quit or end of input
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let save = args.save.as_ref().map(SaveFile::new);
    let mut game = start_game(&args, seed, save.as_ref())?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}\n", HELP)?;

    play_session(&mut game, stdin.lock(), &mut stdout, save.as_ref())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn start_game(args: &PlayArgs, seed: Option<u64>, save: Option<&SaveFile>) -> Result<Game> {
    let rng = create_rng(seed);

    if let Some(save) = save {
        if let Some(snapshot) = save.load()? {
            match Game::from_snapshot(snapshot, rng.clone()) {
                Ok(game) => {
                    tracing::info!("Resumed game from {}", save.path().display());
                    return Ok(game);
                }
                Err(e) => tracing::warn!("Saved game rejected, starting fresh: {}", e),
            }
        }
    }

    let game = Game::new(args.size, rng)
        .with_context(|| format!("Cannot start a game of size {}", args.size))?;
    persist(save, &game);
    Ok(game)
}

/// Read commands line by line, rendering after every change
fn play_session<R: Rng, I: BufRead, W: Write>(
    game: &mut Game<R>,
    input: I,
    out: &mut W,
    save: Option<&SaveFile>,
) -> Result<()> {
    render(game, out)?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Some(Command::Quit) => break,
            Some(command) => apply_command(game, command, out, save)?,
            None => writeln!(out, "Unknown command {:?}. Type ? for help.", line)?,
        }
    }

    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn apply_command<R: Rng, W: Write>(
    game: &mut Game<R>,
    command: Command,
    out: &mut W,
    save: Option<&SaveFile>,
) -> Result<()> {
    match command {
        Command::Move(direction) => {
            if game.status().is_terminal() {
                writeln!(out, "The game is over. Press n for a new game or q to quit.")?;
                return Ok(());
            }

            let outcome = game.apply_move(direction);
            tracing::debug!(
                "Move {}: moved={} +{} spawned={:?}",
                direction,
                outcome.moved,
                outcome.score_delta,
                outcome.spawned
            );

            if !outcome.moved {
                writeln!(out, "Nothing moves {}.", direction)?;
                return Ok(());
            }

            persist(save, game);
            render(game, out)?;

            match outcome.status {
                GameStatus::Won => writeln!(out, "You win")?,
                GameStatus::Lost => writeln!(out, "Game over")?,
                GameStatus::Ongoing => {}
            }
        }
        Command::NewGame => {
            let size = game.size();
            game.new_game(size)?;
            tracing::info!("New game (size {})", size);
            persist(save, game);
            render(game, out)?;
        }
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Quit => {}
    }

    Ok(())
}

/// Save failures are logged and play continues
fn persist<R: Rng>(save: Option<&SaveFile>, game: &Game<R>) {
    if let Some(save) = save {
        if let Err(e) = save.record(game) {
            tracing::warn!("Failed to save game: {:#}", e);
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// WASD keys first (so `d` is Right), then direction names and letters
fn parse_command(line: &str) -> Option<Command> {
    let lower = line.to_ascii_lowercase();
    let command = match lower.as_str() {
        "w" => Command::Move(Direction::Up),
        "a" => Command::Move(Direction::Left),
        "s" => Command::Move(Direction::Down),
        "d" => Command::Move(Direction::Right),
        "n" | "new" => Command::NewGame,
        "?" | "h" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => Command::Move(other.parse().ok()?),
    };
    Some(command)
}

fn render<R: Rng, W: Write>(game: &Game<R>, out: &mut W) -> Result<()> {
    writeln!(out, "Score: {}", game.score())?;
    write!(out, "{}", game.board())?;
    Ok(())
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
