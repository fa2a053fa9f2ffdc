//! MERGE2048 CLI - Command-line interface
//!
//! Commands:
//! - play: Play in the terminal
//! - serve: Start the web server for the browser front end
//! - bench: Play random games in parallel and report statistics

mod bench;
mod play;
mod server;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "merge2048")]
#[command(about = "The 2048 sliding-tile puzzle")]
struct Cli {
    /// Seed for tile placement (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game in the terminal
    Play(play::PlayArgs),
    /// Start the web server
    Serve(server::ServerArgs),
    /// Benchmark random play
    Bench(bench::BenchArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Serve(args) => server::run(args, cli.seed),
        Commands::Bench(args) => bench::run(args, cli.seed),
    }
}

/// Logs go to stderr so the board on stdout stays readable
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
