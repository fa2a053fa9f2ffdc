//! Server command - start the web server
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to merge2048-server crate)
//! - Level 4: configuration validation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use merge2048_core::{DEFAULT_SIZE, MAX_SIZE, MIN_SIZE};
use merge2048_server::{run_server, ServerConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on
    #[arg(long, default_value = "8048")]
    pub port: u16,

    /// Directory containing the front end's static files
    #[arg(long, default_value = "web")]
    pub static_dir: PathBuf,

    /// Save file for the current game (resumed on restart)
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Board size for the first game
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    pub size: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// 1. Configure server
/// 2. Start server (blocking)
pub fn run(args: ServerArgs, seed: Option<u64>) -> Result<()> {
    let config = configure_server(&args, seed)?;

    tracing::info!("Starting MERGE2048 server on port {}", config.port);

    start_server(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure server from command arguments
fn configure_server(args: &ServerArgs, seed: Option<u64>) -> Result<ServerConfig> {
    validate_static_dir(&args.static_dir)?;
    validate_size(args.size)?;

    Ok(ServerConfig {
        port: args.port,
        static_dir: args.static_dir.to_string_lossy().to_string(),
        save_path: args.save.clone(),
        default_size: args.size,
        seed,
    })
}

/// Start the server (blocking)
fn start_server(config: ServerConfig) -> Result<()> {
    // Create tokio runtime for async server
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config).await })
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Validate that static directory exists
fn validate_static_dir(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "Static directory does not exist: {}. Server will start but only the API is available.",
            path.display()
        );
    } else if !path.is_dir() {
        anyhow::bail!(
            "Static path exists but is not a directory: {}",
            path.display()
        );
    }

    Ok(())
}

fn validate_size(size: usize) -> Result<()> {
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        anyhow::bail!(
            "Board size must be between {} and {}, got {}",
            MIN_SIZE,
            MAX_SIZE,
            size
        );
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServerArgs {
        ServerArgs {
            port: 8048,
            static_dir: PathBuf::from("test_static"),
            save: None,
            size: 4,
        }
    }

    #[test]
    fn test_configure_server_defaults() {
        let config = configure_server(&args(), Some(9)).unwrap();
        assert_eq!(config.port, 8048);
        assert_eq!(config.static_dir, "test_static");
        assert_eq!(config.default_size, 4);
        assert_eq!(config.seed, Some(9));
        assert!(config.save_path.is_none());
    }

    #[test]
    fn test_configure_server_rejects_tiny_board() {
        let mut args = args();
        args.size = 1;
        assert!(configure_server(&args, None).is_err());
    }

    #[test]
    fn test_configure_server_rejects_huge_board() {
        let mut args = args();
        args.size = MAX_SIZE + 1;
        assert!(configure_server(&args, None).is_err());

        args.size = MAX_SIZE;
        assert!(configure_server(&args, None).is_ok());
    }

    #[test]
    fn test_validate_static_dir_nonexistent() {
        // Should not error, just warn
        let result = validate_static_dir(&PathBuf::from("/nonexistent/path"));
        assert!(result.is_ok());
    }
}
