//! MERGE2048 Server - HTTP API for the browser front end
//!
//! This crate provides the web backend:
//! - REST API for game operations (new game, move, load, state)
//! - Static file serving for the front end
//! - Save-file persistence of the current game

mod error;
mod routes;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

use merge2048_core::DEFAULT_SIZE;

pub use error::ApiError;
pub use routes::game::{GameView, MoveView};
pub use state::{PendingSave, ServerState};

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: String,
    /// Where the current game is saved between runs (None = no persistence)
    pub save_path: Option<PathBuf>,
    /// Board size for the first game when nothing is saved
    pub default_size: usize,
    /// Seed for tile placement (None = OS entropy)
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8048,
            static_dir: "web".to_string(),
            save_path: None,
            default_size: DEFAULT_SIZE,
            seed: None,
        }
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let static_service = ServeDir::new(&config.static_dir);

    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Game API
        .route("/api/game", get(routes::game::get_game))
        .route("/api/game/new", post(routes::game::new_game))
        .route("/api/game/move", post(routes::game::make_move))
        .route("/api/game/load", post(routes::game::load_game))
        // Shared state
        .with_state(state)
        // Static file serving (must be last)
        .fallback_service(static_service)
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(ServerState::from_config(&config)?);
    let router = create_router(&config, state);

    tracing::info!("MERGE2048 Server starting on http://0.0.0.0:{}", config.port);
    tracing::info!("Static files served from: {}", config.static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
