//! Game API endpoints
//!
//! The front end renders whatever `GameView` says; it never holds state of
//! its own beyond the last response.

use axum::{extract::State, Json};
use merge2048_core::{Direction, EngineError, Game, GameStatus, MoveOutcome, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::ServerState;

/// Everything needed to render the board
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameView {
    pub board: Vec<Vec<u32>>,
    pub score: u64,
    pub size: usize,
    pub max_tile: u32,
    pub status: GameStatus,
}

impl GameView {
    pub fn from_game(game: &Game) -> Self {
        Self {
            board: game.board().rows(),
            score: game.score(),
            size: game.size(),
            max_tile: game.max_tile(),
            status: game.status(),
        }
    }
}

/// Result of a move plus the board after it
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveView {
    pub moved: bool,
    pub score_delta: u64,
    pub merges: usize,
    /// [row, col] of the new tile
    pub spawned: Option<[usize; 2]>,
    pub game: GameView,
}

impl MoveView {
    fn new(outcome: &MoveOutcome, game: &Game) -> Self {
        Self {
            moved: outcome.moved,
            score_delta: outcome.score_delta,
            merges: outcome.merges,
            spawned: outcome.spawned.map(|(row, col)| [row, col]),
            game: GameView::from_game(game),
        }
    }
}

/// Get the current game
pub async fn get_game(State(state): State<Arc<ServerState>>) -> Json<GameView> {
    Json(GameView::from_game(&state.game()))
}

#[derive(Deserialize)]
pub struct NewGameRequest {
    /// Board size; keeps the current size when absent
    pub size: Option<usize>,
}

/// Start a new game
pub async fn new_game(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<NewGameRequest>,
) -> Result<Json<GameView>, ApiError> {
    let (view, pending) = {
        let mut game = state.game_mut();
        let size = req.size.unwrap_or_else(|| game.size());

        game.new_game(size)?;
        tracing::info!("New game started (size {})", size);

        (GameView::from_game(&game), state.pending_save(&game))
    };

    state.persist(pending).await;
    Ok(Json(view))
}

/// Direction as a name ("left", "L") or a numeric code (0=Up, 1=Down, 2=Left, 3=Right)
#[derive(Deserialize)]
#[serde(untagged)]
pub enum DirectionInput {
    Name(String),
    Code(i64),
}

impl TryFrom<DirectionInput> for Direction {
    type Error = EngineError;

    fn try_from(input: DirectionInput) -> Result<Self, Self::Error> {
        match input {
            DirectionInput::Name(name) => name.parse(),
            DirectionInput::Code(code) => u8::try_from(code)
                .map_err(|_| EngineError::InvalidDirection(code.to_string()))
                .and_then(Direction::try_from),
        }
    }
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub direction: DirectionInput,
}

/// Apply a move. Rejected with 409 once the game has been won or lost.
pub async fn make_move(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveView>, ApiError> {
    let direction = Direction::try_from(req.direction)?;

    let (view, pending) = {
        let mut game = state.game_mut();
        let status = game.status();
        if status.is_terminal() {
            return Err(ApiError::GameFinished(status));
        }

        let outcome = game.apply_move(direction);
        tracing::debug!(
            "Move {}: moved={} +{} status={:?}",
            direction,
            outcome.moved,
            outcome.score_delta,
            outcome.status
        );

        let pending = if outcome.moved {
            state.pending_save(&game)
        } else {
            None
        };
        (MoveView::new(&outcome, &game), pending)
    };

    state.persist(pending).await;
    Ok(Json(view))
}

/// Replace the current game with a supplied board and score
pub async fn load_game(
    State(state): State<Arc<ServerState>>,
    Json(snapshot): Json<Snapshot>,
) -> Result<Json<GameView>, ApiError> {
    let (view, pending) = {
        let mut game = state.game_mut();
        game.restore(snapshot)?;
        tracing::info!("Loaded game (size {}, score {})", game.size(), game.score());

        (GameView::from_game(&game), state.pending_save(&game))
    };

    state.persist(pending).await;
    Ok(Json(view))
}
