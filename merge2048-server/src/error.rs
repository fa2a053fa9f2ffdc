//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use merge2048_core::{EngineError, GameStatus};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("game is over ({0:?}); start a new game")]
    GameFinished(GameStatus),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Engine(_) => StatusCode::BAD_REQUEST,
            ApiError::GameFinished(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
