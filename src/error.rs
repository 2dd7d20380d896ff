use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;

use crate::llm::LlmError;
use crate::store::StoreError;

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors raised by game operations, converted to HTTP responses at the edge.
#[derive(Debug, Error)]
pub enum GameError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    Validation(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Operation cannot be performed in the current room state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The generation capability failed.
    #[error("upstream generation failed: {0}")]
    Upstream(#[from] LlmError),
    /// Storage backend failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for GameError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            GameError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
            GameError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            GameError::InvalidState(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
            GameError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM"),
            GameError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE"),
        };

        let payload = Json(ErrorBody {
            error: code,
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
