use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::club::repository::ClubRepository;
use crate::config::AppConfig;
use crate::stats::{StatsError, StatsRepository};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub club_repository: Arc<dyn ClubRepository>,
    pub stats_repository: Arc<dyn StatsRepository>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        club_repository: Arc<dyn ClubRepository>,
        stats_repository: Arc<dyn StatsRepository>,
        config: AppConfig,
    ) -> Self {
        Self {
            club_repository,
            stats_repository,
            config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::TeamNotFound(_) | StatsError::UserNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            StatsError::Repository(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
