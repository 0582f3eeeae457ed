use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::{ContentId, UserId};

/// Failures of the ranking engine and its collaborators
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RankingError {
    #[error("Not found: content {content_id} for user {user_id}")]
    NotFound {
        user_id: UserId,
        content_id: ContentId,
    },

    #[error("Content {content_id} has not been watched by user {user_id}")]
    NotWatched {
        user_id: UserId,
        content_id: ContentId,
    },

    #[error("Invalid comparison: content {content_id} has not been watched by user {user_id}")]
    InvalidComparison {
        user_id: UserId,
        content_id: ContentId,
    },

    #[error("Cannot compare content {0} with itself")]
    SelfComparison(ContentId),

    #[error("Content catalog unavailable: {0}")]
    Unavailable(String),
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error("Content not found: {0}")]
    ContentNotFound(ContentId),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Ranking(err) => match err {
                RankingError::NotFound { .. } => StatusCode::NOT_FOUND,
                RankingError::NotWatched { .. } => StatusCode::CONFLICT,
                RankingError::InvalidComparison { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                RankingError::SelfComparison(_) => StatusCode::BAD_REQUEST,
                RankingError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::ContentNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
