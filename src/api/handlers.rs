use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::{CurrentUser, RequestId},
    models::{Comparison, Content, ContentId, RankingEntry, WatchedItem, Winner},
};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct MarkWatchedRequest {
    pub content_id: ContentId,
    /// Defaults to the time the request is handled
    #[serde(default)]
    pub watched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitComparisonRequest {
    pub content_id_a: ContentId,
    pub content_id_b: ContentId,
    pub winner: Winner,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// List the catalog
pub async fn list_content(State(state): State<AppState>) -> AppResult<Json<Vec<Content>>> {
    let contents = state.ranking.catalog_contents().await?;
    Ok(Json(contents))
}

/// Look up a catalog entry
pub async fn get_content(
    State(state): State<AppState>,
    path: Result<Path<ContentId>, PathRejection>,
) -> AppResult<Json<Content>> {
    let Path(content_id) = path?;

    state
        .ranking
        .content(content_id)
        .await?
        .map(Json)
        .ok_or(AppError::ContentNotFound(content_id))
}

/// Mark content as watched by the current user
pub async fn mark_watched(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    CurrentUser(user_id): CurrentUser,
    body: Result<Json<MarkWatchedRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<WatchedItem>)> {
    let Json(request) = body?;
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        content_id = %request.content_id,
        "Processing mark watched request"
    );

    let watched_at = request.watched_at.unwrap_or_else(Utc::now);
    let item = state
        .ranking
        .mark_watched(user_id, request.content_id, watched_at)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// List the current user's watched content, most recent first
pub async fn list_watched(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Json<Vec<WatchedItem>> {
    Json(state.ranking.watched(user_id))
}

/// Suggest already watched content to compare against `content_id`
pub async fn get_candidates(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    path: Result<Path<ContentId>, PathRejection>,
) -> AppResult<Json<Vec<ContentId>>> {
    let Path(content_id) = path?;
    let candidates = state.ranking.get_comparison_candidates(user_id, content_id)?;
    Ok(Json(candidates))
}

/// Comparisons involving `content_id`, oldest first
pub async fn get_history(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    path: Result<Path<ContentId>, PathRejection>,
) -> AppResult<Json<Vec<Comparison>>> {
    let Path(content_id) = path?;
    let history = state.ranking.history(user_id, content_id)?;
    Ok(Json(history))
}

/// Record which of two watched items the current user prefers
pub async fn submit_comparison(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    CurrentUser(user_id): CurrentUser,
    body: Result<Json<SubmitComparisonRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Comparison>)> {
    let Json(request) = body?;
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        content_id_a = %request.content_id_a,
        content_id_b = %request.content_id_b,
        "Processing comparison"
    );

    let comparison = state.ranking.submit_comparison(
        user_id,
        request.content_id_a,
        request.content_id_b,
        request.winner,
    )?;

    Ok((StatusCode::CREATED, Json(comparison)))
}

/// The current user's ranking, best first
pub async fn get_ranking(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Json<Vec<RankingEntry>> {
    Json(state.ranking.get_ranking(user_id))
}
