use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/content", get(handlers::list_content))
        .route("/content/:content_id", get(handlers::get_content))
        // Watched content
        .route(
            "/user/watched",
            get(handlers::list_watched).post(handlers::mark_watched),
        )
        .route(
            "/user/watched/:content_id/candidates",
            get(handlers::get_candidates),
        )
        .route(
            "/user/watched/:content_id/history",
            get(handlers::get_history),
        )
        // Ranking
        .route("/user/comparisons", post(handlers::submit_comparison))
        .route("/user/ranking", get(handlers::get_ranking))
}
