use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_id_middleware))
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/interpret-mood", post(handlers::interpret_mood))
        .route("/search", post(handlers::search))
        // Titles
        .route("/movie/:id", get(handlers::movie_details))
        .route("/movie/:id/availability", get(handlers::movie_availability))
        .route("/tv/:id", get(handlers::tv_details))
        .route("/tv/:id/availability", get(handlers::tv_availability))
        // Feedback
        .route("/feedback", post(handlers::create_feedback))
        .route("/feedback/liked", get(handlers::liked_content))
        .route("/feedback/content/:content_id", get(handlers::content_feedback))
        .route("/feedback/:id", delete(handlers::delete_feedback))
}
