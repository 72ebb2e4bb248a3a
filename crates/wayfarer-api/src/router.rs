use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Search
        .route("/api/v1/search/sequence", post(handlers::search_sequence))
        .route("/api/v1/search/route", post(handlers::search_route))

        // Routes
        .route("/api/v1/routes/{route_id}", get(handlers::get_route))
        .route("/api/v1/routes/{route_id}/publish", post(handlers::publish_route))

        // Feed and votes
        .route("/api/v1/feed/top", get(handlers::top_routes))
        .route("/api/v1/votes", post(handlers::vote))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
