use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use wayfarer_core::models::{RouteId, RouteSummary};

use crate::auth::CurrentUser;
use crate::dto::PublishResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/routes/{route_id} - Route detail with votes, as seen by the caller
pub async fn get_route(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(route_id): Path<i64>,
) -> Result<Json<RouteSummary>, ApiError> {
    let summary = state.summaries.summary(RouteId(route_id), user).await?;
    Ok(Json(summary))
}

/// POST /api/v1/routes/{route_id}/publish - Publish the caller's route to the feed
pub async fn publish_route(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(route_id): Path<i64>,
) -> Result<Json<PublishResponse>, ApiError> {
    let route_id = RouteId(route_id);
    state.feed.publish(route_id, user).await?;
    Ok(Json(PublishResponse { route_id, published: true }))
}
