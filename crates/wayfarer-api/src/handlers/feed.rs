use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use wayfarer_core::models::RouteSummary;

use crate::auth::CurrentUser;
use crate::dto::FeedQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/feed/top - One page of the ranked feed
pub async fn top_routes(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<RouteSummary>>, ApiError> {
    let page = state.feed.fetch_top(&query.order_by, query.offset, query.limit, user).await?;
    Ok(Json(page))
}
