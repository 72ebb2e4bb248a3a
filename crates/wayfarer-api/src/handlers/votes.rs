use std::sync::Arc;

use axum::{extract::State, Json};
use wayfarer_core::models::{RouteId, VoteDirection};

use crate::auth::CurrentUser;
use crate::dto::{VoteRequest, VoteResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/votes - Vote for a route, or withdraw a vote
pub async fn vote(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let route_id = RouteId(body.route_id);
    state.voting.vote(route_id, user, VoteDirection::from(body.vote)).await?;
    Ok(Json(VoteResponse { route_id, vote: body.vote }))
}
