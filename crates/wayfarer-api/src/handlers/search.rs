use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use wayfarer_core::models::RouteDetail;

use crate::auth::CurrentUser;
use crate::dto::{
    LocationResult, PlannedRouteResponse, RouteSearchRequest, SequenceSearchRequest,
    SequenceSearchResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/search/sequence - Pick one location per query
pub async fn search_sequence(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<SequenceSearchRequest>,
) -> Result<Json<SequenceSearchResponse>, ApiError> {
    tracing::info!(user_id = %user, steps = body.query.len(), "Processing sequence search");

    let request = body.to_search_request(&state.search_defaults)?;
    let outcome = state.engine.search_locations(&request, user).await?;

    Ok(Json(SequenceSearchResponse {
        prompt_id: outcome.prompt.prompt_id,
        locations: outcome.locations.iter().map(LocationResult::from).collect(),
    }))
}

/// POST /api/v1/search/route - Pick locations and persist a route through them
pub async fn search_route(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<RouteSearchRequest>,
) -> Result<(StatusCode, Json<PlannedRouteResponse>), ApiError> {
    let profile = body.profile.unwrap_or(state.search_defaults.travel_profile);
    tracing::info!(
        user_id = %user,
        steps = body.search.query.len(),
        profile = %profile,
        "Processing route search"
    );

    let request = body.search.to_search_request(&state.search_defaults)?;
    let planned = state.planner.search_sequence(&request, profile, user).await?;

    let response = PlannedRouteResponse {
        prompt_id: planned.prompt_id,
        stops: planned.locations.iter().map(LocationResult::from).collect(),
        route: RouteDetail::from_route(planned.route, None),
    };
    Ok((StatusCode::CREATED, Json(response)))
}
