use serde::Serialize;
use wayfarer_core::models::{Category, PromptId, RouteDetail, RouteId, ScoredLocation};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok", service: "wayfarer-api" }
    }
}

/// One chosen location in a search response
#[derive(Debug, Serialize)]
pub struct LocationResult {
    pub name: String,
    pub location_type: Category,
    pub latitude: f64,
    pub longitude: f64,
    pub similarity: f64,
}

impl From<&ScoredLocation> for LocationResult {
    fn from(location: &ScoredLocation) -> Self {
        Self {
            name: location.name.clone(),
            location_type: location.category,
            latitude: location.coordinate.latitude,
            longitude: location.coordinate.longitude,
            similarity: location.similarity,
        }
    }
}

/// Sequence search response
#[derive(Debug, Serialize)]
pub struct SequenceSearchResponse {
    pub prompt_id: PromptId,
    pub locations: Vec<LocationResult>,
}

/// Route search response: the persisted route plus how it was found
#[derive(Debug, Serialize)]
pub struct PlannedRouteResponse {
    pub prompt_id: PromptId,
    pub stops: Vec<LocationResult>,
    #[serde(flatten)]
    pub route: RouteDetail,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub route_id: RouteId,
    pub published: bool,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub route_id: RouteId,
    pub vote: bool,
}
