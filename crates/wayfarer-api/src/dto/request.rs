use serde::Deserialize;
use wayfarer_core::config::SearchDefaults;
use wayfarer_core::error::Result;
use wayfarer_core::models::{Coordinate, SearchRequest, TravelProfile};

/// Sequence search request body
///
/// `query`, `location_type` and `negative_query` are parallel lists, one
/// entry per step. Omitted thresholds fall back to the configured defaults.
#[derive(Debug, Deserialize)]
pub struct SequenceSearchRequest {
    pub query: Vec<String>,
    pub location_type: Vec<String>,
    #[serde(default)]
    pub negative_query: Option<Vec<String>>,
    pub longitude: f64,
    pub latitude: f64,
    pub distance_threshold: Option<f64>,
    pub similarity_threshold: Option<f64>,
    pub negative_similarity_threshold: Option<f64>,
}

impl SequenceSearchRequest {
    pub fn to_search_request(&self, defaults: &SearchDefaults) -> Result<SearchRequest> {
        SearchRequest::from_lists(
            Coordinate::new(self.latitude, self.longitude),
            &self.query,
            &self.location_type,
            self.negative_query.as_deref(),
            self.distance_threshold.unwrap_or(defaults.distance_threshold),
            self.similarity_threshold.unwrap_or(defaults.similarity_threshold),
            self.negative_similarity_threshold.unwrap_or(defaults.negative_similarity_threshold),
        )
    }
}

/// Route search request body
#[derive(Debug, Deserialize)]
pub struct RouteSearchRequest {
    #[serde(flatten)]
    pub search: SequenceSearchRequest,
    pub profile: Option<TravelProfile>,
}

/// Feed page query string
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_order_by")]
    pub order_by: String,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_order_by() -> String {
    "num_votes".to_string()
}

fn default_limit() -> usize {
    10
}

/// Vote request body; `vote: false` withdraws an existing vote
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub route_id: i64,
    pub vote: bool,
}
