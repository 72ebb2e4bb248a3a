use async_trait::async_trait;
use std::time::Duration;
use wayfarer_core::error::Result;
use wayfarer_core::models::{
    Category, Coordinate, LocationCandidate, LocationId, NewPrompt, NewRoute, Prompt, PromptId,
    Route, RouteId, ScoredLocation, UserId, Vote,
};

/// Exclusion applied when a step carries a negative query
#[derive(Debug, Clone, PartialEq)]
pub struct NegativeFilter {
    pub embedding: Vec<f32>,
    /// Candidates must score strictly below this similarity
    pub threshold: f64,
}

/// One geo-similarity lookup against a category's locations
#[derive(Debug, Clone, PartialEq)]
pub struct GeoQuery {
    pub category: Category,
    pub origin: Coordinate,
    /// Maximum geodesic distance from `origin`, in meters (inclusive)
    pub distance_threshold: f64,
    pub embedding: Vec<f32>,
    /// Candidates must score strictly above this similarity
    pub similarity_threshold: f64,
    pub negative: Option<NegativeFilter>,
    pub excluded_names: Vec<String>,
    pub limit: usize,
}

/// Port for the per-category geo-similarity index
#[async_trait]
pub trait GeoIndex: Send + Sync {
    /// Locations within range and above threshold, most similar first
    async fn nearest_similar(&self, query: &GeoQuery) -> Result<Vec<ScoredLocation>>;

    /// Insert or replace locations in a category; returns the number written
    async fn upsert_locations(
        &self,
        category: Category,
        locations: &[LocationCandidate],
    ) -> Result<usize>;

    /// Number of locations stored for a category
    async fn count_locations(&self, category: Category) -> Result<usize>;
}

/// Port for prompt records and their analytics join rows
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Persist a prompt before its search runs
    async fn create_prompt(&self, prompt: &NewPrompt) -> Result<Prompt>;

    /// Record which location a prompt step resolved to
    async fn link_location(
        &self,
        prompt_id: PromptId,
        category: Category,
        location_id: LocationId,
    ) -> Result<()>;

    /// Record the route produced for a prompt
    async fn link_route(&self, prompt_id: PromptId, route_id: RouteId) -> Result<()>;
}

/// Port for the authoritative route store
#[async_trait]
pub trait RouteStore: Send + Sync {
    /// Persist a new route and assign its id
    async fn create_route(&self, route: NewRoute) -> Result<Route>;

    /// Retrieve a route by ID
    async fn get_route(&self, id: RouteId) -> Result<Option<Route>>;

    /// Image name attached to a route, if any
    async fn route_image(&self, id: RouteId) -> Result<Option<String>>;
}

/// Port for the authoritative vote store
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Record a vote; fails with `AlreadyVoted` if the user already voted
    async fn add_vote(&self, route_id: RouteId, user_id: UserId) -> Result<Vote>;

    /// Remove a vote; fails with `VoteNotFound` if there is none
    async fn remove_vote(&self, route_id: RouteId, user_id: UserId) -> Result<()>;

    /// Number of votes currently recorded for a route
    async fn count_votes(&self, route_id: RouteId) -> Result<i64>;

    /// Whether the user has a vote recorded for the route
    async fn has_voted(&self, route_id: RouteId, user_id: UserId) -> Result<bool>;
}

/// Port for the shared key-value store backing caches and ranked sets
///
/// Every operation is atomic on a single key. Failures are reported as
/// `WayfarerError::Cache` so callers can retry them.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Set a value that expires after `ttl`
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Delete keys; returns how many existed
    async fn delete(&self, keys: &[String]) -> Result<usize>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Set a TTL on an existing key
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Insert or update a sorted-set member's score
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()>;

    /// Add `delta` to a member's score, creating it at `delta` if absent
    async fn zincrby(&self, key: &str, member: &str, delta: f64) -> Result<f64>;

    /// Members by descending score, skipping `offset` and taking at most `limit`
    async fn zrevrange(&self, key: &str, offset: usize, limit: usize) -> Result<Vec<String>>;

    /// All members of a sorted set, in no particular order
    async fn zmembers(&self, key: &str) -> Result<Vec<String>>;

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>>;

    /// Remove members; returns how many were present
    async fn zrem(&self, key: &str, members: &[String]) -> Result<usize>;
}
