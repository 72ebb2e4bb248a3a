mod request;
mod response;

pub use request::{FeedQuery, RouteSearchRequest, SequenceSearchRequest, VoteRequest};
pub use response::{
    HealthResponse, LocationResult, PlannedRouteResponse, PublishResponse, SequenceSearchResponse,
    VoteResponse,
};
