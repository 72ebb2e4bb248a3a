pub mod location;
pub mod route;
pub mod search;
pub mod timestamp;
pub mod vote;

pub use location::{Category, CategoryTables, Coordinate, LocationCandidate, LocationId, ScoredLocation};
pub use route::{NewRoute, Route, RouteDetail, RouteId, RouteSummary, UserId};
pub use search::{
    NewPrompt, Prompt, PromptId, SearchRequest, SearchState, SearchStep, TravelProfile,
    MAX_SEARCH_STEPS,
};
pub use vote::{Vote, VoteDirection};
