//! Wayfarer Search - Sequential semantic search and route planning
//!
//! The search engine resolves one location per query, moving a cursor from
//! the starting point through each chosen location. The route assembler
//! turns the chosen locations into directions, and the planner ties both to
//! the prompt and route stores.

pub mod assembler;
pub mod engine;
pub mod planner;
pub mod softmax;

pub use assembler::RouteAssembler;
pub use engine::{SearchOutcome, SequentialSearchEngine};
pub use planner::{PlannedRoute, RoutePlanner};
pub use softmax::{sample_index, softmax};
