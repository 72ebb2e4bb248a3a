//! Wayfarer Feed - Route caches, feed ranking and votes
//!
//! This crate layers the key-value store over the authoritative route and
//! vote stores: a detail cache, a per-viewer vote cache, the ranked feed
//! with lazily expiring publications, and the vote service that keeps the
//! vote cache honest.

pub mod cache;
pub mod ranking;
pub mod retry;
pub mod score;
pub mod votes;

pub use cache::{RouteDetailCache, VoteCache};
pub use ranking::{FeedOrder, FeedRanker};
pub use retry::RetryPolicy;
pub use votes::VoteService;
