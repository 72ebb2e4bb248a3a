use std::sync::Arc;
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::models::{RouteId, UserId, VoteDirection};
use wayfarer_store::{RouteStore, VoteStore};

use crate::cache::VoteCache;

/// Records votes and keeps the vote cache in step with them
///
/// Votes change the live tally only. Published feed scores are left alone
/// until the owner republishes.
#[derive(Clone)]
pub struct VoteService {
    routes: Arc<dyn RouteStore>,
    votes: Arc<dyn VoteStore>,
    cache: VoteCache,
}

impl VoteService {
    pub fn new(routes: Arc<dyn RouteStore>, votes: Arc<dyn VoteStore>, cache: VoteCache) -> Self {
        Self { routes, votes, cache }
    }

    /// Upvote or withdraw a vote on a route
    pub async fn vote(&self, route_id: RouteId, user: UserId, direction: VoteDirection) -> Result<()> {
        if self.routes.get_route(route_id).await?.is_none() {
            return Err(WayfarerError::RouteNotFound { route_id });
        }

        match direction {
            VoteDirection::Up => {
                self.votes.add_vote(route_id, user).await?;
            }
            VoteDirection::Down => self.votes.remove_vote(route_id, user).await?,
        }

        tracing::info!(route_id = %route_id, user_id = %user, direction = ?direction, "Recorded vote");

        self.cache.invalidate(route_id).await;
        Ok(())
    }
}
