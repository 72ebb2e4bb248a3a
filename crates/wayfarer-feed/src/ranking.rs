//! Ranked route feed
//!
//! A published route sits in two ranked sets, one per feed order, and owns an
//! expiry marker `feed:expiry:{id}` with a TTL. When the marker expires the
//! route is still ranked until the next cleanup, which runs before every
//! top-N read and evicts every route whose marker is gone.

use futures::future::join_all;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use wayfarer_core::config::FeedSettings;
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::models::{RouteId, RouteSummary, UserId};
use wayfarer_store::{KeyValueStore, RouteStore, VoteStore};

use crate::cache::VoteCache;
use crate::retry::RetryPolicy;
use crate::score::{recency_score, vote_score};

pub const RANKED_BY_VOTES_KEY: &str = "feed:ranked:num_votes";
pub const RANKED_BY_RECENCY_KEY: &str = "feed:ranked:created_at";

pub fn expiry_key(route_id: RouteId) -> String {
    format!("feed:expiry:{}", route_id)
}

/// Ordering of a top-N feed read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOrder {
    NumVotes,
    CreatedAt,
}

impl FeedOrder {
    pub const ALL: [FeedOrder; 2] = [FeedOrder::NumVotes, FeedOrder::CreatedAt];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedOrder::NumVotes => "num_votes",
            FeedOrder::CreatedAt => "created_at",
        }
    }

    /// Ranked set backing this order
    pub fn ranked_key(&self) -> &'static str {
        match self {
            FeedOrder::NumVotes => RANKED_BY_VOTES_KEY,
            FeedOrder::CreatedAt => RANKED_BY_RECENCY_KEY,
        }
    }
}

impl fmt::Display for FeedOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedOrder {
    type Err = WayfarerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "num_votes" => Ok(FeedOrder::NumVotes),
            "created_at" => Ok(FeedOrder::CreatedAt),
            other => Err(WayfarerError::invalid_query(format!(
                "order_by must be one of num_votes, created_at; got '{}'",
                other
            ))),
        }
    }
}

/// Publishes routes into the feed and serves ranked pages of it
#[derive(Clone)]
pub struct FeedRanker {
    kv: Arc<dyn KeyValueStore>,
    routes: Arc<dyn RouteStore>,
    votes: Arc<dyn VoteStore>,
    summaries: VoteCache,
    settings: FeedSettings,
    retry: RetryPolicy,
}

impl FeedRanker {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        routes: Arc<dyn RouteStore>,
        votes: Arc<dyn VoteStore>,
        summaries: VoteCache,
        settings: FeedSettings,
    ) -> Self {
        Self { kv, routes, votes, summaries, settings, retry: RetryPolicy::default() }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Publish a route owned by `owner`, or refresh an existing publication
    ///
    /// The score upsert and the expiry marker are written independently; a
    /// failure after retries surfaces as a cache error.
    pub async fn publish(&self, route_id: RouteId, owner: UserId) -> Result<()> {
        let route = self
            .routes
            .get_route(route_id)
            .await?
            .ok_or(WayfarerError::RouteNotFound { route_id })?;
        if route.created_by != owner {
            tracing::warn!(route_id = %route_id, user_id = %owner, "Refusing to publish another user's route");
            return Err(WayfarerError::NotAuthorised { route_id });
        }

        let num_votes = self.votes.count_votes(route_id).await?;
        let member = route_id.to_string();
        let by_votes = vote_score(num_votes, route.created_at);
        let by_recency = recency_score(route.created_at);

        self.retry
            .run("zadd", || self.kv.zadd(RANKED_BY_VOTES_KEY, &member, by_votes))
            .await?;
        self.retry
            .run("zadd", || self.kv.zadd(RANKED_BY_RECENCY_KEY, &member, by_recency))
            .await?;

        let marker = expiry_key(route_id);
        self.retry
            .run("set_ex", || self.kv.set_ex(&marker, "1", self.settings.expiry))
            .await?;

        tracing::info!(
            route_id = %route_id,
            user_id = %owner,
            num_votes,
            score = by_votes,
            expiry_secs = self.settings.expiry.as_secs(),
            "Published route"
        );
        Ok(())
    }

    /// Evict every ranked route whose expiry marker is gone
    ///
    /// Returns the number of routes evicted.
    pub async fn cleanup_expired(&self) -> Result<usize> {
        let mut ranked = BTreeSet::new();
        for order in FeedOrder::ALL {
            let members =
                self.retry.run("zmembers", || self.kv.zmembers(order.ranked_key())).await?;
            ranked.extend(members);
        }

        let mut expired = Vec::new();
        for member in ranked {
            let marker = match member.parse::<RouteId>() {
                Ok(route_id) => expiry_key(route_id),
                Err(_) => {
                    tracing::warn!(member = %member, "Evicting malformed feed member");
                    expired.push(member);
                    continue;
                }
            };
            if !self.retry.run("exists", || self.kv.exists(&marker)).await? {
                expired.push(member);
            }
        }

        if !expired.is_empty() {
            for order in FeedOrder::ALL {
                self.retry.run("zrem", || self.kv.zrem(order.ranked_key(), &expired)).await?;
            }
            tracing::info!(evicted = expired.len(), "Evicted expired feed routes");
        }

        Ok(expired.len())
    }

    /// One page of the feed, annotated for `viewer`
    ///
    /// `order_by` is checked before the ranked sets are touched. Ranked ids
    /// whose route can no longer be loaded are evicted from both sets, and the
    /// page is topped up from the ranks below them.
    pub async fn fetch_top(
        &self,
        order_by: &str,
        offset: usize,
        limit: usize,
        viewer: UserId,
    ) -> Result<Vec<RouteSummary>> {
        let order: FeedOrder = order_by.parse()?;
        if limit == 0 || limit > self.settings.max_page_limit {
            return Err(WayfarerError::ParametersTooLarge {
                reason: format!(
                    "limit must be between 1 and {}; got {}",
                    self.settings.max_page_limit, limit
                ),
            });
        }

        self.cleanup_expired().await?;

        let mut page = Vec::with_capacity(limit);
        loop {
            let wanted = limit - page.len();
            let start = offset.saturating_add(page.len());
            let members = self
                .retry
                .run("zrevrange", || self.kv.zrevrange(order.ranked_key(), start, wanted))
                .await?;
            let exhausted = members.len() < wanted;

            let (found, dangling) = self.resolve_members(members, viewer).await?;
            page.extend(found);

            self.evict(&dangling).await?;
            if dangling.is_empty() || exhausted {
                break;
            }
        }

        tracing::debug!(order_by = %order, offset, limit, returned = page.len(), "Served feed page");
        Ok(page)
    }

    /// Summaries for ranked members, in rank order, plus the members that no
    /// longer name a loadable route
    async fn resolve_members(
        &self,
        members: Vec<String>,
        viewer: UserId,
    ) -> Result<(Vec<RouteSummary>, Vec<String>)> {
        let mut dangling = Vec::new();
        let mut route_ids = Vec::with_capacity(members.len());
        for member in members {
            match member.parse::<RouteId>() {
                Ok(route_id) => route_ids.push((member, route_id)),
                Err(_) => dangling.push(member),
            }
        }

        let lookups =
            route_ids.iter().map(|(_, route_id)| self.summaries.summary(*route_id, viewer));
        let results = join_all(lookups).await;

        let mut found = Vec::with_capacity(results.len());
        for ((member, route_id), result) in route_ids.into_iter().zip(results) {
            match result {
                Ok(summary) => found.push(summary),
                Err(WayfarerError::RouteNotFound { .. }) => {
                    tracing::warn!(route_id = %route_id, "Ranked route no longer exists");
                    dangling.push(member);
                }
                Err(e) => return Err(e),
            }
        }
        Ok((found, dangling))
    }

    async fn evict(&self, members: &[String]) -> Result<()> {
        if members.is_empty() {
            return Ok(());
        }
        for order in FeedOrder::ALL {
            self.retry.run("zrem", || self.kv.zrem(order.ranked_key(), members)).await?;
        }
        tracing::info!(evicted = members.len(), "Evicted dangling feed routes");
        Ok(())
    }
}
