//! Read-through caches over the route and vote stores
//!
//! Two key families share the key-value store:
//!
//! - `route_detail:{id}` holds the serialized [`RouteDetail`] for an hour and
//!   is never invalidated, since route details are immutable once written.
//! - `route_votes:{id}:{user}` holds a viewer's [`RouteSummary`] for a minute.
//!   Every key written for a route is recorded in `route_votes_keys:{id}` so
//!   a vote on that route can drop all of them at once.
//!
//! Key-value failures never fail a read; the value is computed fresh instead.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use wayfarer_core::config::CacheSettings;
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::models::{RouteDetail, RouteId, RouteSummary, UserId};
use wayfarer_store::{KeyValueStore, RouteStore, VoteStore};

use crate::retry::RetryPolicy;

pub fn detail_key(route_id: RouteId) -> String {
    format!("route_detail:{}", route_id)
}

pub fn summary_key(route_id: RouteId, user_id: UserId) -> String {
    format!("route_votes:{}:{}", route_id, user_id)
}

pub fn summary_index_key(route_id: RouteId) -> String {
    format!("route_votes_keys:{}", route_id)
}

/// Cached route details with a long TTL
#[derive(Clone)]
pub struct RouteDetailCache {
    kv: Arc<dyn KeyValueStore>,
    routes: Arc<dyn RouteStore>,
    ttl: Duration,
    retry: RetryPolicy,
}

impl RouteDetailCache {
    pub fn new(kv: Arc<dyn KeyValueStore>, routes: Arc<dyn RouteStore>, ttl: Duration) -> Self {
        Self { kv, routes, ttl, retry: RetryPolicy::default() }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Cached detail for a route, loading and caching it on a miss
    pub async fn get_or_load(&self, route_id: RouteId) -> Result<RouteDetail> {
        let key = detail_key(route_id);

        match self.retry.run("get", || self.kv.get(&key)).await {
            Ok(Some(json)) => match serde_json::from_str::<RouteDetail>(&json) {
                Ok(detail) => {
                    tracing::debug!(route_id = %route_id, "Route detail cache hit");
                    return Ok(detail);
                }
                Err(e) => {
                    tracing::warn!(route_id = %route_id, error = %e, "Discarding unreadable route detail");
                }
            },
            Ok(None) => tracing::debug!(route_id = %route_id, "Route detail cache miss"),
            Err(e) => {
                tracing::warn!(route_id = %route_id, error = %e, "Route detail cache read failed");
            }
        }

        let detail = self.load(route_id).await?;

        let json = serde_json::to_string(&detail)?;
        if let Err(e) = self.retry.run("set_ex", || self.kv.set_ex(&key, &json, self.ttl)).await {
            tracing::warn!(route_id = %route_id, error = %e, "Route detail cache write failed");
        }

        Ok(detail)
    }

    async fn load(&self, route_id: RouteId) -> Result<RouteDetail> {
        let route = self
            .routes
            .get_route(route_id)
            .await?
            .ok_or(WayfarerError::RouteNotFound { route_id })?;
        let image_name = self.routes.route_image(route_id).await?;
        Ok(RouteDetail::from_route(route, image_name))
    }
}

/// Per-viewer vote summaries with a short TTL
#[derive(Clone)]
pub struct VoteCache {
    kv: Arc<dyn KeyValueStore>,
    details: RouteDetailCache,
    votes: Arc<dyn VoteStore>,
    ttl: Duration,
    retry: RetryPolicy,
}

impl VoteCache {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        details: RouteDetailCache,
        votes: Arc<dyn VoteStore>,
        ttl: Duration,
    ) -> Self {
        Self { kv, details, votes, ttl, retry: RetryPolicy::default() }
    }

    /// Build both caches from one set of settings
    pub fn from_settings(
        kv: Arc<dyn KeyValueStore>,
        routes: Arc<dyn RouteStore>,
        votes: Arc<dyn VoteStore>,
        settings: &CacheSettings,
    ) -> Self {
        let details = RouteDetailCache::new(kv.clone(), routes, settings.detail_ttl);
        Self::new(kv, details, votes, settings.vote_ttl)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.details = self.details.with_retry(retry);
        self.retry = retry;
        self
    }

    pub fn details(&self) -> &RouteDetailCache {
        &self.details
    }

    /// Route detail with the live vote count and the viewer's own vote
    pub async fn summary(&self, route_id: RouteId, viewer: UserId) -> Result<RouteSummary> {
        let key = summary_key(route_id, viewer);

        match self.retry.run("get", || self.kv.get(&key)).await {
            Ok(Some(json)) => match serde_json::from_str::<RouteSummary>(&json) {
                Ok(summary) => return Ok(summary),
                Err(e) => {
                    tracing::warn!(route_id = %route_id, error = %e, "Discarding unreadable vote summary");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(route_id = %route_id, error = %e, "Vote cache read failed");
            }
        }

        let route = self.details.get_or_load(route_id).await?;
        let num_votes = self.votes.count_votes(route_id).await?;
        let voted_by_user = self.votes.has_voted(route_id, viewer).await?;
        let summary = RouteSummary { route, num_votes, voted_by_user };

        if let Err(e) = self.store(route_id, &key, &summary).await {
            tracing::warn!(route_id = %route_id, error = %e, "Vote cache write failed");
        }

        Ok(summary)
    }

    async fn store(&self, route_id: RouteId, key: &str, summary: &RouteSummary) -> Result<()> {
        let json = serde_json::to_string(summary)?;
        let index = summary_index_key(route_id);
        let stamp = Utc::now().timestamp() as f64;

        // Index first, so a key is never cached without being findable
        self.retry.run("zadd", || self.kv.zadd(&index, key, stamp)).await?;
        self.retry.run("expire", || self.kv.expire(&index, self.ttl)).await?;
        self.retry.run("set_ex", || self.kv.set_ex(key, &json, self.ttl)).await
    }

    /// Drop every cached summary for a route
    ///
    /// Failures are logged after retries and swallowed; the TTL bounds how
    /// long a stale summary can be served.
    pub async fn invalidate(&self, route_id: RouteId) {
        match self.try_invalidate(route_id).await {
            Ok(removed) => {
                tracing::debug!(route_id = %route_id, removed, "Invalidated vote summaries");
            }
            Err(e) => {
                tracing::error!(
                    route_id = %route_id,
                    error = %e,
                    "Failed to invalidate vote summaries; stale counts expire with the TTL"
                );
            }
        }
    }

    async fn try_invalidate(&self, route_id: RouteId) -> Result<usize> {
        let index = summary_index_key(route_id);
        let mut keys = self.retry.run("zmembers", || self.kv.zmembers(&index)).await?;
        keys.push(index);
        self.retry.run("delete", || self.kv.delete(&keys)).await
    }
}
