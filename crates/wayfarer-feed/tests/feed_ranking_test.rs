//! Feed publication, eviction and ranking against in-memory stores

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use wayfarer_core::config::{CacheSettings, FeedSettings};
use wayfarer_core::models::{Coordinate, NewRoute, Route, RouteId, UserId, VoteDirection};
use wayfarer_core::WayfarerError;
use wayfarer_feed::ranking::{expiry_key, RANKED_BY_RECENCY_KEY, RANKED_BY_VOTES_KEY};
use wayfarer_feed::{FeedRanker, RetryPolicy, VoteCache, VoteService};
use wayfarer_store::{
    KeyValueStore, MemoryKeyValueStore, MemoryRouteStore, MemoryVoteStore, RouteStore, VoteStore,
};

const OWNER: UserId = UserId(1);
const VIEWER: UserId = UserId(100);

struct Feed {
    kv: MemoryKeyValueStore,
    votes: MemoryVoteStore,
    ranker: FeedRanker,
    voting: VoteService,
}

fn route(id: i64, created_at: DateTime<Utc>) -> Route {
    Route::from_new(
        RouteId(id),
        NewRoute {
            created_by: OWNER,
            locations: vec![format!("Stop {}", id)],
            location_coordinates: vec![Coordinate::new(-37.81, 144.96)],
            geometry: vec![Coordinate::new(-37.8180, 144.9549), Coordinate::new(-37.81, 144.96)],
            instructions: vec!["Head north-east".into()],
            duration_secs: 600.0,
        },
        created_at,
    )
}

fn feed(routes: Vec<Route>) -> Feed {
    let kv = MemoryKeyValueStore::new();
    let votes = MemoryVoteStore::new();
    let route_store = MemoryRouteStore::new();
    for route in routes {
        route_store.insert(route);
    }

    let kv_port: Arc<dyn KeyValueStore> = Arc::new(kv.clone());
    let route_port: Arc<dyn RouteStore> = Arc::new(route_store);
    let vote_port: Arc<dyn VoteStore> = Arc::new(votes.clone());

    let cache = VoteCache::from_settings(
        kv_port.clone(),
        route_port.clone(),
        vote_port.clone(),
        &CacheSettings::default(),
    )
    .with_retry(RetryPolicy::none());
    let ranker = FeedRanker::new(
        kv_port,
        route_port.clone(),
        vote_port.clone(),
        cache.clone(),
        FeedSettings::default(),
    )
    .with_retry(RetryPolicy::none());
    let voting = VoteService::new(route_port, vote_port, cache);

    Feed { kv, votes, ranker, voting }
}

fn ids(page: &[wayfarer_core::models::RouteSummary]) -> Vec<i64> {
    page.iter().map(|s| s.route.route_id.0).collect()
}

fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0).unwrap()
}

#[tokio::test]
async fn test_votes_outrank_recency() {
    let published_at = jan(10);
    let feed = feed(vec![route(1, published_at), route(2, published_at)]);

    for user in 10..15 {
        feed.votes.add_vote(RouteId(1), UserId(user)).await.unwrap();
    }
    feed.ranker.publish(RouteId(2), OWNER).await.unwrap();
    feed.ranker.publish(RouteId(1), OWNER).await.unwrap();

    let page = feed.ranker.fetch_top("num_votes", 0, 10, VIEWER).await.unwrap();
    assert_eq!(ids(&page), vec![1, 2]);
    assert_eq!(page[0].num_votes, 5);
    assert_eq!(page[1].num_votes, 0);
}

#[tokio::test]
async fn test_more_votes_beat_a_newer_route() {
    let feed = feed(vec![route(1, jan(1)), route(2, jan(30))]);
    feed.votes.add_vote(RouteId(1), UserId(7)).await.unwrap();

    feed.ranker.publish(RouteId(1), OWNER).await.unwrap();
    feed.ranker.publish(RouteId(2), OWNER).await.unwrap();

    let by_votes = feed.ranker.fetch_top("num_votes", 0, 10, VIEWER).await.unwrap();
    assert_eq!(ids(&by_votes), vec![1, 2]);

    let by_recency = feed.ranker.fetch_top("created_at", 0, 10, VIEWER).await.unwrap();
    assert_eq!(ids(&by_recency), vec![2, 1]);
}

#[tokio::test]
async fn test_publish_is_idempotent() {
    let feed = feed(vec![route(1, jan(5))]);

    feed.ranker.publish(RouteId(1), OWNER).await.unwrap();
    let first = feed.kv.zscore(RANKED_BY_VOTES_KEY, "1").await.unwrap();
    feed.ranker.publish(RouteId(1), OWNER).await.unwrap();

    assert_eq!(feed.kv.zmembers(RANKED_BY_VOTES_KEY).await.unwrap(), vec!["1".to_string()]);
    assert_eq!(feed.kv.zscore(RANKED_BY_VOTES_KEY, "1").await.unwrap(), first);
    assert!(feed.kv.exists(&expiry_key(RouteId(1))).await.unwrap());
}

#[tokio::test]
async fn test_republish_refreshes_vote_score() {
    let feed = feed(vec![route(1, jan(5))]);
    feed.ranker.publish(RouteId(1), OWNER).await.unwrap();
    let before = feed.kv.zscore(RANKED_BY_VOTES_KEY, "1").await.unwrap().unwrap();

    feed.voting.vote(RouteId(1), UserId(3), VoteDirection::Up).await.unwrap();
    // Voting alone leaves the ranked score untouched
    assert_eq!(feed.kv.zscore(RANKED_BY_VOTES_KEY, "1").await.unwrap(), Some(before));

    feed.ranker.publish(RouteId(1), OWNER).await.unwrap();
    let after = feed.kv.zscore(RANKED_BY_VOTES_KEY, "1").await.unwrap().unwrap();
    assert!((after - before - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_publish_requires_existing_owned_route() {
    let feed = feed(vec![route(1, jan(5))]);

    let missing = feed.ranker.publish(RouteId(2), OWNER).await;
    assert!(matches!(missing, Err(WayfarerError::RouteNotFound { .. })));

    let foreign = feed.ranker.publish(RouteId(1), UserId(2)).await;
    assert!(matches!(foreign, Err(WayfarerError::NotAuthorised { .. })));

    assert!(feed.kv.is_empty());
}

#[tokio::test]
async fn test_cleanup_evicts_exactly_the_expired_routes() {
    let feed = feed(vec![route(1, jan(1)), route(2, jan(2)), route(3, jan(3))]);
    for id in 1..=3 {
        feed.ranker.publish(RouteId(id), OWNER).await.unwrap();
    }

    // Simulate route 2's marker reaching its TTL
    feed.kv.delete(&[expiry_key(RouteId(2))]).await.unwrap();

    assert_eq!(feed.ranker.cleanup_expired().await.unwrap(), 1);
    for key in [RANKED_BY_VOTES_KEY, RANKED_BY_RECENCY_KEY] {
        let mut members = feed.kv.zmembers(key).await.unwrap();
        members.sort();
        assert_eq!(members, vec!["1".to_string(), "3".to_string()]);
    }

    assert_eq!(feed.ranker.cleanup_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_fetch_top_evicts_before_reading() {
    let feed = feed(vec![route(1, jan(1)), route(2, jan(2))]);
    feed.ranker.publish(RouteId(1), OWNER).await.unwrap();
    feed.ranker.publish(RouteId(2), OWNER).await.unwrap();
    feed.kv.delete(&[expiry_key(RouteId(2))]).await.unwrap();

    let page = feed.ranker.fetch_top("created_at", 0, 10, VIEWER).await.unwrap();
    assert_eq!(ids(&page), vec![1]);
}

#[tokio::test]
async fn test_invalid_order_leaves_ranked_sets_untouched() {
    let feed = feed(vec![route(1, jan(1))]);
    feed.ranker.publish(RouteId(1), OWNER).await.unwrap();
    feed.kv.delete(&[expiry_key(RouteId(1))]).await.unwrap();

    let result = feed.ranker.fetch_top("invalid", 0, 10, VIEWER).await;
    assert!(matches!(result, Err(WayfarerError::InvalidQuery { .. })));

    // No cleanup ran, so the expired route is still ranked
    assert_eq!(feed.kv.zmembers(RANKED_BY_VOTES_KEY).await.unwrap(), vec!["1".to_string()]);
}

#[tokio::test]
async fn test_page_limits() {
    let feed = feed(vec![route(1, jan(1)), route(2, jan(2)), route(3, jan(3))]);
    for id in 1..=3 {
        feed.ranker.publish(RouteId(id), OWNER).await.unwrap();
    }

    let page = feed.ranker.fetch_top("created_at", 1, 1, VIEWER).await.unwrap();
    assert_eq!(ids(&page), vec![2]);

    assert!(feed.ranker.fetch_top("created_at", 5, 10, VIEWER).await.unwrap().is_empty());

    for limit in [0, 51] {
        let result = feed.ranker.fetch_top("created_at", 0, limit, VIEWER).await;
        assert!(matches!(result, Err(WayfarerError::ParametersTooLarge { .. })));
    }
}

#[tokio::test]
async fn test_feed_reflects_votes_after_invalidation() {
    let feed = feed(vec![route(1, jan(1))]);
    feed.ranker.publish(RouteId(1), OWNER).await.unwrap();

    let page = feed.ranker.fetch_top("num_votes", 0, 10, VIEWER).await.unwrap();
    assert_eq!(page[0].num_votes, 0);
    assert!(!page[0].voted_by_user);

    feed.voting.vote(RouteId(1), VIEWER, VoteDirection::Up).await.unwrap();

    let page = feed.ranker.fetch_top("num_votes", 0, 10, VIEWER).await.unwrap();
    assert_eq!(page[0].num_votes, 1);
    assert!(page[0].voted_by_user);
}

#[tokio::test]
async fn test_missing_route_is_evicted_and_page_topped_up() {
    let feed = feed(vec![route(1, jan(1)), route(2, jan(2)), route(3, jan(3))]);
    for id in 1..=3 {
        feed.ranker.publish(RouteId(id), OWNER).await.unwrap();
    }

    // Route 99 is ranked first with a live marker, but its row is gone
    for key in [RANKED_BY_VOTES_KEY, RANKED_BY_RECENCY_KEY] {
        feed.kv.zadd(key, "99", f64::MAX).await.unwrap();
    }
    feed.kv
        .set_ex(&expiry_key(RouteId(99)), "1", std::time::Duration::from_secs(60))
        .await
        .unwrap();

    let page = feed.ranker.fetch_top("created_at", 0, 2, VIEWER).await.unwrap();
    assert_eq!(ids(&page), vec![3, 2]);

    for key in [RANKED_BY_VOTES_KEY, RANKED_BY_RECENCY_KEY] {
        let mut members = feed.kv.zmembers(key).await.unwrap();
        members.sort();
        assert_eq!(members, vec!["1".to_string(), "2".to_string(), "3".to_string()]);
    }

    let next = feed.ranker.fetch_top("created_at", 2, 2, VIEWER).await.unwrap();
    assert_eq!(ids(&next), vec![1]);
}
