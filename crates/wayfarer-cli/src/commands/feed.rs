use crate::cli::{FeedArgs, FeedCommand, TopArgs};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tabled::Tabled;
use wayfarer_core::config::LayeredConfig;
use wayfarer_core::models::{RouteSummary, UserId};
use wayfarer_feed::{FeedRanker, VoteCache};
use wayfarer_store::RedisKeyValueStore;

use super::connect_postgres;

#[derive(Debug, Serialize, Tabled)]
struct FeedRow {
    rank: usize,
    route_id: i64,
    votes: i64,
    stops: String,
    created_at: String,
}

/// Execute feed maintenance commands
pub async fn execute(args: FeedArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let ranker = connect_ranker(config).await?;

    match args.command {
        FeedCommand::Cleanup => {
            let evicted = ranker.cleanup_expired().await.context("Failed to clean up the feed")?;
            output.success(format!("Evicted {} expired route(s)", evicted));
            Ok(())
        }
        FeedCommand::Top(top) => execute_top(&ranker, top, output).await,
    }
}

async fn execute_top(ranker: &FeedRanker, args: TopArgs, output: &OutputWriter) -> Result<()> {
    let page = ranker
        .fetch_top(&args.order_by, args.offset, args.limit, UserId(args.as_user))
        .await
        .context("Failed to read the feed")?;

    if output.is_json() {
        return output.result(page);
    }
    output.table(feed_rows(&page, args.offset))
}

async fn connect_ranker(config: &LayeredConfig) -> Result<FeedRanker> {
    let redis_url = std::env::var("REDIS_URL").context("REDIS_URL must be set to reach the feed")?;
    let kv = Arc::new(
        RedisKeyValueStore::connect(&redis_url).await.context("Failed to connect to Redis")?,
    );
    let store = connect_postgres().await?;

    let summaries =
        VoteCache::from_settings(kv.clone(), store.clone(), store.clone(), &config.cache_settings());
    Ok(FeedRanker::new(kv, store.clone(), store, summaries, config.feed_settings()))
}

fn feed_rows(page: &[RouteSummary], offset: usize) -> Vec<FeedRow> {
    page.iter()
        .enumerate()
        .map(|(i, summary)| FeedRow {
            rank: offset + i + 1,
            route_id: summary.route.route_id.0,
            votes: summary.num_votes,
            stops: summary.route.locations.join(" → "),
            created_at: summary.route.created_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect()
}
