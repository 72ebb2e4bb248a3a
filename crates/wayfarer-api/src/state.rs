use std::sync::Arc;
use wayfarer_core::config::{LayeredConfig, SearchDefaults};
use wayfarer_feed::{FeedRanker, VoteCache, VoteService};
use wayfarer_providers::{DirectionsProvider, Embedder};
use wayfarer_search::{RouteAssembler, RoutePlanner, SequentialSearchEngine};
use wayfarer_store::{
    GeoIndex, KeyValueStore, MemoryGeoIndex, MemoryKeyValueStore, MemoryPromptStore,
    MemoryRouteStore, MemoryVoteStore, PromptStore, RouteStore, VoteStore,
};

/// Storage and provider adapters the server runs on
#[derive(Clone)]
pub struct Backends {
    pub geo_index: Arc<dyn GeoIndex>,
    pub prompts: Arc<dyn PromptStore>,
    pub routes: Arc<dyn RouteStore>,
    pub votes: Arc<dyn VoteStore>,
    pub kv: Arc<dyn KeyValueStore>,
    pub embedder: Arc<dyn Embedder>,
    pub directions: Arc<dyn DirectionsProvider>,
}

impl Backends {
    /// In-memory stores around the given providers
    pub fn in_memory(embedder: Arc<dyn Embedder>, directions: Arc<dyn DirectionsProvider>) -> Self {
        Self {
            geo_index: Arc::new(MemoryGeoIndex::new()),
            prompts: Arc::new(MemoryPromptStore::new()),
            routes: Arc::new(MemoryRouteStore::new()),
            votes: Arc::new(MemoryVoteStore::new()),
            kv: Arc::new(MemoryKeyValueStore::new()),
            embedder,
            directions,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: SequentialSearchEngine,
    pub planner: RoutePlanner,
    pub summaries: VoteCache,
    pub feed: FeedRanker,
    pub voting: VoteService,
    pub search_defaults: SearchDefaults,
}

impl AppState {
    pub fn new(backends: Backends, config: &LayeredConfig) -> Self {
        let search_defaults = config.search_defaults();

        let engine = SequentialSearchEngine::new(
            backends.embedder,
            backends.geo_index,
            backends.prompts.clone(),
        )
        .with_candidate_limit(search_defaults.candidate_limit);
        let planner = RoutePlanner::new(
            engine.clone(),
            RouteAssembler::new(backends.directions),
            backends.routes.clone(),
            backends.prompts,
        );

        let summaries = VoteCache::from_settings(
            backends.kv.clone(),
            backends.routes.clone(),
            backends.votes.clone(),
            &config.cache_settings(),
        );
        let feed = FeedRanker::new(
            backends.kv,
            backends.routes.clone(),
            backends.votes.clone(),
            summaries.clone(),
            config.feed_settings(),
        );
        let voting = VoteService::new(backends.routes, backends.votes, summaries.clone());

        Self { engine, planner, summaries, feed, voting, search_defaults }
    }
}
