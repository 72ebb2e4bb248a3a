use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use wayfarer_core::error::Result;
use wayfarer_core::models::{PromptId, Route, ScoredLocation, SearchRequest, TravelProfile, UserId};
use wayfarer_store::{PromptStore, RouteStore};

use crate::assembler::RouteAssembler;
use crate::engine::SequentialSearchEngine;

/// A persisted route together with the search that produced it
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    pub prompt_id: PromptId,
    pub route: Route,
    pub locations: Vec<ScoredLocation>,
}

/// Search, assemble and persist a route in one call
#[derive(Clone)]
pub struct RoutePlanner {
    engine: SequentialSearchEngine,
    assembler: RouteAssembler,
    routes: Arc<dyn RouteStore>,
    prompts: Arc<dyn PromptStore>,
}

impl RoutePlanner {
    pub fn new(
        engine: SequentialSearchEngine,
        assembler: RouteAssembler,
        routes: Arc<dyn RouteStore>,
        prompts: Arc<dyn PromptStore>,
    ) -> Self {
        Self { engine, assembler, routes, prompts }
    }

    /// Run the sequence search and persist exactly one route for it
    pub async fn search_sequence(
        &self,
        request: &SearchRequest,
        profile: TravelProfile,
        user: UserId,
    ) -> Result<PlannedRoute> {
        let mut rng = StdRng::from_os_rng();
        self.search_sequence_with_rng(request, profile, user, &mut rng).await
    }

    /// Like [`search_sequence`](Self::search_sequence), drawing from `rng`
    ///
    /// Nothing is persisted unless every step resolves and directions succeed.
    pub async fn search_sequence_with_rng<R: Rng + Send>(
        &self,
        request: &SearchRequest,
        profile: TravelProfile,
        user: UserId,
        rng: &mut R,
    ) -> Result<PlannedRoute> {
        let outcome = self.engine.search_with_rng(request, user, rng).await?;

        let new_route =
            self.assembler.assemble_route(request.start, &outcome.locations, profile, user).await?;
        let route = self.routes.create_route(new_route).await?;

        tracing::info!(
            route_id = %route.route_id,
            prompt_id = %outcome.prompt.prompt_id,
            user_id = %user,
            stops = route.locations.len(),
            "Persisted planned route"
        );

        if let Err(e) = self.prompts.link_route(outcome.prompt.prompt_id, route.route_id).await {
            tracing::warn!(
                route_id = %route.route_id,
                prompt_id = %outcome.prompt.prompt_id,
                error = %e,
                "Failed to record prompt route"
            );
        }

        Ok(PlannedRoute { prompt_id: outcome.prompt.prompt_id, route, locations: outcome.locations })
    }
}
