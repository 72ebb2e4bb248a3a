//! Sequential semantic search
//!
//! Each step embeds its query, asks the geo index for candidates near the
//! current location, and draws one candidate from the softmax of their
//! similarities. The drawn location becomes the next step's origin and is
//! excluded from later steps.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::models::{
    NewPrompt, Prompt, ScoredLocation, SearchRequest, SearchState, SearchStep, UserId,
};
use wayfarer_providers::Embedder;
use wayfarer_store::{GeoIndex, GeoQuery, NegativeFilter, PromptStore};

use crate::softmax::sample_index;

/// Default cap on candidates considered per step
pub const DEFAULT_CANDIDATE_LIMIT: usize = 10;

/// Result of a successful sequence search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Prompt record written for this request
    pub prompt: Prompt,
    /// One chosen location per step, in step order
    pub locations: Vec<ScoredLocation>,
}

/// Picks one location per query, in sequence
#[derive(Clone)]
pub struct SequentialSearchEngine {
    embedder: Arc<dyn Embedder>,
    geo_index: Arc<dyn GeoIndex>,
    prompts: Arc<dyn PromptStore>,
    candidate_limit: usize,
}

impl SequentialSearchEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        geo_index: Arc<dyn GeoIndex>,
        prompts: Arc<dyn PromptStore>,
    ) -> Self {
        Self { embedder, geo_index, prompts, candidate_limit: DEFAULT_CANDIDATE_LIMIT }
    }

    /// Override how many candidates each step samples from
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit.max(1);
        self
    }

    /// Run the search with a freshly seeded generator
    pub async fn search_locations(
        &self,
        request: &SearchRequest,
        user: UserId,
    ) -> Result<SearchOutcome> {
        let mut rng = StdRng::from_os_rng();
        self.search_with_rng(request, user, &mut rng).await
    }

    /// Run the search drawing from `rng`
    ///
    /// Fails as a whole if any step finds no candidate; prompt-location rows
    /// written for earlier steps are kept.
    pub async fn search_with_rng<R: Rng + Send>(
        &self,
        request: &SearchRequest,
        user: UserId,
        rng: &mut R,
    ) -> Result<SearchOutcome> {
        request.validate()?;

        let prompt = self.prompts.create_prompt(&NewPrompt::from_request(user, request)).await?;
        tracing::info!(
            prompt_id = %prompt.prompt_id,
            user_id = %user,
            steps = request.steps.len(),
            "Starting sequence search"
        );

        let mut state = SearchState::new(request.start);
        let mut locations = Vec::with_capacity(request.steps.len());

        for (index, step) in request.steps.iter().enumerate() {
            let candidates = self.candidates(index, step, &state).await?;

            let scores: Vec<f64> = candidates.iter().map(|c| c.similarity).collect();
            let chosen = sample_index(&scores, rng)
                .and_then(|i| candidates.into_iter().nth(i))
                .ok_or_else(|| WayfarerError::NoLocationFound {
                    step: index,
                    query: step.query.clone(),
                })?;

            tracing::info!(
                prompt_id = %prompt.prompt_id,
                step = index,
                category = %step.category,
                candidates = scores.len(),
                chosen = %chosen.name,
                similarity = chosen.similarity,
                "Resolved search step"
            );

            state.advance(&chosen);

            if let Err(e) =
                self.prompts.link_location(prompt.prompt_id, step.category, chosen.id).await
            {
                tracing::warn!(
                    prompt_id = %prompt.prompt_id,
                    step = index,
                    error = %e,
                    "Failed to record prompt location"
                );
            }

            locations.push(chosen);
        }

        Ok(SearchOutcome { prompt, locations })
    }

    /// Candidates for one step, most similar first; errors if there are none
    async fn candidates(
        &self,
        index: usize,
        step: &SearchStep,
        state: &SearchState,
    ) -> Result<Vec<ScoredLocation>> {
        let mut texts = vec![step.query.as_str()];
        if let Some(negative) = &step.negative_query {
            texts.push(negative.as_str());
        }

        let mut embeddings = self.embedder.embed(&texts).await?.into_iter();
        let embedding = embeddings.next().ok_or_else(|| WayfarerError::EmbedderUnavailable {
            reason: format!("No embedding returned for '{}'", step.query),
            remediation: "Check the embedding model is loaded".to_string(),
        })?;

        let negative = match (&step.negative_query, embeddings.next()) {
            (Some(_), Some(embedding)) => Some(NegativeFilter {
                embedding,
                threshold: step.negative_similarity_threshold,
            }),
            (Some(text), None) => {
                return Err(WayfarerError::EmbedderUnavailable {
                    reason: format!("No embedding returned for '{}'", text),
                    remediation: "Check the embedding model is loaded".to_string(),
                });
            }
            (None, _) => None,
        };

        let query = GeoQuery {
            category: step.category,
            origin: state.current_location(),
            distance_threshold: step.distance_threshold,
            embedding,
            similarity_threshold: step.similarity_threshold,
            negative,
            excluded_names: state.excluded_names(),
            limit: self.candidate_limit,
        };

        let candidates = self.geo_index.nearest_similar(&query).await?;
        tracing::debug!(step = index, candidates = candidates.len(), "Geo index returned candidates");

        if candidates.is_empty() {
            return Err(WayfarerError::NoLocationFound { step: index, query: step.query.clone() });
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::models::{Category, Coordinate, LocationCandidate, LocationId};
    use wayfarer_providers::FixedEmbedder;
    use wayfarer_store::{MemoryGeoIndex, MemoryPromptStore};

    fn start() -> Coordinate {
        Coordinate::new(-37.81803, 144.9549)
    }

    fn location(id: i64, name: &str, lat: f64, lon: f64, embedding: Vec<f32>) -> LocationCandidate {
        LocationCandidate {
            id: LocationId(id),
            name: name.to_string(),
            coordinate: Coordinate::new(lat, lon),
            category: Category::Landmark,
            embedding,
        }
    }

    async fn engine_with(
        landmarks: Vec<LocationCandidate>,
    ) -> (SequentialSearchEngine, MemoryPromptStore) {
        let index = MemoryGeoIndex::new();
        index.upsert_locations(Category::Landmark, &landmarks).await.unwrap();
        let prompts = MemoryPromptStore::new();
        let embedder = FixedEmbedder::new(2)
            .with_vector("tower", vec![1.0, 0.0])
            .with_vector("garden", vec![0.0, 1.0]);

        let engine = SequentialSearchEngine::new(
            Arc::new(embedder),
            Arc::new(index),
            Arc::new(prompts.clone()),
        );
        (engine, prompts)
    }

    fn request(queries: &[&str]) -> SearchRequest {
        let queries: Vec<String> = queries.iter().map(|q| q.to_string()).collect();
        let categories = vec!["landmark".to_string(); queries.len()];
        SearchRequest::from_lists(start(), &queries, &categories, None, 500.0, 0.0, 1.0).unwrap()
    }

    #[tokio::test]
    async fn test_each_name_is_chosen_once() {
        let (engine, prompts) = engine_with(vec![
            location(1, "Tower A", -37.8175, 144.9552, vec![1.0, 0.1]),
            location(2, "Tower B", -37.8178, 144.9545, vec![1.0, 0.2]),
        ])
        .await;

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = engine
            .search_with_rng(&request(&["tower", "tower"]), UserId(1), &mut rng)
            .await
            .unwrap();

        assert_eq!(outcome.locations.len(), 2);
        assert_ne!(outcome.locations[0].name, outcome.locations[1].name);
        assert_eq!(prompts.location_links().len(), 2);
        assert_eq!(prompts.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_candidates_fail_whole_request() {
        let (engine, prompts) =
            engine_with(vec![location(1, "Tower A", -37.8175, 144.9552, vec![1.0, 0.0])]).await;

        let mut rng = StdRng::seed_from_u64(1);
        let result =
            engine.search_with_rng(&request(&["tower", "tower"]), UserId(1), &mut rng).await;

        match result {
            Err(WayfarerError::NoLocationFound { step, query }) => {
                assert_eq!(step, 1);
                assert_eq!(query, "tower");
            }
            other => panic!("Expected NoLocationFound, got {:?}", other.map(|o| o.locations)),
        }
        // The first step's join row stays
        assert_eq!(prompts.location_links().len(), 1);
    }

    #[tokio::test]
    async fn test_cursor_moves_to_chosen_location() {
        // Garden is 400m north of the start; Far Garden is 400m further north,
        // out of range from the start but within range of Garden.
        let (engine, _) = engine_with(vec![
            location(1, "Garden", -37.81443, 144.9549, vec![0.0, 1.0]),
            location(2, "Far Garden", -37.81083, 144.9549, vec![0.1, 1.0]),
        ])
        .await;

        let mut rng = StdRng::seed_from_u64(3);
        let outcome = engine
            .search_with_rng(&request(&["garden", "garden"]), UserId(1), &mut rng)
            .await
            .unwrap();

        let names: Vec<&str> = outcome.locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Garden", "Far Garden"]);
    }

    #[tokio::test]
    async fn test_negative_query_excludes_candidates() {
        let (engine, _) = engine_with(vec![
            location(1, "Tower Garden", -37.8175, 144.9552, vec![0.7, 0.7]),
            location(2, "Plain Tower", -37.8178, 144.9545, vec![1.0, 0.0]),
        ])
        .await;

        let queries = vec!["tower".to_string()];
        let categories = vec!["landmark".to_string()];
        let negatives = vec!["garden".to_string()];
        let request = SearchRequest::from_lists(
            start(),
            &queries,
            &categories,
            Some(negatives.as_slice()),
            500.0,
            0.0,
            0.5,
        )
        .unwrap();

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = engine.search_with_rng(&request, UserId(1), &mut rng).await.unwrap();
            assert_eq!(outcome.locations[0].name, "Plain Tower");
        }
    }

    #[tokio::test]
    async fn test_invalid_request_writes_no_prompt() {
        let (engine, prompts) = engine_with(Vec::new()).await;
        let mut request = request(&["tower"]);
        request.steps[0].distance_threshold = -1.0;

        let result = engine.search_locations(&request, UserId(1)).await;
        assert!(matches!(result, Err(WayfarerError::InvalidQuery { .. })));
        assert!(prompts.prompts().is_empty());
    }
}
