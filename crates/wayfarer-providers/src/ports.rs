//! Provider port definitions

use async_trait::async_trait;
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::models::{Coordinate, TravelProfile};

/// Port for embedding text into vector representations
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embeddings for a batch of texts
    ///
    /// # Returns
    /// Vector of embedding vectors, one per input text
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text]).await?.pop().ok_or_else(|| WayfarerError::EmbedderUnavailable {
            reason: format!("No embedding returned for '{}'", text),
            remediation: "Check the embedding model is loaded".to_string(),
        })
    }

    /// Get the dimensionality of embeddings produced by this embedder
    fn dimensions(&self) -> usize;

    /// Get the name/identifier of the embedding model
    fn model_name(&self) -> &str;
}

/// One leg of a route, between two consecutive waypoints
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Leg {
    /// Turn-by-turn instructions, in travel order
    pub instructions: Vec<String>,
}

/// Directions between an ordered list of waypoints
#[derive(Debug, Clone, PartialEq)]
pub struct Directions {
    pub geometry: Vec<Coordinate>,
    pub legs: Vec<Leg>,
    pub duration_secs: f64,
}

impl Directions {
    /// All instructions of all legs, flattened in order
    pub fn instructions(&self) -> Vec<String> {
        self.legs.iter().flat_map(|leg| leg.instructions.iter().cloned()).collect()
    }
}

/// Port for the external directions provider
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Route through `waypoints` in order; fails with `RoutingFailure`
    async fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<Directions>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}
