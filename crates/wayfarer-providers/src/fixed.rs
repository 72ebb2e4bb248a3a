//! Deterministic embedder for tests and offline development

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use wayfarer_core::error::Result;

use crate::ports::Embedder;

/// Embedder with a table of known vectors
///
/// Texts in the table embed to their registered vector. Any other text embeds
/// to a pseudo-random vector seeded from the text, so repeated calls agree.
#[derive(Debug, Clone)]
pub struct FixedEmbedder {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl FixedEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, vectors: HashMap::new() }
    }

    /// Register the vector returned for `text`
    ///
    /// The vector is resized to the embedder's dimensions, padding with zeros.
    pub fn with_vector(mut self, text: impl Into<String>, mut vector: Vec<f32>) -> Self {
        vector.resize(self.dimensions, 0.0);
        self.vectors.insert(text.into(), vector);
        self
    }

    fn seeded_vector(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());
        (0..self.dimensions).map(|_| rng.random_range(-1.0..1.0)).collect()
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| match self.vectors.get(*text) {
                Some(vector) => vector.clone(),
                None => self.seeded_vector(text),
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}
