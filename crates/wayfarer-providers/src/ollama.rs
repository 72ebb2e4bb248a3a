use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wayfarer_core::error::{Result, WayfarerError};

use crate::ports::Embedder;

/// Ollama embedder implementation
pub struct OllamaEmbedder {
    /// Base URL for Ollama API (e.g., "http://localhost:11434")
    base_url: String,

    /// Model name to use for embeddings
    model: String,

    /// Embedding dimensions (model-specific)
    dimensions: usize,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions,
            client: reqwest::Client::new(),
        }
    }

    fn unreachable(&self, err: reqwest::Error) -> WayfarerError {
        WayfarerError::EmbedderUnavailable {
            reason: format!("Failed to connect to Ollama: {}", err),
            remediation: format!(
                "Ensure Ollama is running at {} and the model '{}' is available. \
                 Run 'ollama pull {}' to download the model.",
                self.base_url, self.model, self.model
            ),
        }
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let request = OllamaEmbedRequest { model: &self.model, prompt: text };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(WayfarerError::EmbedderUnavailable {
                reason: format!("Ollama API error ({}): {}", status, error_text),
                remediation: format!(
                    "Check that the model '{}' is available. Run 'ollama list' to see installed models.",
                    self.model
                ),
            });
        }

        let embed_response: OllamaEmbedResponse =
            response.json().await.map_err(|e| WayfarerError::EmbedderUnavailable {
                reason: format!("Failed to parse Ollama response: {}", e),
                remediation: "Check Ollama API compatibility".to_string(),
            })?;

        check_dimensions(embed_response.embedding, self.dimensions, &self.model)
    }
}

/// Reject vectors whose length disagrees with the configured dimensions
fn check_dimensions(embedding: Vec<f32>, expected: usize, model: &str) -> Result<Vec<f32>> {
    if embedding.len() != expected {
        return Err(WayfarerError::EmbedderUnavailable {
            reason: format!(
                "Model '{}' returned {} dimensions, expected {}",
                model,
                embedding.len(),
                expected
            ),
            remediation: "Set WAYFARER_EMBEDDER_DIM to match the model".to_string(),
        });
    }
    Ok(embedding)
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_text(text).await?);
        }
        tracing::debug!(model = %self.model, count = texts.len(), "Embedded texts");
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Request body for Ollama embeddings API
#[derive(Debug, Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response from Ollama embeddings API
#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_embedder_creation() {
        let embedder = OllamaEmbedder::new("http://localhost:11434", "all-minilm", 384);
        assert_eq!(embedder.model_name(), "all-minilm");
        assert_eq!(embedder.dimensions(), 384);
    }

    #[test]
    fn test_ollama_embedder_custom_url() {
        let embedder = OllamaEmbedder::new("http://custom:11434/", "test-model", 512);
        assert_eq!(embedder.base_url, "http://custom:11434");
        assert_eq!(embedder.model_name(), "test-model");
    }

    #[test]
    fn test_request_body_shape() {
        let body =
            serde_json::to_value(OllamaEmbedRequest { model: "all-minilm", prompt: "museum" })
                .unwrap();
        assert_eq!(body, serde_json::json!({"model": "all-minilm", "prompt": "museum"}));
    }

    #[test]
    fn test_dimension_mismatch_is_reported() {
        assert!(check_dimensions(vec![0.0; 384], 384, "all-minilm").is_ok());
        assert!(matches!(
            check_dimensions(vec![0.0; 768], 384, "all-minilm"),
            Err(WayfarerError::EmbedderUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_embedder_unavailable() {
        // Port 9 (discard) is closed on test hosts
        let embedder = OllamaEmbedder::new("http://127.0.0.1:9", "all-minilm", 384);
        let result = embedder.embed_one("museum").await;
        assert!(matches!(result, Err(WayfarerError::EmbedderUnavailable { .. })));
    }
}
