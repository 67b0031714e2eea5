//! Embedding provider seam.
//!
//! Entity descriptions are embedded by an external service before the entity
//! rows are written. The importer only depends on this trait; HTTP providers,
//! pooling and caching live in `ragport-embed`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EmbeddingResult;

/// A single embedding returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
    pub model: String,
}

impl EmbeddingResponse {
    pub fn new(embedding: Vec<f32>, model: impl Into<String>) -> Self {
        Self {
            embedding,
            model: model.into(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `texts`, returning one response per input in input order.
    async fn embed_batch(&self, texts: Vec<String>) -> EmbeddingResult<Vec<EmbeddingResponse>>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;

    /// Preferred number of texts per request.
    fn batch_size(&self) -> usize {
        16
    }
}
