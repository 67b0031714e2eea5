//! On-disk embedding cache.
//!
//! Each embedding is stored as a JSON file named by the SHA-256 of the
//! model name and the input text. Only misses reach the inner provider,
//! and failed requests are never cached.

use async_trait::async_trait;
use ragport_core::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CachedProvider {
    inner: Arc<dyn EmbeddingProvider>,
    dir: PathBuf,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for `text` under the inner provider's model.
    pub fn key(&self, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.inner.model_name().as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(&key[..2]).join(format!("{key}.json"))
    }

    async fn read(&self, key: &str) -> Option<EmbeddingResponse> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!("Ignoring corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn write(&self, key: &str, response: &EmbeddingResponse) -> EmbeddingResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EmbeddingError::Cache(format!("{}: {e}", parent.display())))?;
        }
        let bytes = serde_json::to_vec(response)
            .map_err(|e| EmbeddingError::Cache(format!("Failed to encode entry: {e}")))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| EmbeddingError::Cache(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl EmbeddingProvider for CachedProvider {
    async fn embed_batch(&self, texts: Vec<String>) -> EmbeddingResult<Vec<EmbeddingResponse>> {
        let keys: Vec<String> = texts.iter().map(|t| self.key(t)).collect();

        let mut results: Vec<Option<EmbeddingResponse>> = Vec::with_capacity(texts.len());
        for key in &keys {
            results.push(self.read(key).await);
        }

        let missing: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, hit)| hit.is_none())
            .map(|(i, _)| i)
            .collect();
        debug!(
            "Embedding cache: {} hits, {} misses",
            texts.len() - missing.len(),
            missing.len()
        );

        if !missing.is_empty() {
            let request: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let fetched = self.inner.embed_batch(request).await?;
            if fetched.len() != missing.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    missing.len(),
                    fetched.len()
                )));
            }
            for (i, response) in missing.into_iter().zip(fetched) {
                self.write(&keys[i], &response).await?;
                results[i] = Some(response);
            }
        }

        results
            .into_iter()
            .map(|r| r.ok_or_else(|| EmbeddingError::Cache("missing cache entry".to_string())))
            .collect()
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn batch_size(&self) -> usize {
        self.inner.batch_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragport_core::test_support::MockEmbeddingProvider;

    #[tokio::test]
    async fn only_misses_reach_the_inner_provider() {
        let dir = tempfile::tempdir().unwrap();
        let inner = Arc::new(MockEmbeddingProvider::new(3));
        let cache = CachedProvider::new(inner.clone(), dir.path());

        let first = cache
            .embed_batch(vec!["alpha".to_string(), "beta".to_string()])
            .await
            .unwrap();
        let second = cache
            .embed_batch(vec!["beta".to_string(), "gamma".to_string(), "alpha".to_string()])
            .await
            .unwrap();

        let calls = inner.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], vec!["gamma".to_string()]);

        assert_eq!(second[0], first[1]);
        assert_eq!(second[2], first[0]);
        assert_eq!(second[1].embedding, inner.vector_for("gamma"));
    }

    #[tokio::test]
    async fn corrupt_entries_are_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let inner = Arc::new(MockEmbeddingProvider::new(3));
        let cache = CachedProvider::new(inner.clone(), dir.path());

        let key = cache.key("alpha");
        let path = dir.path().join(&key[..2]).join(format!("{key}.json"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        let result = cache.embed_batch(vec!["alpha".to_string()]).await.unwrap();
        assert_eq!(result[0].embedding, inner.vector_for("alpha"));
        assert_eq!(inner.calls().await.len(), 1);
    }

    #[test]
    fn keys_depend_on_model_and_text() {
        let cache = CachedProvider::new(Arc::new(MockEmbeddingProvider::new(1)), "/tmp/unused");
        assert_eq!(cache.key("a"), cache.key("a"));
        assert_ne!(cache.key("a"), cache.key("b"));
        assert_eq!(cache.key("a").len(), 64);
    }
}
