//! Rotation of requests across several embedding endpoints.
//!
//! Spreads load over deployments that each have their own rate limit.
//! Successive calls go to successive members, wrapping around.

use async_trait::async_trait;
use ragport_core::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

pub struct RoundRobinProvider {
    members: Vec<Arc<dyn EmbeddingProvider>>,
    next: AtomicUsize,
}

impl RoundRobinProvider {
    pub fn new(members: Vec<Arc<dyn EmbeddingProvider>>) -> EmbeddingResult<Self> {
        if members.is_empty() {
            return Err(EmbeddingError::Config(
                "round-robin pool needs at least one provider".to_string(),
            ));
        }
        Ok(Self {
            members,
            next: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn pick(&self) -> &Arc<dyn EmbeddingProvider> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.members.len();
        trace!("Round robin picked member {}", index);
        &self.members[index]
    }
}

#[async_trait]
impl EmbeddingProvider for RoundRobinProvider {
    async fn embed_batch(&self, texts: Vec<String>) -> EmbeddingResult<Vec<EmbeddingResponse>> {
        self.pick().embed_batch(texts).await
    }

    fn provider_name(&self) -> &str {
        "round-robin"
    }

    fn model_name(&self) -> &str {
        self.members[0].model_name()
    }

    fn batch_size(&self) -> usize {
        self.members[0].batch_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragport_core::test_support::MockEmbeddingProvider;

    #[tokio::test]
    async fn rotates_through_members_in_order() {
        let a = Arc::new(MockEmbeddingProvider::new(2));
        let b = Arc::new(MockEmbeddingProvider::new(2));
        let members: Vec<Arc<dyn EmbeddingProvider>> = vec![a.clone(), b.clone()];
        let pool = RoundRobinProvider::new(members).unwrap();

        for i in 0..5 {
            pool.embed_batch(vec![format!("text {i}")]).await.unwrap();
        }

        assert_eq!(a.calls().await.len(), 3);
        assert_eq!(b.calls().await.len(), 2);
        assert_eq!(a.calls().await[1], vec!["text 2".to_string()]);
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(RoundRobinProvider::new(Vec::new()).is_err());
    }
}
