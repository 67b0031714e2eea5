//! Embedding providers for entity descriptions.
//!
//! - [`HttpEmbeddingProvider`]: OpenAI-compatible or Azure OpenAI endpoint
//! - [`RoundRobinProvider`]: rotates requests across several providers
//! - [`CachedProvider`]: on-disk cache in front of any provider
//!
//! [`create_provider`] assembles the stack described by
//! [`EmbeddingSettings`](ragport_config::EmbeddingSettings).

pub mod cache;
pub mod http;
pub mod round_robin;

pub use cache::CachedProvider;
pub use http::HttpEmbeddingProvider;
pub use round_robin::RoundRobinProvider;

use ragport_config::EmbeddingSettings;
use ragport_core::{EmbeddingError, EmbeddingProvider, EmbeddingResult};
use std::sync::Arc;
use tracing::info;

/// Build the provider stack for `settings`: one HTTP client per endpoint,
/// pooled when there are several, cached when a cache directory is set.
pub fn create_provider(settings: &EmbeddingSettings) -> EmbeddingResult<Arc<dyn EmbeddingProvider>> {
    if settings.endpoints.is_empty() {
        return Err(EmbeddingError::Config(
            "no embedding endpoints configured".to_string(),
        ));
    }

    let mut members: Vec<Arc<dyn EmbeddingProvider>> = settings
        .endpoints
        .iter()
        .map(|endpoint| {
            HttpEmbeddingProvider::new(settings, endpoint)
                .map(|p| Arc::new(p) as Arc<dyn EmbeddingProvider>)
        })
        .collect::<EmbeddingResult<_>>()?;

    let provider: Arc<dyn EmbeddingProvider> = if members.len() == 1 {
        members.remove(0)
    } else {
        info!("Pooling {} embedding endpoints", members.len());
        Arc::new(RoundRobinProvider::new(members)?)
    };

    match &settings.cache_dir {
        Some(dir) => Ok(Arc::new(CachedProvider::new(provider, dir.clone()))),
        None => Ok(provider),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragport_config::EmbeddingEndpoint;

    #[test]
    fn requires_an_endpoint() {
        let settings = EmbeddingSettings::default();
        assert!(matches!(
            create_provider(&settings),
            Err(EmbeddingError::Config(_))
        ));
    }

    #[test]
    fn pools_multiple_endpoints() {
        let settings = EmbeddingSettings {
            enabled: true,
            endpoints: vec![
                EmbeddingEndpoint::new("https://one.example.test/v1", Some("k1".to_string())),
                EmbeddingEndpoint::new("https://two.example.test/v1", Some("k2".to_string())),
            ],
            ..Default::default()
        };
        let provider = create_provider(&settings).unwrap();
        assert_eq!(provider.provider_name(), "round-robin");
        assert_eq!(provider.model_name(), "text-embedding-3-small");
    }
}
