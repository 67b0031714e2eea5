//! Composition root: concrete stores and providers are built here and handed
//! to the pipeline as trait objects.

use anyhow::{Context, Result};
use ragport_config::{ConfigLoader, EmbeddingSettings, GraphConfig, ImportConfig};
use ragport_core::EmbeddingProvider;
use ragport_surrealdb::{SurrealConfig, SurrealGraphStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::StoreArgs;

pub fn load_config(path: Option<&Path>) -> Result<ImportConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = path {
        loader = loader.with_file(path);
    }
    loader.load().context("Failed to load configuration")
}

/// Apply `--uri` and `--database` on top of the loaded graph settings.
pub fn apply_store_args(graph: &mut GraphConfig, args: &StoreArgs) {
    if let Some(uri) = &args.uri {
        graph.uri = uri.clone();
    }
    if let Some(database) = &args.database {
        graph.database = database.clone();
    }
}

pub async fn create_store(graph: &GraphConfig) -> Result<Arc<SurrealGraphStore>> {
    let config = SurrealConfig::from(graph);
    debug!("Connecting to {:?}", config);
    if graph.is_in_memory() {
        info!("Using an in-memory store; nothing persists after exit");
    }
    let store = SurrealGraphStore::connect(config)
        .await
        .with_context(|| format!("Failed to connect to graph store at {}", graph.uri))?;
    Ok(Arc::new(store))
}

/// The configured embedder, or `None` when embedding is disabled.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Option<Arc<dyn EmbeddingProvider>>> {
    if !settings.enabled {
        return Ok(None);
    }
    let provider = ragport_embed::create_provider(settings)
        .context("Failed to create embedding provider")?;
    Ok(Some(provider))
}
