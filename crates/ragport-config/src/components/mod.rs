//! Configuration sections.

mod embedding;
mod graph;
mod import;
mod source;

pub use embedding::{EmbeddingEndpoint, EmbeddingFlavor, EmbeddingSettings};
pub use graph::GraphConfig;
pub use import::{DuplicatePolicy, ImportSettings};
pub use source::SourceConfig;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Complete importer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub graph: GraphConfig,
    pub source: SourceConfig,
    pub import: ImportSettings,
    pub embedding: EmbeddingSettings,
}

impl ImportConfig {
    /// Check cross-field rules that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        self.graph.validate()?;
        self.import.validate()?;
        self.embedding.validate()?;
        Ok(())
    }
}

impl ConfigError {
    pub(crate) fn required(field: &str) -> Self {
        ConfigError::invalid(field, "must not be empty")
    }
}
