use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingFlavor {
    /// `POST {url}/embeddings` with a bearer token.
    #[default]
    #[serde(alias = "openai-compatible")]
    OpenAi,
    /// `POST {url}/openai/deployments/{deployment}/embeddings?api-version=...`
    /// with an `api-key` header.
    Azure,
}

/// One member of the round-robin endpoint pool.
///
/// The upper-case aliases accept the connection list format used by existing
/// Azure deployments (`AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY`).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingEndpoint {
    #[serde(alias = "AZURE_OPENAI_ENDPOINT")]
    pub url: String,
    #[serde(default, alias = "AZURE_OPENAI_API_KEY")]
    pub api_key: Option<String>,
    /// Azure deployment name, defaults to the model name.
    #[serde(default)]
    pub deployment: Option<String>,
    /// Overrides [`EmbeddingSettings::api_version`] for this endpoint.
    #[serde(default)]
    pub api_version: Option<String>,
}

impl EmbeddingEndpoint {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url: url.into(),
            api_key,
            deployment: None,
            api_version: None,
        }
    }
}

impl fmt::Debug for EmbeddingEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingEndpoint")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Embedding of entity descriptions during the entities stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub enabled: bool,
    pub flavor: EmbeddingFlavor,
    pub model: String,
    pub endpoints: Vec<EmbeddingEndpoint>,
    pub api_version: String,
    /// Texts per request.
    pub batch_size: usize,
    /// Expected vector length; responses of another length are rejected.
    pub dimensions: Option<usize>,
    pub timeout_secs: u64,
    /// Directory for the on-disk response cache. No caching when unset.
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            flavor: EmbeddingFlavor::OpenAi,
            model: default_model(),
            endpoints: Vec::new(),
            api_version: default_api_version(),
            batch_size: 16,
            dimensions: None,
            timeout_secs: 30,
            cache_dir: None,
        }
    }
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_api_version() -> String {
    "2024-10-21".to_string()
}

impl EmbeddingSettings {
    pub(crate) fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::required("embedding.model"));
        }
        if self.endpoints.is_empty() {
            return Err(ConfigError::invalid(
                "embedding.endpoints",
                "at least one endpoint is required when embedding is enabled",
            ));
        }
        if let Some(endpoint) = self.endpoints.iter().find(|e| e.url.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "embedding.endpoints",
                format!("endpoint url must not be empty ({endpoint:?})"),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("embedding.batch_size", "must be at least 1"));
        }
        if self.flavor == EmbeddingFlavor::Azure && self.api_version.trim().is_empty() {
            return Err(ConfigError::required("embedding.api_version"));
        }
        if self.dimensions == Some(0) {
            return Err(ConfigError::invalid("embedding.dimensions", "must be at least 1"));
        }
        Ok(())
    }
}
