//! Layered configuration loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::components::{EmbeddingEndpoint, ImportConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::references::resolve_references;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "ragport.toml";
const DEFAULT_DOTENV_FILE: &str = ".env";

/// Builds an [`ImportConfig`] from file, `.env` and environment.
///
/// The process environment is read once at [`load`](Self::load) time unless
/// an explicit variable map is supplied with [`with_env`](Self::with_env).
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    dotenv: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this config file. Unlike the default file it must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn with_dotenv(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv = Some(path.into());
        self
    }

    /// Read variables from `vars` instead of the process environment.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn load(&self) -> ConfigResult<ImportConfig> {
        let vars = self.variables()?;
        let lookup = |name: &str| vars.get(name).cloned();

        let mut config = match self.config_file() {
            Some(path) => load_file(&path, &lookup)?,
            None => {
                debug!("No config file found, using defaults");
                ImportConfig::default()
            }
        };

        apply_env_overrides(&mut config, &lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn config_file(&self) -> Option<PathBuf> {
        match &self.file {
            Some(path) => Some(path.clone()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        }
    }

    /// Environment variables with `.env` entries filling the gaps.
    fn variables(&self) -> ConfigResult<HashMap<String, String>> {
        let mut vars = match &self.env {
            Some(vars) => vars.clone(),
            None => std::env::vars().collect(),
        };

        let dotenv = self
            .dotenv
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOTENV_FILE));
        if dotenv.exists() {
            debug!("Loading {}", dotenv.display());
            let entries = dotenvy::from_path_iter(&dotenv).map_err(|e| ConfigError::Dotenv {
                path: dotenv.clone(),
                message: e.to_string(),
            })?;
            for entry in entries {
                let (key, value) = entry.map_err(|e| ConfigError::Dotenv {
                    path: dotenv.clone(),
                    message: e.to_string(),
                })?;
                vars.entry(key).or_insert(value);
            }
        }

        Ok(vars)
    }
}

fn load_file(path: &Path, lookup: &dyn Fn(&str) -> Option<String>) -> ConfigResult<ImportConfig> {
    info!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table: toml::Table = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut value = toml::Value::Table(table);

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_references(&mut value, base_dir, lookup).map_err(|mut errors| {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            ConfigError::Multiple(errors)
        }
    })?;

    value.try_into().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn parse_var<T>(var: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidOverride {
        var: var.to_string(),
        message: e.to_string(),
    })
}

/// Apply `RAGPORT_*` variables on top of the file values.
fn apply_env_overrides(
    config: &mut ImportConfig,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> ConfigResult<()> {
    if let Some(uri) = lookup("RAGPORT_GRAPH_URI") {
        config.graph.uri = uri;
    }
    if let Some(username) = lookup("RAGPORT_GRAPH_USERNAME") {
        config.graph.username = Some(username);
    }
    if let Some(password) = lookup("RAGPORT_GRAPH_PASSWORD") {
        config.graph.password = Some(password);
    }
    if let Some(namespace) = lookup("RAGPORT_GRAPH_NAMESPACE") {
        config.graph.namespace = namespace;
    }
    if let Some(database) = lookup("RAGPORT_GRAPH_DATABASE") {
        config.graph.database = database;
    }
    if let Some(dir) = lookup("RAGPORT_INPUT_DIR") {
        config.source.input_dir = PathBuf::from(dir);
    }
    if let Some(size) = lookup("RAGPORT_BATCH_SIZE") {
        config.import.batch_size = parse_var("RAGPORT_BATCH_SIZE", &size)?;
    }
    if let Some(model) = lookup("RAGPORT_EMBEDDING_MODEL") {
        config.embedding.model = model;
    }
    if let Some(json) = lookup("RAGPORT_EMBEDDING_ENDPOINTS") {
        let endpoints: Vec<EmbeddingEndpoint> =
            serde_json::from_str(&json).map_err(|e| ConfigError::InvalidOverride {
                var: "RAGPORT_EMBEDDING_ENDPOINTS".to_string(),
                message: e.to_string(),
            })?;
        debug!("Using {} embedding endpoints from environment", endpoints.len());
        config.embedding.endpoints = endpoints;
    }
    Ok(())
}
