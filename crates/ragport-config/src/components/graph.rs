use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConfigError, ConfigResult};

/// Connection to the graph store.
///
/// `uri` is any SurrealDB endpoint: `mem://` for an in-process store,
/// `ws://host:port` or `http://host:port` for a server.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub namespace: String,
    pub database: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            username: None,
            password: None,
            namespace: "ragport".to_string(),
            database: "graphrag".to_string(),
        }
    }
}

fn default_uri() -> String {
    "mem://".to_string()
}

impl GraphConfig {
    pub fn is_in_memory(&self) -> bool {
        self.uri.starts_with("mem://")
    }

    pub(crate) fn validate(&self) -> ConfigResult<()> {
        if self.uri.trim().is_empty() {
            return Err(ConfigError::required("graph.uri"));
        }
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::required("graph.namespace"));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::required("graph.database"));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::invalid(
                "graph.password",
                "a password requires graph.username",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .finish()
    }
}
