use ragport_config::GraphConfig;
use std::fmt;

/// Connection settings for [`SurrealGraphStore`](crate::SurrealGraphStore).
#[derive(Clone, PartialEq, Eq)]
pub struct SurrealConfig {
    /// `mem://`, `ws://host:port` or `http://host:port`
    pub endpoint: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials. No sign-in is attempted when unset.
    pub credentials: Option<(String, String)>,
}

impl SurrealConfig {
    /// A private in-process datastore. Every call yields an empty graph.
    pub fn memory() -> Self {
        Self {
            endpoint: "mem://".to_string(),
            namespace: "ragport".to_string(),
            database: "test".to_string(),
            credentials: None,
        }
    }
}

impl From<&GraphConfig> for SurrealConfig {
    fn from(config: &GraphConfig) -> Self {
        Self {
            endpoint: config.uri.clone(),
            namespace: config.namespace.clone(),
            database: config.database.clone(),
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone().unwrap_or_default())),
        }
    }
}

impl fmt::Debug for SurrealConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurrealConfig")
            .field("endpoint", &self.endpoint)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.credentials.as_ref().map(|(user, _)| user))
            .finish()
    }
}
