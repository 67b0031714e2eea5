//! SurrealDB connection handle implementing [`GraphStore`].

use async_trait::async_trait;
use ragport_core::{
    EdgeType, GraphElement, GraphStore, Mutation, MutationCounters, NodeLabel, Statement,
    StoreError, StoreResult,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::{debug, info, trace};

use crate::schema;
use crate::statements;
use crate::types::SurrealConfig;

#[derive(Debug, Deserialize)]
struct CountRow {
    total: i64,
}

/// Graph store backed by SurrealDB.
///
/// Mutation counters are measured by counting the touched tables around
/// each batch; see [`GraphStore::execute_batch`].
///
/// Cloning is cheap and shares the underlying connection. The connection
/// is closed when the last clone is dropped.
#[derive(Clone)]
pub struct SurrealGraphStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    db: Surreal<Any>,
    config: SurrealConfig,
}

impl std::fmt::Debug for SurrealGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealGraphStore")
            .field("config", &self.inner.config)
            .finish()
    }
}

impl SurrealGraphStore {
    /// Open a connection, sign in when credentials are configured, and
    /// select the namespace and database.
    pub async fn connect(config: SurrealConfig) -> StoreResult<Self> {
        info!(
            "Connecting to {} ({}/{})",
            config.endpoint, config.namespace, config.database
        );
        let db = surrealdb::engine::any::connect(config.endpoint.as_str())
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to connect to {}: {}", config.endpoint, e))
            })?;

        if let Some((username, password)) = &config.credentials {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await
            .map_err(|e| StoreError::Authentication(format!("Sign-in as '{username}' failed: {e}")))?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await
            .map_err(|e| {
                StoreError::Connection(format!(
                    "Failed to use namespace '{}' and database '{}': {}",
                    config.namespace, config.database, e
                ))
            })?;

        Ok(Self {
            inner: Arc::new(StoreInner { db, config }),
        })
    }

    pub async fn memory() -> StoreResult<Self> {
        Self::connect(SurrealConfig::memory()).await
    }

    pub fn config(&self) -> &SurrealConfig {
        &self.inner.config
    }

    /// The underlying SurrealDB handle, for ad-hoc queries.
    pub fn db(&self) -> &Surreal<Any> {
        &self.inner.db
    }

    /// Run every constraint statement in order.
    pub async fn apply_schema(&self) -> StoreResult<()> {
        for statement in self.constraint_statements() {
            self.execute(&statement).await?;
        }
        debug!("Schema applied");
        Ok(())
    }

    async fn count_query(&self, sql: &str, key: &'static str, value: String) -> StoreResult<u64> {
        let mut response = self
            .inner
            .db
            .query(sql)
            .bind((key, value))
            .await
            .map_err(query_error)?
            .check()
            .map_err(query_error)?;

        let rows: Vec<CountRow> = response
            .take(0)
            .map_err(|e| StoreError::Decode(format!("Failed to read count: {e}")))?;
        Ok(rows.first().map(|row| row.total.max(0) as u64).unwrap_or(0))
    }

    async fn snapshot(&self, touches: &[GraphElement]) -> StoreResult<Vec<u64>> {
        let mut counts = Vec::with_capacity(touches.len());
        for element in touches {
            counts.push(self.count(*element).await?);
        }
        Ok(counts)
    }
}

fn query_error(e: surrealdb::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

const COUNT_TABLE: &str = "SELECT count() AS total FROM type::table($table) GROUP ALL";
const COUNT_TAGGED: &str =
    "SELECT count() AS total FROM entity WHERE labels CONTAINS $label GROUP ALL";

#[async_trait]
impl GraphStore for SurrealGraphStore {
    fn statement(&self, mutation: Mutation) -> Statement {
        statements::statement_for(mutation)
    }

    fn constraint_statements(&self) -> Vec<Statement> {
        schema::constraint_statements()
    }

    async fn execute(&self, statement: &Statement) -> StoreResult<()> {
        trace!("Executing {}: {}", statement.name, statement.text);
        self.inner
            .db
            .query(statement.text.as_str())
            .await
            .map_err(query_error)?
            .check()
            .map_err(query_error)?;
        Ok(())
    }

    /// Counters are the growth of each touched table across the batch.
    ///
    /// SurrealDB reports no write counts, so every batch runs a full
    /// `count()` over each touched table before and after the write. That
    /// cost grows with table size, so very large imports should prefer
    /// bigger batches.
    async fn execute_batch(
        &self,
        statement: &Statement,
        rows: Vec<Value>,
    ) -> StoreResult<MutationCounters> {
        let row_count = rows.len() as u64;
        let before = self.snapshot(&statement.touches).await?;

        // One transaction per batch: a rejected row rolls back the whole batch.
        let sql = format!(
            "BEGIN TRANSACTION;\n{}\nCOMMIT TRANSACTION;",
            statement.text
        );
        self.inner
            .db
            .query(sql)
            .bind(("rows", rows))
            .await
            .map_err(query_error)?
            .check()
            .map_err(query_error)?;

        let after = self.snapshot(&statement.touches).await?;
        let mut counters = MutationCounters {
            rows: row_count,
            ..Default::default()
        };
        for ((element, before), after) in statement.touches.iter().zip(before).zip(after) {
            let created = after.saturating_sub(before);
            match element {
                GraphElement::Node(_) => counters.nodes_created += created,
                GraphElement::Edge(_) => counters.edges_created += created,
            }
        }
        Ok(counters)
    }

    async fn count_nodes(&self, label: NodeLabel) -> StoreResult<u64> {
        self.count_query(COUNT_TABLE, "table", label.table().to_string())
            .await
    }

    async fn count_edges(&self, edge: EdgeType) -> StoreResult<u64> {
        self.count_query(COUNT_TABLE, "table", edge.table().to_string())
            .await
    }

    async fn count_tagged(&self, label: &str) -> StoreResult<u64> {
        self.count_query(COUNT_TAGGED, "label", label.to_string())
            .await
    }
}
