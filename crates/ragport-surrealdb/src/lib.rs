//! # ragport SurrealDB backend
//!
//! [`SurrealGraphStore`] implements [`ragport_core::GraphStore`] on top of
//! SurrealDB. Node labels map to tables, edge types to `TYPE RELATION`
//! tables, and every import statement is a `FOR $row IN $rows` loop that
//! upserts nodes by record id and relates them only when the edge is absent.
//!
//! ```rust,no_run
//! use ragport_core::{GraphStore, Mutation};
//! use ragport_surrealdb::{SurrealConfig, SurrealGraphStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SurrealGraphStore::connect(SurrealConfig::memory()).await?;
//!     store.apply_schema().await?;
//!
//!     let statement = store.statement(Mutation::Documents);
//!     let rows = vec![serde_json::json!({ "id": "d1", "title": "T" })];
//!     store.execute_batch(&statement, rows).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod schema;
pub mod statements;
pub mod types;

pub use client::SurrealGraphStore;
pub use types::SurrealConfig;
