//! Core abstractions for importing GraphRAG output into a property graph.
//!
//! This crate owns the vocabulary shared by every other ragport crate:
//!
//! - [`records`]: typed rows of the source tables
//! - [`labels`]: normalization of free-text entity types into node labels
//! - [`graph`]: node labels, edge types, mutations and the [`GraphStore`] trait
//! - [`batch`]: the sequential batched upsert driver
//! - [`embedding`]: the [`EmbeddingProvider`] seam used by the entity stage
//!
//! Storage backends and embedding providers live in their own crates and are
//! injected by the CLI, so nothing here depends on a concrete database.

pub mod batch;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod labels;
pub mod records;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use batch::{apply_in_batches, BatchOutcome, DEFAULT_BATCH_SIZE};
pub use embedding::{EmbeddingProvider, EmbeddingResponse};
pub use error::{
    EmbeddingError, EmbeddingResult, ImportError, ImportResult, StoreError, StoreResult,
};
pub use graph::{
    EdgeType, GraphElement, GraphStore, Mutation, MutationCounters, NodeLabel, Statement,
};
pub use labels::{strip_quotes, upper_camel_case, TypeLabel};
pub use records::{
    CommunityId, CommunityRecord, CommunityReportRecord, CovariateRecord, DocumentRecord,
    EntityRecord, RelationshipRecord, TextUnitRecord,
};
