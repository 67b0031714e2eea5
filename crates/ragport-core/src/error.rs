//! Error types for graph import operations.

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by a [`GraphStore`](crate::GraphStore) backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The store rejected a statement (constraint violation, syntax, ...).
    #[error("Query error: {0}")]
    Query(String),

    #[error("Failed to decode store response: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by an [`EmbeddingProvider`](crate::EmbeddingProvider).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid embedding dimensions: expected {expected}, got {actual}")]
    InvalidDimensions { expected: usize, actual: usize },

    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("Embedding cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Errors surfaced to whoever runs an import.
///
/// Nothing here is retried. Every mutation is a merge, so the recovery path
/// for any of these is to fix the cause and re-run the affected stage.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Required table '{table}' not found in {}", dir.display())]
    MissingTable { table: String, dir: PathBuf },

    #[error("Failed to read table '{table}' from {}: {message}", path.display())]
    Source {
        table: String,
        path: PathBuf,
        message: String,
    },

    /// A row is missing a column or carries a value of the wrong shape.
    #[error("Malformed row {row} in table '{table}': {message}")]
    Schema {
        table: String,
        row: usize,
        message: String,
    },

    #[error("Batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),

    /// Batches before `batch` stay committed; later ones were never sent.
    #[error("Statement '{statement}' failed on batch {batch} ({committed} earlier batches committed): {source}")]
    Batch {
        statement: String,
        batch: usize,
        committed: usize,
        #[source]
        source: StoreError,
    },

    #[error("Stage '{stage}' cannot run: {requirement}")]
    Precondition { stage: String, requirement: String },

    #[error("Duplicate relationship ids in source table: {}", ids.join(", "))]
    DuplicateRelationshipIds { ids: Vec<String> },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ImportResult<T> = Result<T, ImportError>;

impl ImportError {
    /// True when the failure happened after some data reached the store.
    pub fn is_partial(&self) -> bool {
        matches!(self, ImportError::Batch { committed, .. } if *committed > 0)
    }
}
