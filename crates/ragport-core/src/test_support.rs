//! In-memory test doubles for the store and embedding seams.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::embedding::{EmbeddingProvider, EmbeddingResponse};
use crate::error::{EmbeddingResult, StoreError, StoreResult};
use crate::graph::{
    EdgeType, GraphElement, GraphStore, Mutation, MutationCounters, NodeLabel, Statement,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBatch {
    pub statement: String,
    pub rows: Vec<Value>,
}

/// A [`GraphStore`] that records every call instead of touching a database.
///
/// Each batch "creates" one instance of every element the statement
/// touches per row, which is enough to satisfy stage preconditions.
#[derive(Default)]
pub struct RecordingStore {
    batches: Mutex<Vec<RecordedBatch>>,
    executed: Mutex<Vec<String>>,
    counts: Mutex<HashMap<GraphElement, u64>>,
    tagged: Mutex<HashMap<String, u64>>,
    failures: Mutex<HashMap<String, usize>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `index`-th batch (zero based) of `statement` fail.
    pub async fn fail_on_batch(&self, statement: &str, index: usize) {
        self.failures
            .lock()
            .await
            .insert(statement.to_string(), index);
    }

    pub async fn set_count(&self, element: GraphElement, count: u64) {
        self.counts.lock().await.insert(element, count);
    }

    pub async fn set_tagged(&self, label: &str, count: u64) {
        self.tagged.lock().await.insert(label.to_string(), count);
    }

    pub async fn batches(&self) -> Vec<RecordedBatch> {
        self.batches.lock().await.clone()
    }

    pub async fn batches_for(&self, statement: &str) -> Vec<RecordedBatch> {
        self.batches
            .lock()
            .await
            .iter()
            .filter(|b| b.statement == statement)
            .cloned()
            .collect()
    }

    /// Names of statements run through [`GraphStore::execute`].
    pub async fn executed(&self) -> Vec<String> {
        self.executed.lock().await.clone()
    }
}

#[async_trait]
impl GraphStore for RecordingStore {
    fn statement(&self, mutation: Mutation) -> Statement {
        Statement::new(mutation.name(), format!("-- {}", mutation.name()))
            .touching(mutation.touches())
    }

    fn constraint_statements(&self) -> Vec<Statement> {
        NodeLabel::ALL
            .iter()
            .map(|label| Statement::new(format!("constraint:{}", label.table()), "-- unique"))
            .collect()
    }

    async fn execute(&self, statement: &Statement) -> StoreResult<()> {
        self.executed.lock().await.push(statement.name.clone());
        Ok(())
    }

    async fn execute_batch(
        &self,
        statement: &Statement,
        rows: Vec<Value>,
    ) -> StoreResult<MutationCounters> {
        let mut batches = self.batches.lock().await;
        let sent = batches
            .iter()
            .filter(|b| b.statement == statement.name)
            .count();
        if self.failures.lock().await.get(&statement.name) == Some(&sent) {
            return Err(StoreError::Query(format!(
                "injected failure in {} batch {sent}",
                statement.name
            )));
        }

        let n = rows.len() as u64;
        let mut counters = MutationCounters {
            rows: n,
            ..Default::default()
        };
        let mut counts = self.counts.lock().await;
        for element in &statement.touches {
            *counts.entry(*element).or_default() += n;
            match element {
                GraphElement::Node(_) => counters.nodes_created += n,
                GraphElement::Edge(_) => counters.edges_created += n,
            }
        }

        batches.push(RecordedBatch {
            statement: statement.name.clone(),
            rows,
        });
        Ok(counters)
    }

    async fn count_nodes(&self, label: NodeLabel) -> StoreResult<u64> {
        Ok(self.count_of(GraphElement::Node(label)).await)
    }

    async fn count_edges(&self, edge: EdgeType) -> StoreResult<u64> {
        Ok(self.count_of(GraphElement::Edge(edge)).await)
    }

    async fn count_tagged(&self, label: &str) -> StoreResult<u64> {
        Ok(self.tagged.lock().await.get(label).copied().unwrap_or(0))
    }
}

impl RecordingStore {
    async fn count_of(&self, element: GraphElement) -> u64 {
        self.counts.lock().await.get(&element).copied().unwrap_or(0)
    }
}

/// Deterministic embedder: the vector encodes the text length and its first byte.
pub struct MockEmbeddingProvider {
    dimensions: usize,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        if let Some(slot) = vector.get_mut(0) {
            *slot = text.len() as f32;
        }
        if let Some(slot) = vector.get_mut(1) {
            *slot = text.bytes().next().map(f32::from).unwrap_or(0.0);
        }
        vector
    }

    /// Texts received, one entry per `embed_batch` call.
    pub async fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(&self, texts: Vec<String>) -> EmbeddingResult<Vec<EmbeddingResponse>> {
        let responses = texts
            .iter()
            .map(|t| EmbeddingResponse::new(self.vector_for(t), "mock-embedding"))
            .collect();
        self.calls.lock().await.push(texts);
        Ok(responses)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-embedding"
    }

    fn batch_size(&self) -> usize {
        2
    }
}
