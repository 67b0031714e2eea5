//! Import pipeline orchestrator
//!
//! Runs the stages of a GraphRAG import against one store handle:
//!
//! 1. **Constraints**: declare tables and unique indexes
//! 2. **Documents** and **Chunks**: source text and its provenance
//! 3. **Entities**: typed nodes, embedded on the way in when configured
//! 4. **Relationships**: `RELATED` edges resolved by entity name
//! 5. **Communities** and **Community reports**: structure, narrative, findings
//! 6. **Covariates**: free-form claims linked to their chunk
//!
//! Stages run strictly one after another and every batch is a merge, so an
//! interrupted import is recovered by running it again.

use ragport_config::{DuplicatePolicy, ImportSettings};
use ragport_core::{
    apply_in_batches, EmbeddingError, EmbeddingProvider, EntityRecord, GraphElement, GraphStore,
    ImportError, ImportResult, MutationCounters, DEFAULT_BATCH_SIZE,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::rows;
use crate::source::GraphRagOutput;
use crate::stages::{ordered, Stage};

/// Pipeline behavior switches.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub batch_size: usize,
    /// Refuse to run a stage whose prerequisites are absent from the store.
    pub check_preconditions: bool,
    pub duplicate_relationships: DuplicatePolicy,
    /// Stages to run, in any order; they always execute in [`Stage::ORDER`].
    pub stages: Vec<Stage>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            check_preconditions: true,
            duplicate_relationships: DuplicatePolicy::Warn,
            stages: Stage::ORDER.to_vec(),
        }
    }
}

impl From<&ImportSettings> for PipelineConfig {
    fn from(settings: &ImportSettings) -> Self {
        Self {
            batch_size: settings.batch_size,
            check_preconditions: settings.check_preconditions,
            duplicate_relationships: settings.duplicate_relationships,
            ..Self::default()
        }
    }
}

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: Stage,
    pub rows: usize,
    pub batches: usize,
    pub counters: MutationCounters,
    pub elapsed: Duration,
    /// The stage had nothing to import.
    pub skipped: bool,
    /// Entities whose description was embedded during this run.
    pub embedded: usize,
}

impl StageReport {
    fn skipped(stage: Stage) -> Self {
        Self {
            stage,
            rows: 0,
            batches: 0,
            counters: MutationCounters::default(),
            elapsed: Duration::ZERO,
            skipped: true,
            embedded: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub stages: Vec<StageReport>,
    pub elapsed: Duration,
}

impl ImportReport {
    pub fn totals(&self) -> MutationCounters {
        let mut total = MutationCounters::default();
        for stage in &self.stages {
            total += stage.counters;
        }
        total
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }
}

/// Drives the import stages against a [`GraphStore`].
///
/// The store and the optional embedder are injected, so the same pipeline
/// runs against SurrealDB or an in-memory double.
pub struct ImportPipeline {
    store: Arc<dyn GraphStore>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    config: PipelineConfig,
}

impl ImportPipeline {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self::with_config(store, PipelineConfig::default())
    }

    pub fn with_config(store: Arc<dyn GraphStore>, config: PipelineConfig) -> Self {
        Self {
            store,
            embedder: None,
            config,
        }
    }

    /// Embed entity descriptions that arrive without an embedding.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every selected stage in order, stopping at the first failure.
    pub async fn run(&self, output: &GraphRagOutput) -> ImportResult<ImportReport> {
        if self.config.batch_size == 0 {
            return Err(ImportError::InvalidBatchSize(0));
        }

        let start = Instant::now();
        let stages = ordered(&self.config.stages);
        info!(
            "Starting import: {} stages, batch size {}",
            stages.len(),
            self.config.batch_size
        );

        let mut report = ImportReport::default();
        for stage in stages {
            report.stages.push(self.run_stage(stage, output).await?);
        }
        report.elapsed = start.elapsed();

        let totals = report.totals();
        info!(
            "Import finished in {:.3} s: {} nodes created, {} edges created",
            report.elapsed.as_secs_f64(),
            totals.nodes_created,
            totals.edges_created
        );
        Ok(report)
    }

    /// Run a single stage.
    pub async fn run_stage(&self, stage: Stage, output: &GraphRagOutput) -> ImportResult<StageReport> {
        let Some(mutation) = stage.mutation() else {
            return self.apply_constraints().await;
        };

        let row_count = source_rows(stage, output);
        if row_count == 0 {
            info!("Stage {}: no rows, skipping", stage);
            return Ok(StageReport::skipped(stage));
        }
        info!("Stage {}: {} rows", stage, row_count);

        if stage == Stage::Relationships {
            self.check_duplicates(output)?;
        }
        self.check_precondition(stage).await?;

        let mut embedded = 0;
        let prepared = match stage {
            Stage::Entities => {
                let (entities, count) = self.embed_entities(&output.entities).await?;
                embedded = count;
                rows::entity_rows(&entities)
            }
            _ => prepare(stage, output),
        };

        let statement = self.store.statement(mutation);
        let outcome = apply_in_batches(
            self.store.as_ref(),
            &statement,
            prepared,
            self.config.batch_size,
        )
        .await?;

        Ok(StageReport {
            stage,
            rows: row_count,
            batches: outcome.batches,
            counters: outcome.counters,
            elapsed: outcome.elapsed,
            skipped: false,
            embedded,
        })
    }

    async fn apply_constraints(&self) -> ImportResult<StageReport> {
        let start = Instant::now();
        let statements = self.store.constraint_statements();
        debug!("Stage constraints: {} statements", statements.len());
        for statement in &statements {
            self.store.execute(statement).await?;
        }
        info!("Stage constraints: {} statements applied", statements.len());

        Ok(StageReport {
            stage: Stage::Constraints,
            rows: 0,
            batches: statements.len(),
            counters: MutationCounters::default(),
            elapsed: start.elapsed(),
            skipped: false,
            embedded: 0,
        })
    }

    fn check_duplicates(&self, output: &GraphRagOutput) -> ImportResult<()> {
        let duplicates = rows::duplicate_relationship_ids(&output.relationships);
        if duplicates.is_empty() {
            return Ok(());
        }
        match self.config.duplicate_relationships {
            DuplicatePolicy::Reject => Err(ImportError::DuplicateRelationshipIds {
                ids: duplicates.into_keys().collect(),
            }),
            DuplicatePolicy::Warn => {
                for (id, count) in &duplicates {
                    warn!("Relationship id '{}' appears {} times; later rows win", id, count);
                }
                Ok(())
            }
        }
    }

    async fn check_precondition(&self, stage: Stage) -> ImportResult<()> {
        if !self.config.check_preconditions {
            return Ok(());
        }
        let Some(requirement) = stage.requirement() else {
            return Ok(());
        };

        let present = self.store.count(requirement).await?;
        debug!("Stage {}: precondition {:?} has {} instances", stage, requirement, present);
        if present == 0 {
            return Err(ImportError::Precondition {
                stage: stage.to_string(),
                requirement: describe(requirement),
            });
        }
        Ok(())
    }

    /// Attach embeddings to entities that have a description but no vector.
    async fn embed_entities(
        &self,
        entities: &[EntityRecord],
    ) -> ImportResult<(Vec<EntityRecord>, usize)> {
        let mut entities = entities.to_vec();
        let Some(embedder) = &self.embedder else {
            return Ok((entities, 0));
        };

        let pending: Vec<usize> = entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.description_embedding.is_none())
            .filter(|(_, e)| e.description.as_deref().is_some_and(|d| !d.trim().is_empty()))
            .map(|(index, _)| index)
            .collect();
        if pending.is_empty() {
            return Ok((entities, 0));
        }

        info!(
            "Embedding {} entity descriptions with {} ({})",
            pending.len(),
            embedder.model_name(),
            embedder.provider_name()
        );

        for group in pending.chunks(embedder.batch_size().max(1)) {
            let texts: Vec<String> = group
                .iter()
                .map(|&i| entities[i].description.clone().unwrap_or_default())
                .collect();
            let responses = embedder.embed_batch(texts).await?;
            if responses.len() != group.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    group.len(),
                    responses.len()
                ))
                .into());
            }
            for (&index, response) in group.iter().zip(responses) {
                entities[index].description_embedding = Some(response.embedding);
            }
        }

        Ok((entities, pending.len()))
    }
}

fn source_rows(stage: Stage, output: &GraphRagOutput) -> usize {
    match stage {
        Stage::Constraints => 0,
        Stage::Documents => output.documents.len(),
        Stage::Chunks => output.text_units.len(),
        Stage::Entities => output.entities.len(),
        Stage::Relationships => output.relationships.len(),
        Stage::Communities => output.communities.len(),
        Stage::CommunityReports => output.community_reports.len(),
        Stage::Covariates => output.covariates.len(),
    }
}

fn prepare(stage: Stage, output: &GraphRagOutput) -> Vec<Value> {
    match stage {
        Stage::Constraints => Vec::new(),
        Stage::Documents => rows::document_rows(&output.documents),
        Stage::Chunks => rows::chunk_rows(&output.text_units),
        Stage::Entities => rows::entity_rows(&output.entities),
        Stage::Relationships => rows::relationship_rows(&output.relationships),
        Stage::Communities => rows::community_rows(&output.communities),
        Stage::CommunityReports => rows::community_report_rows(&output.community_reports),
        Stage::Covariates => rows::covariate_rows(&output.covariates),
    }
}

fn describe(requirement: GraphElement) -> String {
    match requirement {
        GraphElement::Node(label) => format!("requires at least one {label} node"),
        GraphElement::Edge(edge) => format!("requires at least one {edge} edge"),
    }
}
