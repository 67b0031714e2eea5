//! Staged import of GraphRAG output into a property graph.
//!
//! - [`source`]: locate and read the output tables (Parquet, JSON Lines, JSON)
//! - [`rows`]: turn typed records into statement rows
//! - [`stages`]: the declared stage order and per-stage preconditions
//! - [`import_pipeline`]: the orchestrator that runs stages against a store
//!
//! ```no_run
//! use std::sync::Arc;
//! use ragport_pipeline::{GraphRagOutput, ImportPipeline, SourceDir};
//! # async fn run(store: Arc<dyn ragport_core::GraphStore>) -> ragport_core::ImportResult<()> {
//! let output = GraphRagOutput::load(&SourceDir::new("./output"))?;
//! let report = ImportPipeline::new(store).run(&output).await?;
//! println!("{}", report.totals());
//! # Ok(())
//! # }
//! ```

pub mod import_pipeline;
pub mod rows;
pub mod source;
pub mod stages;

pub use import_pipeline::{ImportPipeline, ImportReport, PipelineConfig, StageReport};
pub use source::{GraphRagOutput, SourceDir, SourceTable, TableFormat};
pub use stages::{Stage, UnknownStage};
