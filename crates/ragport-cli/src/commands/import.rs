use anyhow::{Context, Result};
use comfy_table::Table;
use ragport_config::ImportConfig;
use ragport_pipeline::{GraphRagOutput, ImportPipeline, ImportReport, PipelineConfig, SourceDir, Stage};
use std::path::PathBuf;
use tracing::info;

use crate::cli::StoreArgs;
use crate::commands::table;
use crate::factories;

/// Flags of the `import` subcommand.
#[derive(Debug, Clone, Default)]
pub struct ImportArgs {
    pub input: Option<PathBuf>,
    pub store: StoreArgs,
    pub batch_size: Option<usize>,
    pub stages: Vec<Stage>,
    pub skip_preconditions: bool,
    pub no_embed: bool,
}

impl ImportArgs {
    /// Layer the flags over the loaded configuration.
    pub fn apply(&self, config: &mut ImportConfig) -> Result<()> {
        factories::apply_store_args(&mut config.graph, &self.store);
        if let Some(input) = &self.input {
            config.source.input_dir = input.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.import.batch_size = batch_size;
        }
        if self.skip_preconditions {
            config.import.check_preconditions = false;
        }
        if self.no_embed {
            config.embedding.enabled = false;
        }
        config.validate().context("Invalid command line options")
    }

    fn pipeline_config(&self, config: &ImportConfig) -> PipelineConfig {
        let mut pipeline = PipelineConfig::from(&config.import);
        if !self.stages.is_empty() {
            pipeline.stages = self.stages.clone();
        }
        pipeline
    }
}

pub async fn execute(mut config: ImportConfig, args: ImportArgs) -> Result<ImportReport> {
    args.apply(&mut config)?;

    let input = SourceDir::new(&config.source.input_dir);
    info!("Reading GraphRAG output from {}", input.path().display());
    let output = GraphRagOutput::load(&input).context("Failed to read source tables")?;

    let store = factories::create_store(&config.graph).await?;
    let mut pipeline = ImportPipeline::with_config(store, args.pipeline_config(&config));
    if let Some(embedder) = factories::create_embedder(&config.embedding)? {
        pipeline = pipeline.with_embedder(embedder);
    }

    let report = pipeline.run(&output).await.map_err(|e| {
        let hint = if e.is_partial() {
            " (earlier batches were committed; re-running the import is safe)"
        } else {
            ""
        };
        anyhow::Error::new(e).context(format!("Import failed{hint}"))
    })?;

    println!("{}", report_table(&report));
    Ok(report)
}

pub fn report_table(report: &ImportReport) -> Table {
    let mut table = table(&["Stage", "Rows", "Batches", "Nodes created", "Edges created", "Elapsed"]);
    for stage in &report.stages {
        let elapsed = if stage.skipped {
            "skipped".to_string()
        } else {
            format!("{:.3} s", stage.elapsed.as_secs_f64())
        };
        table.add_row(vec![
            stage.stage.to_string(),
            stage.rows.to_string(),
            stage.batches.to_string(),
            stage.counters.nodes_created.to_string(),
            stage.counters.edges_created.to_string(),
            elapsed,
        ]);
    }
    let totals = report.totals();
    table.add_row(vec![
        "total".to_string(),
        String::new(),
        String::new(),
        totals.nodes_created.to_string(),
        totals.edges_created.to_string(),
        format!("{:.3} s", report.elapsed.as_secs_f64()),
    ]);
    table
}
