use anyhow::{Context, Result};
use comfy_table::Table;
use ragport_config::ImportConfig;
use ragport_core::{EdgeType, GraphStore, NodeLabel};

use crate::cli::StoreArgs;
use crate::commands::table;
use crate::factories;

/// Counts read from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: Vec<(NodeLabel, u64)>,
    pub edges: Vec<(EdgeType, u64)>,
    pub tagged: Vec<(String, u64)>,
}

impl GraphStats {
    pub async fn collect(store: &dyn GraphStore, type_labels: &[String]) -> Result<Self> {
        let mut stats = Self::default();
        for label in NodeLabel::ALL {
            let count = store
                .count_nodes(label)
                .await
                .with_context(|| format!("Failed to count {label} nodes"))?;
            stats.nodes.push((label, count));
        }
        for edge in EdgeType::ALL {
            let count = store
                .count_edges(edge)
                .await
                .with_context(|| format!("Failed to count {edge} edges"))?;
            stats.edges.push((edge, count));
        }
        for label in type_labels {
            let count = store
                .count_tagged(label)
                .await
                .with_context(|| format!("Failed to count entities tagged {label}"))?;
            stats.tagged.push((label.clone(), count));
        }
        Ok(stats)
    }

    pub fn to_table(&self) -> Table {
        let mut table = table(&["Kind", "Name", "Count"]);
        for (label, count) in &self.nodes {
            table.add_row(vec!["node".to_string(), label.to_string(), count.to_string()]);
        }
        for (edge, count) in &self.edges {
            table.add_row(vec!["edge".to_string(), edge.to_string(), count.to_string()]);
        }
        for (label, count) in &self.tagged {
            table.add_row(vec!["entity label".to_string(), label.clone(), count.to_string()]);
        }
        table
    }
}

pub async fn execute(mut config: ImportConfig, args: StoreArgs, type_labels: Vec<String>) -> Result<()> {
    factories::apply_store_args(&mut config.graph, &args);
    let store = factories::create_store(&config.graph).await?;

    let stats = GraphStats::collect(store.as_ref(), &type_labels).await?;
    println!("{}", stats.to_table());
    Ok(())
}
