use anyhow::{Context, Result};
use ragport_config::ImportConfig;
use ragport_core::GraphStore;

use crate::cli::StoreArgs;
use crate::factories;

/// Apply the constraint statements and nothing else.
pub async fn execute(mut config: ImportConfig, args: StoreArgs) -> Result<()> {
    factories::apply_store_args(&mut config.graph, &args);
    let store = factories::create_store(&config.graph).await?;

    let statements = store.constraint_statements();
    for statement in &statements {
        store
            .execute(statement)
            .await
            .with_context(|| format!("Failed to apply {}", statement.name))?;
    }

    println!(
        "Applied {} schema statements to {}/{}",
        statements.len(),
        config.graph.namespace,
        config.graph.database
    );
    Ok(())
}
