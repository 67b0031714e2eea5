use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ragport_cli::{
    cli::{Cli, Commands},
    commands::{self, import::ImportArgs},
    factories,
};

const CRATES: [&str; 6] = [
    "ragport_cli",
    "ragport_core",
    "ragport_config",
    "ragport_embed",
    "ragport_pipeline",
    "ragport_surrealdb",
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise only our crates log at the chosen level
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = cli.level();
        let directives: Vec<String> = CRATES.iter().map(|c| format!("{c}={level}")).collect();
        EnvFilter::new(directives.join(","))
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = factories::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Import {
            input,
            store,
            batch_size,
            stages,
            skip_preconditions,
            no_embed,
        } => {
            let args = ImportArgs {
                input,
                store,
                batch_size,
                stages,
                skip_preconditions,
                no_embed,
            };
            commands::import::execute(config, args).await?;
        }
        Commands::Schema { store } => commands::schema::execute(config, store).await?,
        Commands::Stats { store, type_labels } => {
            commands::stats::execute(config, store, type_labels).await?
        }
    }

    Ok(())
}
