use clap::{Parser, Subcommand, ValueEnum};
use ragport_pipeline::Stage;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Stage progress and totals (default)
    Info,
    /// Per-batch counters
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ragport")]
#[command(about = "ragport - import GraphRAG output into a property graph")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ./ragport.toml when present)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Level for the ragport crates; `--log-level` wins over `-v`.
    pub fn level(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::INFO,
        }
    }
}

/// Store connection overrides shared by every command.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct StoreArgs {
    /// Graph store URI, e.g. ws://localhost:8000 or mem://
    #[arg(long)]
    pub uri: Option<String>,

    /// Database name within the configured namespace
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a GraphRAG output directory
    Import {
        /// Directory holding the output tables
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,

        /// Rows per batch
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Run only these stages (repeatable, declared order is kept)
        #[arg(short, long = "stage", value_name = "STAGE")]
        stages: Vec<Stage>,

        /// Run stages even when their prerequisites are missing from the store
        #[arg(long)]
        skip_preconditions: bool,

        /// Do not embed entity descriptions, even when configured
        #[arg(long)]
        no_embed: bool,
    },

    /// Declare tables and unique indexes without importing
    Schema {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show node and edge counts
    Stats {
        #[command(flatten)]
        store: StoreArgs,

        /// Also count entities tagged with this type label (repeatable)
        #[arg(short, long = "type-label", value_name = "LABEL")]
        type_labels: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_import_with_stages() {
        let cli = Cli::try_parse_from([
            "ragport",
            "import",
            "--input",
            "out",
            "--stage",
            "entities",
            "--stage",
            "community-reports",
            "--batch-size",
            "50",
            "--skip-preconditions",
        ])
        .unwrap();

        match cli.command {
            Commands::Import {
                input,
                batch_size,
                stages,
                skip_preconditions,
                no_embed,
                store,
            } => {
                assert_eq!(input, Some(PathBuf::from("out")));
                assert_eq!(batch_size, Some(50));
                assert_eq!(stages, vec![Stage::Entities, Stage::CommunityReports]);
                assert!(skip_preconditions);
                assert!(!no_embed);
                assert_eq!(store, StoreArgs::default());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_stage() {
        let err = Cli::try_parse_from(["ragport", "import", "--stage", "claims"]).unwrap_err();
        assert!(err.to_string().contains("claims"));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "ragport", "stats", "--uri", "mem://", "-t", "Person", "-v",
        ])
        .unwrap();
        assert_eq!(cli.level(), LevelFilter::DEBUG);
        match cli.command {
            Commands::Stats { store, type_labels } => {
                assert_eq!(store.uri.as_deref(), Some("mem://"));
                assert_eq!(type_labels, vec!["Person".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn explicit_log_level_wins_over_verbose() {
        let cli = Cli::try_parse_from(["ragport", "-v", "--log-level", "warn", "schema"]).unwrap();
        assert_eq!(cli.level(), LevelFilter::WARN);

        let cli = Cli::try_parse_from(["ragport", "schema"]).unwrap();
        assert_eq!(cli.level(), LevelFilter::INFO);
    }
}
