//! FynCakes CLI
//!
//! Command-line interface for inspecting the FynCakes development store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fyncakes_core::{Config, Database};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "fyncakes")]
#[command(about = "FynCakes - query the bakery development store")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file (overrides FYNCAKES_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List records in a collection
    #[command(alias = "ls")]
    Find {
        /// Collection name
        collection: String,
        /// Query document as JSON, e.g. '{"category": "Bread"}'
        #[arg(short, long)]
        filter: Option<String>,
        /// Field to sort by
        #[arg(short, long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Number of records to skip
        #[arg(long, default_value_t = 0)]
        skip: usize,
        /// Maximum number of records (0 = no limit)
        #[arg(short, long, default_value_t = 0)]
        limit: usize,
    },
    /// Count records in a collection
    Count {
        /// Collection name
        collection: String,
        /// Query document as JSON
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// List distinct values of a field
    Distinct {
        /// Collection name
        collection: String,
        /// Field name
        field: String,
    },
    /// Show total sales across all orders
    Sales,
    /// List collections with record counts
    Collections,
    /// Show the admin dashboard figures
    Dashboard,
    /// Show configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let config_path = cli.config.clone().unwrap_or_else(Config::config_file_path);
    let config = load_config(&config_path)?;
    init_logging(&config);

    // Config doesn't need the store
    if let Commands::Config { command } = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => {
                commands::config::show(&config, &config_path, &output)
            }
        };
    }

    let db = Database::open(&config).context("Failed to open the store")?;
    debug!("Store opened, memory backend: {}", db.is_memory());

    match cli.command {
        Commands::Find {
            collection,
            filter,
            sort,
            desc,
            skip,
            limit,
        } => {
            let options = commands::query::FindOptions {
                filter,
                sort,
                descending: desc,
                skip,
                limit,
            };
            commands::query::find(&db, &collection, &options, &output)
        }
        Commands::Count { collection, filter } => {
            commands::query::count(&db, &collection, filter.as_deref(), &output)
        }
        Commands::Distinct { collection, field } => {
            commands::query::distinct(&db, &collection, &field, &output)
        }
        Commands::Sales => commands::stats::sales(&db, &output),
        Commands::Collections => commands::stats::collections(&db, &output),
        Commands::Dashboard => commands::stats::dashboard(&db, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_from_path(path).context("Failed to load configuration")
}

/// Install the stderr log subscriber
///
/// FYNCAKES_LOG wins over the config's `log_filter`; the default is `warn`.
fn init_logging(config: &Config) {
    let directive = std::env::var("FYNCAKES_LOG")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| config.log_filter.clone())
        .unwrap_or_else(|| "warn".to_string());

    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid log filter {:?}: {}", directive, e);
        EnvFilter::new("warn")
    });

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
