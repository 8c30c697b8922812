//! Config command handlers

use std::path::Path;

use anyhow::Result;

use fyncakes_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config: &Config, config_path: &Path, output: &Output) -> Result<()> {
    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "mongo_uri": config.mongo_uri,
                    "require_database": config.require_database,
                    "seed_sample_data": config.seed_sample_data,
                    "log_filter": config.log_filter,
                    "config_file": config_path,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config_path.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!(
                "  mongo_uri:        {}",
                config.mongo_uri.as_deref().unwrap_or("(not set)")
            );
            println!("  require_database: {}", config.require_database);
            println!("  seed_sample_data: {}", config.seed_sample_data);
            println!(
                "  log_filter:       {}",
                config.log_filter.as_deref().unwrap_or("(not set)")
            );
            println!();
            println!("Config file: {}", config_path.display());
            if !config_path.exists() {
                println!("(file not found, using defaults)");
            }
        }
    }

    Ok(())
}
