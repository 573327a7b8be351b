//! # Power BI Export Binary
//!
//! Writes dim_calendar, dim_players and fact_daily CSV files.

use anyhow::{Context, Result};
use clap::Parser;
use powerbi_export::cli::{Cli, CliHandler};
use powerbi_export::logging::initialize_logging;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if let Some(path) = &cli.write_config {
        config
            .save_to_file(path)
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    // Initialize logging
    initialize_logging(&config.logging)?;

    // Create CLI handler and run the export
    let handler = CliHandler::new(config)?;
    handler.handle(&cli.report_request())?;

    Ok(())
}
