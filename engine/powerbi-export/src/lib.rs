//! # Power BI Export
//!
//! Turns athlete monitoring records into a small star schema for Power BI:
//! `dim_calendar`, `dim_players` and `fact_daily`, written as headed CSV files.
//! Optional staff reports (team daily table, player summaries) are written
//! alongside.
//!
//! ## Architecture
//!
//! - **config**: TOML configuration with environment overrides
//! - **tables**: row types and star schema assembly
//! - **writer**: CSV output
//! - **report**: team report and player summaries
//! - **cli**: command-line interface
//! - **logging**: tracing subscriber setup
//!
//! ## Usage
//!
//! ```rust,no_run
//! use powerbi_export::{ExportConfig, Exporter, ReportRequest};
//!
//! let exporter = Exporter::new(ExportConfig::default())?;
//! let summary = exporter.run(&ReportRequest::default())?;
//! for table in &summary.tables {
//!     println!("{} rows -> {}", table.rows, table.path.display());
//! }
//! # Ok::<(), powerbi_export::ExportError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod tables;
pub mod writer;


pub use config::{ExportConfig, LogFormat, LoggingConfig, OutputConfig, SourceConfig, SourceKind};
pub use error::{ExportError, Result};
pub use tables::{CalendarRow, FactRow, PlayerRow, StarSchema, Table};
pub use writer::WrittenTable;

use chrono::NaiveDate;
use load_model::{build_daily, ingest, synthetic, RawDataset};
use std::path::PathBuf;
use tracing::{info, warn};

/// Reports to produce in addition to the three tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRequest {
    /// Write `team_report_<date>.csv` for this date
    pub team_report: Option<NaiveDate>,

    /// Players to write summaries for, at their latest day on or before
    /// `team_report` when set
    pub player_summaries: Vec<String>,
}

/// Everything an export run wrote
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub output_dir: PathBuf,
    pub tables: Vec<WrittenTable>,
    pub reports: Vec<PathBuf>,
}

/// Read the raw dataset from the configured source
pub fn load_source(source: &SourceConfig) -> Result<RawDataset> {
    let dataset = match source.kind {
        SourceKind::Synthetic => synthetic::generate(&source.synthetic)?,
        SourceKind::Files => ingest::load_dataset(&source.data_dir)?,
    };

    if dataset.is_empty() {
        warn!("Source produced no records; tables will contain headers only");
    }

    Ok(dataset)
}

/// Runs the export pipeline for one configuration
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create an exporter from a validated configuration
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Load, derive and assemble the star schema without writing anything
    pub fn build_schema(&self) -> Result<StarSchema> {
        let dataset = load_source(&self.config.source)?;
        let (roster, daily) = build_daily(dataset, &self.config.features)?;
        StarSchema::build(&roster, &daily, self.config.output.float_precision)
    }

    /// Build the star schema, write it, then write any requested reports
    pub fn run(&self, request: &ReportRequest) -> Result<ExportSummary> {
        let output_dir = self.config.output.dir.clone();
        info!("Starting export to {:?} from {:?} source", output_dir, self.config.source.kind);

        let schema = self.build_schema()?;
        let tables = writer::write_schema(&output_dir, &schema)?;

        let mut reports = Vec::new();
        if let Some(date) = request.team_report {
            let rows = report::team_daily_table(&schema.facts, &schema.players, date);
            if rows.is_empty() {
                warn!("No daily records on {}; team report has headers only", date);
            }
            reports.push(report::write_team_report(&output_dir, date, &rows)?);
        }

        for player_id in &request.player_summaries {
            let summary = report::player_summary(&schema.facts, &schema.players, player_id, request.team_report)?;
            reports.push(report::write_player_summary(&output_dir, &summary)?);
        }

        info!("Export complete: {} tables, {} reports", tables.len(), reports.len());

        Ok(ExportSummary { output_dir, tables, reports })
    }
}

/// Validate `config` and run a complete export
pub fn export(config: ExportConfig, request: &ReportRequest) -> Result<ExportSummary> {
    Exporter::new(config)?.run(request)
}
