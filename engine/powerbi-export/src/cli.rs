//! # Command Line Interface
//!
//! Flags layered over the TOML configuration and environment.

use crate::config::{ExportConfig, SourceKind};
use crate::{ExportSummary, Exporter, ReportRequest};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Export athlete load monitoring data as Power BI tables
#[derive(Parser, Debug)]
#[command(name = "powerbi-export")]
#[command(about = "Export athlete load monitoring data as a Power BI star schema")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory for the CSV files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Where raw records come from
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Directory holding players.csv, sessions.csv and wellness.csv
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Synthetic generator seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Synthetic squad size
    #[arg(long)]
    pub players: Option<usize>,

    /// Synthetic number of days
    #[arg(long)]
    pub days: Option<u32>,

    /// Also write team_report_<DATE>.csv (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub team_report: Option<NaiveDate>,

    /// Also write a text summary for this player (repeatable)
    #[arg(long = "player-summary", value_name = "ID")]
    pub player_summaries: Vec<String>,

    /// Write the resolved configuration to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,
}

impl Cli {
    /// Defaults, then the config file, then environment, then flags
    pub fn resolve_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::load_from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => ExportConfig::default(),
        };

        config.apply_env().context("Invalid environment override")?;
        self.apply_overrides(&mut config);
        config.validate().context("Invalid configuration")?;

        Ok(config)
    }

    /// Apply command-line flags on top of `config`
    pub fn apply_overrides(&self, config: &mut ExportConfig) {
        if let Some(dir) = &self.output {
            config.output.dir = dir.clone();
        }
        if let Some(kind) = self.source {
            config.source.kind = kind;
        }
        if let Some(dir) = &self.data_dir {
            config.source.data_dir = dir.clone();
        }
        if let Some(seed) = self.seed {
            config.source.synthetic.seed = seed;
        }
        if let Some(players) = self.players {
            config.source.synthetic.players = players;
        }
        if let Some(days) = self.days {
            config.source.synthetic.days = days;
        }
    }

    pub fn report_request(&self) -> ReportRequest {
        ReportRequest { team_report: self.team_report, player_summaries: self.player_summaries.clone() }
    }
}

/// CLI handler
pub struct CliHandler {
    exporter: Exporter,
}

impl CliHandler {
    /// Create new CLI handler
    pub fn new(config: ExportConfig) -> Result<Self> {
        let exporter = Exporter::new(config).context("Invalid configuration")?;
        Ok(Self { exporter })
    }

    /// Run the export and list what was written
    pub fn handle(&self, request: &ReportRequest) -> Result<ExportSummary> {
        let summary = self.exporter.run(request).context("Export failed")?;
        print_summary(&summary);
        Ok(summary)
    }
}

fn print_summary(summary: &ExportSummary) {
    println!("Wrote Power BI tables to {}:", summary.output_dir.display());
    for table in &summary.tables {
        println!("  {:<13} {:>7} rows  {}", table.name, table.rows, table.path.display());
    }

    if !summary.reports.is_empty() {
        println!("Reports:");
        for path in &summary.reports {
            println!("  {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_arguments_required() {
        let cli = Cli::try_parse_from(["powerbi-export"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.player_summaries.is_empty());
        assert_eq!(cli.report_request(), ReportRequest::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "powerbi-export",
            "--output",
            "/tmp/pbi",
            "--source",
            "files",
            "--data-dir",
            "raw",
            "--seed",
            "9",
            "--players",
            "3",
            "--days",
            "14",
        ])
        .unwrap();

        let mut config = ExportConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.output.dir, PathBuf::from("/tmp/pbi"));
        assert_eq!(config.source.kind, SourceKind::Files);
        assert_eq!(config.source.data_dir, PathBuf::from("raw"));
        assert_eq!(config.source.synthetic.seed, 9);
        assert_eq!(config.source.synthetic.players, 3);
        assert_eq!(config.source.synthetic.days, 14);
        assert_eq!(config.output.float_precision, 4);
    }

    #[test]
    fn test_report_flags() {
        let cli = Cli::try_parse_from([
            "powerbi-export",
            "--team-report",
            "2024-02-10",
            "--player-summary",
            "P001",
            "--player-summary",
            "P007",
        ])
        .unwrap();

        let request = cli.report_request();
        assert_eq!(request.team_report, NaiveDate::from_ymd_opt(2024, 2, 10));
        assert_eq!(request.player_summaries, vec!["P001", "P007"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Cli::try_parse_from(["powerbi-export", "--team-report", "10/02/2024"]).is_err());
        assert!(Cli::try_parse_from(["powerbi-export", "--source", "database"]).is_err());
        assert!(Cli::try_parse_from(["powerbi-export", "--players", "-1"]).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("export.toml");
        std::fs::write(&path, "[output]\ndir = \"from-file\"\nfloat_precision = 2\n").unwrap();

        let cli = Cli::try_parse_from(["powerbi-export", "--config", path.to_str().unwrap(), "--days", "7"]).unwrap();
        let mut config = ExportConfig::load_from_file(cli.config.as_deref().unwrap()).unwrap();
        cli.apply_overrides(&mut config);

        assert_eq!(config.output.dir, PathBuf::from("from-file"));
        assert_eq!(config.output.float_precision, 2);
        assert_eq!(config.source.synthetic.days, 7);
    }

    #[test]
    fn test_invalid_flag_value_fails_validation() {
        let cli = Cli::try_parse_from(["powerbi-export", "--players", "0"]).unwrap();
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::try_parse_from(["powerbi-export", "--config", "/nonexistent/export.toml"]).unwrap();
        assert!(cli.resolve_config().is_err());
    }
}
