//! # Configuration Management
//!
//! Defaults, TOML file loading, environment overrides and validation for the
//! exporter. Precedence: defaults < file < environment < command line.

use crate::error::{ExportError, Result};
use load_model::{FeatureConfig, SyntheticConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum decimals kept when rounding floats for output
pub const MAX_FLOAT_PRECISION: u32 = 12;

/// Main configuration for the exporter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output configuration
    pub output: OutputConfig,
    /// Input source configuration
    pub source: SourceConfig,
    /// Feature engineering configuration
    pub features: FeatureConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the CSV files are written to
    pub dir: PathBuf,
    /// Decimals floats are rounded to before writing
    pub float_precision: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("./outputs/powerbi"), float_precision: 4 }
    }
}

/// Where raw records come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Embedded seeded generator
    #[default]
    Synthetic,
    /// players.csv, sessions.csv and wellness.csv in `data_dir`
    Files,
}

/// Input source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Directory holding the raw CSV files
    pub data_dir: PathBuf,
    /// Generator parameters
    pub synthetic: SyntheticConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { kind: SourceKind::Synthetic, data_dir: PathBuf::from("./data"), synthetic: SyntheticConfig::default() }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Pretty }
    }
}

impl ExportConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExportError::config(format!("cannot read {}: {e}", path.display())))?;
        let config: ExportConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override with environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Override from an arbitrary variable lookup
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup("LOADMON_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }

        if let Some(dir) = lookup("LOADMON_DATA_DIR") {
            self.source.data_dir = PathBuf::from(dir);
        }

        if let Some(seed) = lookup("LOADMON_SEED") {
            self.source.synthetic.seed =
                seed.parse().map_err(|_| ExportError::config(format!("LOADMON_SEED is not a number: {seed}")))?;
        }

        if let Some(level) = lookup("LOADMON_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.output.float_precision > MAX_FLOAT_PRECISION {
            return Err(ExportError::config(format!(
                "float_precision must be at most {MAX_FLOAT_PRECISION}, got {}",
                self.output.float_precision
            )));
        }

        if self.source.kind == SourceKind::Synthetic {
            self.source.synthetic.validate()?;
        }

        if !self.features.load_spike_pct.is_finite() || !self.features.readiness_z_threshold.is_finite() {
            return Err(ExportError::config("feature thresholds must be finite numbers"));
        }

        if !is_valid_log_filter(&self.logging.level) {
            return Err(ExportError::config(format!("Invalid log level: {}", self.logging.level)));
        }

        Ok(())
    }
}

/// A bare level or comma-separated `target=level` directives, levels in any case
fn is_valid_log_filter(filter: &str) -> bool {
    const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
    let is_level = |level: &str| LEVELS.contains(&level.trim().to_ascii_lowercase().as_str());

    !filter.trim().is_empty()
        && filter.split(',').all(|directive| match directive.split_once('=') {
            Some((target, level)) => !target.trim().is_empty() && is_level(level),
            None => is_level(directive),
        })
}
