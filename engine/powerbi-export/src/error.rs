//! Error types for the exporter

use load_model::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while building or writing the export
#[derive(Error, Debug)]
pub enum ExportError {
    /// Loading, validating or deriving the source data failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output directory could not be created
    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir { path: PathBuf, source: std::io::Error },

    /// A table could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: csv::Error },

    /// TOML configuration could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// TOML configuration could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A value used in an output file name is not a plain name
    #[error("Unsafe output file name component: {0:?}")]
    UnsafeFileName(String),

    /// Requested player or date has no data
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ExportError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        Self::Write { path: path.into(), source: source.into() }
    }
}
