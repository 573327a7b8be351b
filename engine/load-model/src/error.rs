//! Error types for the load model

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for load model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while loading, validating or deriving athlete load data
#[derive(Error, Debug)]
pub enum ModelError {
    /// I/O errors while reading input files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An expected input file does not exist
    #[error("Missing input file: {}", .0.display())]
    MissingFile(PathBuf),

    /// Input table lacks required columns
    #[error("{table} is missing required columns: {missing:?}")]
    Schema { table: String, missing: Vec<String> },

    /// A date cell could not be parsed
    #[error("Failed to parse date '{value}' in {table} (line {line})")]
    Date { table: String, line: usize, value: String },

    /// A value falls outside its accepted range
    #[error("{table}.{column} out of range: {value} (expected {expected})")]
    Range { table: String, column: String, value: f64, expected: String },

    /// Two rows share the same (player, date) key
    #[error("Duplicate {table} entry for player {player_id} on {date}")]
    DuplicateKey { table: String, player_id: String, date: NaiveDate },

    /// The roster lists the same player twice
    #[error("Duplicate player in roster: {0}")]
    DuplicatePlayer(String),

    /// A record references a player that is not in the roster
    #[error("Unknown player referenced: {0}")]
    UnknownPlayer(String),

    /// Invalid generation or feature parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ModelError {
    /// Create a new range error
    pub fn range(table: &str, column: &str, value: f64, expected: impl Into<String>) -> Self {
        Self::Range {
            table: table.to_string(),
            column: column.to_string(),
            value,
            expected: expected.into(),
        }
    }

    /// Create a new duplicate key error
    pub fn duplicate_key(table: &str, player_id: &str, date: NaiveDate) -> Self {
        Self::DuplicateKey { table: table.to_string(), player_id: player_id.to_string(), date }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
