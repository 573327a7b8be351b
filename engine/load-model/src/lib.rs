//! # Load Model
//!
//! Athlete monitoring records and the feature engineering behind the Power BI
//! export: session load (minutes x sRPE), rolling acute/chronic workload,
//! wellness-based readiness and simple practitioner flags.
//!
//! ## Architecture
//!
//! - **types**: raw players, sessions and wellness questionnaires
//! - **ingest**: CSV loading with schema checks
//! - **synthetic**: seeded squad generator
//! - **preprocess**: range checks, ordering, missing-data policies
//! - **features**: rolling load, readiness, daily merge, flags
//!
//! ## Usage
//!
//! ```rust
//! use load_model::{build_daily, synthetic, FeatureConfig, SyntheticConfig};
//!
//! let dataset = synthetic::generate(&SyntheticConfig { players: 2, days: 10, ..Default::default() })?;
//! let (_players, daily) = build_daily(dataset, &FeatureConfig::default())?;
//! assert_eq!(daily.len(), 20);
//! # Ok::<(), load_model::ModelError>(())
//! ```

pub mod error;
pub mod features;
pub mod ingest;
pub mod preprocess;
pub mod synthetic;
pub mod types;

pub use error::{ModelError, Result};
pub use features::{build_daily, DailyRecord, FeatureConfig, ACUTE_WINDOW_DAYS, CHRONIC_WINDOW_DAYS};
pub use ingest::load_dataset;
pub use preprocess::{GapPolicy, WellnessFill};
pub use synthetic::SyntheticConfig;
pub use types::{Player, RawDataset, Session, Wellness};

pub use chrono::NaiveDate;
