//! Logging and tracing setup

use crate::config::{LogFormat, LoggingConfig};
use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, prelude::*, util::SubscriberInitExt, EnvFilter};

/// Initialize logging from configuration
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr so stdout stays free for the list of written files.
pub fn initialize_logging(config: &LoggingConfig) -> Result<()> {
    // Set up environment filter
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level: {}", config.level))?,
    };

    // Set up formatting layer based on format
    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer().json().with_target(true).with_writer(std::io::stderr).boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).with_writer(std::io::stderr).boxed(),
    };

    // Initialize the subscriber
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Logging is already initialized")?;

    Ok(())
}
