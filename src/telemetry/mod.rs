//! Telemetry setup
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` takes precedence over
//! the configured level.

use crate::config::TelemetryConfig;
use crate::errors::{EngineError, Result};
use tracing_subscriber::EnvFilter;

/// Build the log filter from the environment or the configured level
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| EngineError::ConfigError(format!("Invalid log filter '{}': {}", level, e)))
}

/// Initialize the tracing subscriber for logging
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<()> {
    let filter = build_filter(&config.log_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };

    installed.map_err(|e| EngineError::Generic(format!("Failed to install log subscriber: {}", e)))
}
