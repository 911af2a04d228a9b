//! Tracing subscriber setup.

use anyhow::{Context, Result};
use parapet_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Builds the event filter: `RUST_LOG` when set, the configured level
/// otherwise.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log filter '{}'", config.level)),
    }
}

/// Installs the global `fmt` subscriber.
///
/// Returns `false` when a global subscriber was already installed, which
/// leaves that subscriber in place.
pub fn init(config: &LoggingConfig) -> Result<bool> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init().is_ok(),
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
        LogFormat::Full => builder.try_init().is_ok(),
    };

    Ok(installed)
}
