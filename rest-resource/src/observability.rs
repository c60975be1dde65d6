//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Initialize the global tracing subscriber
///
/// Logs are JSON formatted, except in the `dev` environment where the
/// human-readable pretty format is used. `service.log_level` accepts any
/// `EnvFilter` directive and falls back to `info` when it cannot be parsed.
///
/// Calling this more than once is harmless; only the first subscriber wins.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = build_filter(&config.service.log_level);

    let installed = if config.service.environment == "dev" {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed, keeping it");
        return Ok(());
    }

    tracing::info!(
        service = %config.service.name,
        environment = %config.service.environment,
        "Tracing initialized"
    );

    Ok(())
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}
