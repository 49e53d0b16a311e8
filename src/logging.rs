use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;

/// Install a stderr subscriber for hosts without their own
///
/// `RUST_LOG` takes precedence over `debug` when set.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init(debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));

    // stderr keeps log lines out of the host's stdout
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")
}

/// Install the stderr subscriber at the level chosen by `debug_logging`
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_from_config(config: &Config) -> Result<()> {
    init(config.debug_logging)
}
