//! Tracing subscriber setup for the command-line tool.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ConfigError;

/// Installs the global `fmt` subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| ConfigError::Invalid(format!("invalid log level: {e}")))?,
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|_| ConfigError::Invalid("logging already initialized".into()))
}
