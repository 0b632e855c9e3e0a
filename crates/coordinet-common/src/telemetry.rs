//! Log subscriber setup shared by the registry and node binaries.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::CoordinetError;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`. `json` switches to one JSON
/// object per line.
pub fn init_logging(level: &str, json: bool) -> Result<(), CoordinetError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| CoordinetError::Config(format!("log level {level:?}: {e}")))?,
    };

    let subscriber = tracing_subscriber::registry().with(filter);
    let installed = if json {
        subscriber.with(fmt::layer().json()).try_init()
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init()
    };

    installed.map_err(|e| CoordinetError::Config(format!("logging already initialized: {e}")))
}
