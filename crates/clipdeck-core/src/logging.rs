//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::LoggingConfig;

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` wins over the configured level. Returns `false` when a
/// subscriber was already installed, in which case that one stays active.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = FmtSubscriber::builder().with_env_filter(filter);
    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.with_target(true).finish())
    };
    installed.is_ok()
}
