//! Tracing subscriber setup.
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;
use crate::errors::ServiceError;

const DEFAULT_FILTER: &str = "forum_votes=info,forum_votes_core=info,forum_votes_repository=info";

/// Initialize tracing with an `EnvFilter` taken from `RUST_LOG`, falling back to
/// info level for the service crates.
pub fn init_tracing(format: LogFormat) -> Result<(), ServiceError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).pretty())
            .try_init(),
    };

    result.map_err(|e| ServiceError::config(format!("Failed to initialize tracing: {}", e)))
}
