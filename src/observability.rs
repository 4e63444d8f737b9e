use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::error::{AppError, Result};

/// Build the log filter: `RUST_LOG` wins, otherwise the configured level
pub fn env_filter(config: &ObservabilityConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            AppError::Configuration(format!("Invalid log level '{}': {}", config.log_level, e))
        })
}

/// Install the global subscriber; diagnostics go to stderr so stdout stays clean
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config)?);

    let result = if config.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| AppError::Internal(format!("Failed to initialize tracing: {}", e)))
}
