//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Install the logging subscriber before anything logs
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Command-line overrides are validated like file settings

use std::path::PathBuf;

use crate::config::validation::validate_config;
use crate::config::{load_config, ConfigError, ServiceConfig};
use crate::observability::logging::{self, LoggingError};

/// Errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
}

/// Startup inputs gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// TOML configuration file; defaults are used when absent.
    pub config_path: Option<PathBuf>,
    /// Overrides `listener.bind_address`.
    pub bind_address: Option<String>,
}

/// Resolve the effective configuration without touching global state.
pub fn resolve_config(options: &StartupOptions) -> Result<ServiceConfig, ConfigError> {
    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(bind_address) = &options.bind_address {
        config.listener.bind_address = bind_address.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    Ok(config)
}

/// Resolve configuration and install logging.
pub fn initialize(options: &StartupOptions) -> Result<ServiceConfig, StartupError> {
    let config = resolve_config(options)?;
    logging::init(&config.logging)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        log_format = ?config.logging.format,
        time_format = ?config.logging.time_format,
        "Configuration loaded"
    );
    Ok(config)
}
