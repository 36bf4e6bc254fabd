//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and parseable addresses/filters
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ServiceConfig;

/// Largest accepted pretty-print indent.
pub const MAX_INDENT: usize = 16;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("logging.level {0:?} is not a valid filter directive")]
    Level(String),

    #[error("logging.indent {0} exceeds {max}", max = MAX_INDENT)]
    Indent(usize),

    #[error("logging.max_body_size must be greater than zero")]
    MaxBodySize,
}

/// Check `config` and collect every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if EnvFilter::try_new(&config.logging.level).is_err() {
        errors.push(ValidationError::Level(config.logging.level.clone()));
    }

    if let Some(indent) = config.logging.indent {
        if indent > MAX_INDENT {
            errors.push(ValidationError::Indent(indent));
        }
    }

    if config.logging.max_body_size == 0 {
        errors.push(ValidationError::MaxBodySize);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
