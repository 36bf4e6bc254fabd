//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::observability::format::{FormatterConfig, TimeFormat};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Logging and request journal settings.
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Output format of the log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON document per line.
    #[default]
    Json,
    /// Human-readable text, for local development.
    Text,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` directive).
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Representation of the `time` key.
    pub time_format: TimeFormat,

    /// Pretty-print indent width; unset for one line per event.
    pub indent: Option<usize>,

    /// Include the request body in the request dump of failed requests.
    pub dump_request_body: bool,

    /// Maximum request body size buffered for the dump, in bytes.
    pub max_body_size: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            time_format: TimeFormat::EpochSeconds,
            indent: None,
            dump_request_body: false,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

impl LoggingConfig {
    /// Formatter settings derived from this configuration.
    pub fn formatter_config(&self) -> FormatterConfig {
        FormatterConfig {
            time_format: self.time_format,
            indent: self.indent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.time_format, TimeFormat::EpochSeconds);
        assert_eq!(config.logging.indent, None);
        assert!(!config.logging.dump_request_body);
    }

    #[test]
    fn test_partial_logging_section() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [logging]
            time_format = "iso8601"
            indent = 4
            format = "text"
            "#,
        )
        .unwrap();
        let formatter = config.logging.formatter_config();
        assert_eq!(formatter.time_format, TimeFormat::Iso8601);
        assert_eq!(formatter.indent, Some(4));
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.logging.level, "info");
    }
}
