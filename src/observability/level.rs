//! Log severity and its canonical names.

use std::fmt;
use std::str::FromStr;

/// Severity of a log event.
///
/// The JSON output always carries the lower-case name; the upper-case
/// name is used by the plain-text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    /// Lower-case canonical name (`fatal`, `error`, `warn`, `info`, `debug`).
    pub fn lower_name(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }

    /// Upper-case canonical name (`FATAL`, `ERROR`, `WARN`, `INFO`, `DEBUG`).
    pub fn upper_name(self) -> &'static str {
        match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::INFO => Severity::Info,
            // TRACE folds into debug
            _ => Severity::Debug,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lower_name())
    }
}

/// Error returned when a severity name is not recognised.
#[derive(Debug, thiserror::Error)]
#[error("unknown severity: {0}")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fatal" | "critical" => Ok(Severity::Fatal),
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warn),
            "info" => Ok(Severity::Info),
            "debug" | "trace" => Ok(Severity::Debug),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_tables() {
        let all = [
            (Severity::Fatal, "fatal", "FATAL"),
            (Severity::Error, "error", "ERROR"),
            (Severity::Warn, "warn", "WARN"),
            (Severity::Info, "info", "INFO"),
            (Severity::Debug, "debug", "DEBUG"),
        ];
        for (severity, lower, upper) in all {
            assert_eq!(severity.lower_name(), lower);
            assert_eq!(severity.upper_name(), upper);
            assert_eq!(severity.to_string(), lower);
        }
    }

    #[test]
    fn test_from_tracing_level() {
        assert_eq!(Severity::from(tracing::Level::ERROR), Severity::Error);
        assert_eq!(Severity::from(tracing::Level::WARN), Severity::Warn);
        assert_eq!(Severity::from(tracing::Level::INFO), Severity::Info);
        assert_eq!(Severity::from(tracing::Level::DEBUG), Severity::Debug);
        assert_eq!(Severity::from(tracing::Level::TRACE), Severity::Debug);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("CRITICAL".parse::<Severity>().unwrap(), Severity::Fatal);
        assert_eq!("Warning".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warn);
        assert!("verbose".parse::<Severity>().is_err());
    }
}
