//! Log line rendering.
//!
//! [`render`] turns a [`LogEvent`] into a JSON document whose first four keys
//! are always `level`, `time`, `caller` and `msg`, followed by the event's
//! extra fields in attachment order. [`JsonFormat`] plugs that into a
//! `tracing_subscriber::fmt` layer; [`TextFormat`] is the plain-text variant
//! used during development.

use chrono::{DateTime, Local, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::observability::event::{is_extra_field_allowed, LogEvent};

/// Local-time ISO-8601 with millisecond precision and numeric offset.
pub const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// How the `time` key is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, serde::Serialize)]
pub enum TimeFormat {
    /// Seconds since the Unix epoch as a float.
    #[default]
    #[serde(rename = "seconds", alias = "epoch_seconds")]
    EpochSeconds,
    /// `YYYY-MM-DDTHH:MM:SS.mmm±hhmm` in local time.
    #[serde(rename = "iso8601")]
    Iso8601,
}

impl TimeFormat {
    pub fn render(self, timestamp: &DateTime<Utc>) -> Value {
        match self {
            TimeFormat::EpochSeconds => {
                Value::from(timestamp.timestamp_micros() as f64 / 1_000_000.0)
            }
            TimeFormat::Iso8601 => Value::String(
                timestamp
                    .with_timezone(&Local)
                    .format(ISO8601_FORMAT)
                    .to_string(),
            ),
        }
    }
}

/// Formatter settings. Built once at startup and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatterConfig {
    pub time_format: TimeFormat,
    /// Pretty-print width; `None` renders a single line.
    pub indent: Option<usize>,
}

/// Errors produced while rendering a log line.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("failed to serialize log event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The ordered JSON document for one event.
struct Document<'a> {
    event: &'a LogEvent,
    time: Value,
    caller: String,
}

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("level", self.event.level.lower_name())?;
        map.serialize_entry("time", &self.time)?;
        map.serialize_entry("caller", &self.caller)?;
        map.serialize_entry("msg", &self.event.message)?;
        for (name, value) in self.event.fields() {
            if is_extra_field_allowed(name) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

/// Render `event` as a JSON document (no trailing newline).
pub fn render(event: &LogEvent, config: &FormatterConfig) -> Result<Vec<u8>, FormatError> {
    let document = Document {
        event,
        time: config.time_format.render(&event.timestamp),
        caller: event.caller.render(),
    };

    match config.indent {
        None => Ok(serde_json::to_vec(&document)?),
        Some(width) => {
            let indent = vec![b' '; width];
            let mut out = Vec::with_capacity(256);
            let mut ser =
                serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
            document.serialize(&mut ser)?;
            Ok(out)
        }
    }
}

/// `tracing_subscriber` event format producing one JSON document per event.
#[derive(Debug, Clone)]
pub struct JsonFormat {
    config: Arc<FormatterConfig>,
}

impl JsonFormat {
    pub fn new(config: FormatterConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let log_event = LogEvent::from_tracing(event);
        let rendered = render(&log_event, &self.config).map_err(|_| fmt::Error)?;
        writeln!(writer, "{}", String::from_utf8_lossy(&rendered))
    }
}

/// Plain-text event format:
/// `LEVEL time caller msg key=value ...`
#[derive(Debug, Clone, Default)]
pub struct TextFormat;

fn write_text_value(writer: &mut Writer<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) if s.is_empty() || s.contains(char::is_whitespace) => {
            write!(writer, "{:?}", s)
        }
        Value::String(s) => writer.write_str(s),
        other => write!(writer, "{}", other),
    }
}

impl<S, N> FormatEvent<S, N> for TextFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let log_event = LogEvent::from_tracing(event);
        let time = log_event
            .timestamp
            .with_timezone(&Local)
            .format(ISO8601_FORMAT);

        write!(
            writer,
            "{:<5} {} {} ",
            log_event.level.upper_name(),
            time,
            log_event.caller.render()
        )?;
        write_text_value(&mut writer, &log_event.message)?;

        for (name, value) in log_event.fields() {
            write!(writer, " {}=", name)?;
            write_text_value(&mut writer, value)?;
        }
        writeln!(writer)
    }
}
