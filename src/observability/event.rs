//! Log events as seen by the formatter.
//!
//! A [`LogEvent`] is split into a fixed part (level, message, timestamp,
//! caller) and an insertion-ordered map of extra fields. Extra fields may
//! never shadow the fixed keys: [`LogEvent::insert_field`] drops them.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::Event;

use crate::observability::level::Severity;

/// Keys owned by the formatter or by the logging machinery.
pub const RESERVED_FIELDS: &[&str] = &["level", "time", "caller", "msg", "message"];

/// Prefixes marking internal-use fields.
pub const INTERNAL_PREFIXES: &[&str] = &["_", "log."];

/// Returns `true` if `name` may be attached to an event as an extra field.
pub fn is_extra_field_allowed(name: &str) -> bool {
    !RESERVED_FIELDS.contains(&name) && !INTERNAL_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Source location an event was emitted from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// `<dir>/<file>:<line>`, keeping only the last two path segments.
    pub fn render(&self) -> String {
        let file = match self.file.as_deref() {
            Some(path) => {
                let segments: Vec<&str> = path.split(['/', '\\']).collect();
                let start = segments.len().saturating_sub(2);
                segments[start..].join("/")
            }
            None => "<unknown>".to_string(),
        };
        format!("{}:{}", file, self.line.unwrap_or(0))
    }
}

/// A single log line before rendering.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Severity,
    pub message: Value,
    pub timestamp: DateTime<Utc>,
    pub caller: SourceLocation,
    fields: Map<String, Value>,
}

impl LogEvent {
    /// Create an event stamped with the current time.
    pub fn new(level: Severity, message: impl Into<Value>, caller: SourceLocation) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            caller,
            fields: Map::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach an extra field.
    ///
    /// Returns `false` and drops the value if the name is reserved or
    /// carries an internal prefix. Re-inserting an existing name replaces
    /// the value in place.
    pub fn insert_field(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        let name = name.into();
        if !is_extra_field_allowed(&name) {
            return false;
        }
        self.fields.insert(name, value.into());
        true
    }

    /// Builder form of [`insert_field`](Self::insert_field).
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert_field(name, value);
        self
    }

    /// Extra fields in attachment order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Capture a `tracing` event.
    pub fn from_tracing(event: &Event<'_>) -> Self {
        let meta = event.metadata();
        let caller = SourceLocation {
            file: meta.file().map(str::to_string),
            line: meta.line(),
        };
        let mut log_event = LogEvent::new(Severity::from(*meta.level()), Value::Null, caller);

        let mut visitor = FieldVisitor {
            event: &mut log_event,
            message: None,
        };
        event.record(&mut visitor);
        if let Some(message) = visitor.message.take() {
            log_event.message = message;
        }
        log_event
    }
}

/// Collects `tracing` fields into a [`LogEvent`].
struct FieldVisitor<'a> {
    event: &'a mut LogEvent,
    message: Option<Value>,
}

impl FieldVisitor<'_> {
    fn record_value(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.event.insert_field(field.name(), value);
        }
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_value(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, Value::String(format!("{:?}", value)));
    }
}
