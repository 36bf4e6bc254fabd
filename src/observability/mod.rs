//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request middleware and handlers emit tracing events
//!     → event.rs (LogEvent: fixed fields + ordered extras)
//!     → format.rs (JSON document or text line)
//!     → logging.rs (subscriber, filter, stdout sink)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - One line per event, stable key order
//! - Formatter configuration is immutable after startup

pub mod event;
pub mod format;
pub mod level;
pub mod logging;

pub use event::{LogEvent, SourceLocation};
pub use format::{render, FormatterConfig, JsonFormat, TextFormat, TimeFormat};
pub use level::Severity;
