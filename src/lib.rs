//! Request journal: per-request structured logging for axum services.
//!
//! Every request gets a [`RequestContext`] that handlers can record
//! errors into. When the request completes, the lifecycle middleware emits
//! one JSON log line for a clean request, or one line per recorded error
//! plus a raw request dump. Panics are caught below it and turned into a
//! bare `500` with the panic trace recorded as an error.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::{instrument, HttpServer, RequestContext};
pub use lifecycle::Shutdown;
