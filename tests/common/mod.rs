//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

use request_journal::config::LoggingConfig;
use request_journal::observability::format::{FormatterConfig, JsonFormat, TextFormat};
use request_journal::{instrument, RequestContext};

/// In-memory log sink; each event arrives as one write.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    pub fn text(&self) -> String {
        String::from_utf8(self.buffer.lock().unwrap().clone()).unwrap()
    }

    /// Every captured line parsed as JSON.
    pub fn events(&self) -> Vec<Value> {
        self.text()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Captured request journal events only.
    pub fn journal(&self) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|e| e.get("url").is_some())
            .collect()
    }
}

/// Install a thread-local plain-text subscriber writing into a fresh buffer.
pub fn capture_text_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .event_format(TextFormat::default())
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

/// Install a thread-local JSON subscriber writing into a fresh buffer.
pub fn capture_logs(config: FormatterConfig) -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .event_format(JsonFormat::new(config))
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

async fn health() -> &'static str {
    "ok"
}

async fn orders() -> StatusCode {
    panic!("order store unavailable");
}

async fn validate(ctx: RequestContext) -> StatusCode {
    ctx.push_error("quantity must be positive");
    ctx.push_error("sku is required");
    StatusCode::BAD_REQUEST
}

async fn profile(ctx: RequestContext) -> &'static str {
    ctx.set_user_id(42);
    "profile"
}

async fn account(ctx: RequestContext) -> &'static str {
    ctx.set_user_id("user-7f3a");
    "account"
}

/// Rejects every payload, replying with the number of bytes it received.
async fn echo(ctx: RequestContext, body: Bytes) -> String {
    ctx.push_error("rejected payload");
    body.len().to_string()
}

async fn late_panic(ctx: RequestContext) -> StatusCode {
    ctx.push_error("recorded before the fault");
    panic!("fault after recording");
}

pub fn test_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/orders", get(orders))
        .route("/orders/validate", post(validate))
        .route("/profile", get(profile))
        .route("/account", get(account))
        .route("/echo", post(echo))
        .route("/late-panic", get(late_panic))
}

pub fn test_app(config: &LoggingConfig) -> Router {
    instrument(test_routes(), config)
}

pub fn get_request(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("host", "journal.test")
        .body(Body::empty())
        .unwrap()
}
