//! Request lifecycle logging middleware.
//!
//! Outermost layer of the stack. It creates the [`RequestContext`], runs the
//! rest of the chain, then emits the request's journal entries:
//! - no recorded errors: one `info` event whose message is the path
//! - recorded errors: a raw request dump is appended, then one `error`
//!   event per entry whose message is the entry's index

use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use std::net::SocketAddr;

use crate::config::LoggingConfig;
use crate::http::context::RequestContext;
use crate::http::dump::{BodyCapture, RequestSnapshot};

/// Target under which request journal events are emitted.
pub const ACCESS_TARGET: &str = "request_journal::access";

/// Inbound header carrying the caller-supplied request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Settings read by [`lifecycle_logger`].
#[derive(Debug, Clone)]
pub struct JournalSettings {
    pub dump_request_body: bool,
    pub max_body_size: usize,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self::from(&LoggingConfig::default())
    }
}

impl From<&LoggingConfig> for JournalSettings {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            dump_request_body: config.dump_request_body,
            max_body_size: config.max_body_size,
        }
    }
}

fn header_str(headers: &HeaderMap, name: impl header::AsHeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// `user_id` narrowed to a type `tracing` can record natively.
enum UserIdField<'a> {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
    Text(&'a str),
    /// null, arrays and objects are logged as their JSON text
    Json(String),
}

impl<'a> From<&'a Value> for UserIdField<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    UserIdField::Signed(v)
                } else if let Some(v) = n.as_u64() {
                    UserIdField::Unsigned(v)
                } else {
                    UserIdField::Float(n.as_f64().unwrap_or_default())
                }
            }
            Value::Bool(v) => UserIdField::Bool(*v),
            Value::String(v) => UserIdField::Text(v.as_str()),
            other => UserIdField::Json(other.to_string()),
        }
    }
}

/// Emit one journal event carrying every shared field of `$record`.
macro_rules! journal_event {
    (@with $level:ident, $record:expr, $user_id:expr, $($tail:tt)+) => {
        tracing::$level!(
            target: ACCESS_TARGET,
            method = $record.method.as_str(),
            url = $record.url.as_str(),
            status = $record.status,
            user_id = $user_id,
            request_id = $record.request_id.as_str(),
            remote_address = $record.remote_address.as_str(),
            user_agent = $record.user_agent.as_str(),
            latency = $record.latency,
            $($tail)+
        )
    };
    ($level:ident, $record:expr, $($tail:tt)+) => {
        match UserIdField::from(&$record.user_id) {
            UserIdField::Signed(v) => journal_event!(@with $level, $record, v, $($tail)+),
            UserIdField::Unsigned(v) => journal_event!(@with $level, $record, v, $($tail)+),
            UserIdField::Float(v) => journal_event!(@with $level, $record, v, $($tail)+),
            UserIdField::Bool(v) => journal_event!(@with $level, $record, v, $($tail)+),
            UserIdField::Text(v) => journal_event!(@with $level, $record, v, $($tail)+),
            UserIdField::Json(v) => journal_event!(@with $level, $record, v.as_str(), $($tail)+),
        }
    };
}

/// Fields shared by every event emitted for one request.
struct AccessRecord {
    method: String,
    url: String,
    status: u16,
    user_id: Value,
    request_id: String,
    remote_address: String,
    user_agent: String,
    latency: f64,
}

impl AccessRecord {
    fn completed(&self) {
        journal_event!(info, self, "{}", self.url);
    }

    fn failed(&self, index: usize, error: &str) {
        journal_event!(error, self, error = error, "{}", index);
    }
}

/// Buffer the body for the dump only when its size is known to fit.
///
/// Bodies that may exceed the limit pass through untouched; the handler
/// always receives the body as sent.
async fn capture_body(
    request: Request<Body>,
    settings: &JournalSettings,
) -> (Request<Body>, BodyCapture) {
    if !settings.dump_request_body {
        return (request, BodyCapture::Skipped);
    }

    let fits = request
        .body()
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= settings.max_body_size as u64);
    if !fits {
        return (request, BodyCapture::NotCaptured);
    }

    let (parts, body) = request.into_parts();
    match axum::body::to_bytes(body, settings.max_body_size).await {
        Ok(bytes) => (
            Request::from_parts(parts, Body::from(bytes.clone())),
            BodyCapture::Captured(bytes),
        ),
        Err(e) => {
            // Only reachable when the body stream itself fails; the handler
            // would have seen the same failure.
            tracing::debug!(error = %e, "Request body unreadable");
            (
                Request::from_parts(parts, Body::empty()),
                BodyCapture::Unreadable(e.to_string()),
            )
        }
    }
}

/// Middleware function journaling every request.
///
/// Must wrap [`recovery`](super::recovery::recovery); see
/// [`instrument`](crate::http::server::instrument).
pub async fn lifecycle_logger(
    State(settings): State<JournalSettings>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ctx = RequestContext::new();

    let (mut request, body) = capture_body(request, &settings).await;
    // Sole initialization point; replaces anything an earlier layer left behind.
    request.extensions_mut().insert(ctx.clone());

    let snapshot = RequestSnapshot {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        version: request.version(),
        headers: request.headers().clone(),
        body,
    };
    let remote_address = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    let response = next.run(request).await;

    let record = AccessRecord {
        method: snapshot.method.to_string(),
        url: snapshot.path.clone(),
        status: response.status().as_u16(),
        user_id: ctx.user_id(),
        request_id: header_str(&snapshot.headers, X_REQUEST_ID),
        remote_address,
        user_agent: header_str(&snapshot.headers, header::USER_AGENT),
        latency: ctx.elapsed().as_secs_f64(),
    };

    if ctx.has_errors() {
        ctx.push_error(snapshot.render());
        for (index, error) in ctx.errors().iter().enumerate() {
            record.failed(index, error);
        }
    } else {
        record.completed();
    }

    response
}
