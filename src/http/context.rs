//! Per-request context.
//!
//! A [`RequestContext`] is created by the lifecycle middleware for every
//! request and stored in the request extensions. Handlers and inner
//! middleware take it as an explicit extractor argument and push
//! diagnostic entries into it; the lifecycle middleware reads it back once
//! the response is ready.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Logged as `user_id` when authentication never identified the caller.
pub const UNKNOWN_USER_ID: i64 = -1;

#[derive(Debug, Default)]
struct ContextState {
    errors: Vec<String>,
    user_id: Option<Value>,
}

/// Handle to the mutable state of one in-flight request.
///
/// Cloning the handle is cheap; all clones see the same state. A context
/// is never shared between requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    state: Arc<Mutex<ContextState>>,
    start_time: Instant,
}

impl RequestContext {
    /// Fresh context with an empty error collection, started now.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ContextState::default())),
            start_time: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ContextState> {
        // A panicking handler may poison the lock; the entries are still valid.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a diagnostic entry.
    pub fn push_error(&self, entry: impl Into<String>) {
        self.lock().errors.push(entry.into());
    }

    /// Snapshot of the recorded entries, in insertion order.
    pub fn errors(&self) -> Vec<String> {
        self.lock().errors.clone()
    }

    pub fn error_count(&self) -> usize {
        self.lock().errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.lock().errors.is_empty()
    }

    /// Record the authenticated caller. Any JSON value is accepted: numeric
    /// ids, opaque string ids, or a structured principal.
    pub fn set_user_id(&self, user_id: impl Into<Value>) {
        self.lock().user_id = Some(user_id.into());
    }

    /// Authenticated caller, or [`UNKNOWN_USER_ID`].
    pub fn user_id(&self) -> Value {
        self.lock()
            .user_id
            .clone()
            .unwrap_or_else(|| Value::from(UNKNOWN_USER_ID))
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<RequestContext>() {
            Some(ctx) => Ok(ctx.clone()),
            None => {
                tracing::error!(
                    path = %parts.uri.path(),
                    "RequestContext missing; the lifecycle logger middleware is not installed"
                );
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
