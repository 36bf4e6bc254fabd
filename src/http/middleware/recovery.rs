//! Panic recovery middleware.
//!
//! Runs the rest of the chain inside a fault boundary. A panic anywhere
//! below it is turned into a diagnostic trace appended to the request's
//! [`RequestContext`] and a bare `500 Internal Server Error` response; the
//! client never sees the trace.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Once;

use crate::http::context::RequestContext;

thread_local! {
    /// Trace of the most recent panic on this thread.
    static LAST_PANIC: RefCell<Option<String>> = const { RefCell::new(None) };
    /// Number of recovery boundaries currently being polled on this thread.
    static BOUNDARY_DEPTH: Cell<usize> = const { Cell::new(0) };
}

static PANIC_HOOK: Once = Once::new();

/// Message carried by a panic payload.
pub fn payload_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Box<dyn Any>"
    }
}

/// Install the process-wide hook that records panic sites and backtraces.
///
/// Panics raised inside a recovery boundary are recorded only; all others
/// are also passed to the previously installed hook.
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "<unknown>".to_string());
            let trace = format!(
                "panicked at {}:\n{}\n{}",
                location,
                payload_message(info.payload()),
                Backtrace::force_capture()
            );
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(trace));

            if BOUNDARY_DEPTH.with(Cell::get) == 0 {
                previous(info);
            }
        }));
    });
}

/// Marks the current thread as polling inside a recovery boundary.
struct BoundaryScope;

impl BoundaryScope {
    /// Any trace left on this thread belongs to an earlier, already handled
    /// panic; it is discarded so it cannot be attributed to this poll.
    fn enter() -> Self {
        LAST_PANIC.with(|slot| slot.borrow_mut().take());
        BOUNDARY_DEPTH.with(|depth| depth.set(depth.get() + 1));
        BoundaryScope
    }
}

impl Drop for BoundaryScope {
    fn drop(&mut self) {
        BOUNDARY_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Take the trace recorded by the hook for `payload`.
fn take_trace(payload: &(dyn Any + Send)) -> String {
    LAST_PANIC
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(|| format!("panicked:\n{}", payload_message(payload)))
}

/// Middleware function converting panics into `500` responses.
///
/// Expects the [`RequestContext`] installed by the lifecycle logger.
pub async fn recovery(request: Request<Body>, next: Next) -> Response {
    install_panic_hook();
    let ctx = request.extensions().get::<RequestContext>().cloned();

    let mut guarded = std::pin::pin!(AssertUnwindSafe(next.run(request)).catch_unwind());
    let outcome = std::future::poll_fn(|cx| {
        let _scope = BoundaryScope::enter();
        guarded.as_mut().poll(cx)
    })
    .await;

    match outcome {
        Ok(response) => response,
        Err(payload) => {
            let trace = take_trace(&*payload);
            match ctx {
                Some(ctx) => ctx.push_error(trace),
                None => tracing::error!(
                    error = trace.as_str(),
                    "Request panicked outside of a request context"
                ),
            }
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
