//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware composition)
//!     → middleware/lifecycle.rs (creates RequestContext, starts clock)
//!     → middleware/recovery.rs (panic boundary)
//!     → application handlers (extract RequestContext explicitly)
//!     → middleware/lifecycle.rs (journal events, dump.rs on failure)
//!     → Send to client
//! ```

pub mod context;
pub mod dump;
pub mod middleware;
pub mod server;

pub use context::{RequestContext, UNKNOWN_USER_ID};
pub use server::{instrument, HttpServer};
