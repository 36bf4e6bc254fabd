//! Request middleware.
//!
//! # Stack (outermost first)
//! ```text
//! lifecycle_logger (context, timing, journal events)
//!     → recovery (panic boundary, forced 500)
//!     → handlers (may push entries into RequestContext)
//! ```

pub mod lifecycle;
pub mod recovery;

pub use lifecycle::{lifecycle_logger, JournalSettings, ACCESS_TARGET, X_REQUEST_ID};
pub use recovery::recovery;
