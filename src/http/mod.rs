//! HTTP request logging subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → middleware.rs (create entry, attach to request extensions)
//!     → request.rs (httpRequest bag, header redaction, client IP)
//!     → application handlers (RequestEntry extractor from context.rs)
//!     → recovery.rs (panics / UnhandledError → fields + 500)
//!     → middleware.rs (httpResponse bag, one completion record)
//! ```

pub mod context;
pub mod middleware;
pub mod recovery;
pub mod request;

pub use context::{request_config, LookupError, RequestEntry};
pub use middleware::{request_logging, X_REQUEST_ID};
pub use recovery::{recovery_handler, UnhandledError};
pub use request::REDACTED;
