//! Structured logging core.
//!
//! # Data Flow
//! ```text
//! application / middleware
//!     → entry.rs (accumulate root + path fields for one request)
//!     → logger.rs (merge base fields, namespace path fields)
//!     → field.rs (fold fields, detect errors, promote level)
//!     → sink.rs (filter, render, write)
//! ```
//!
//! # Design Decisions
//! - Fields are `serde_json` objects; any JSON value may be logged
//! - One entry per unit of work, never shared between requests
//! - Sinks own filtering and rendering; the core never formats output

pub mod entry;
pub mod field;
pub mod level;
pub mod logger;
pub mod sink;

pub use entry::{LogEntry, Scope};
pub use field::{Failure, Field, Fields, Traceable};
pub use level::{level_for_status, status_label, Level};
pub use logger::{Logger, DEFAULT_PATH};
pub use sink::{CapturedRecord, ConsoleSink, Format, MemorySink, Sink, TracingSink};
