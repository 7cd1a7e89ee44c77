//! Structured request logging for axum services.
//!
//! A leveled [`Logger`] with root/path field scoping, a per-request
//! [`LogEntry`] accumulator, and a middleware that writes exactly one record
//! per request.

pub mod config;
pub mod http;
pub mod logging;

pub use config::{ConfigError, LoggerConfig};
pub use http::{recovery_handler, request_logging, LookupError, RequestEntry, UnhandledError};
pub use logging::{Failure, Field, Level, LogEntry, Logger, Scope, Sink};
