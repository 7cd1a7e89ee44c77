//! Error boundary for unhandled failures.
//!
//! # Responsibilities
//! - Attach `stacktrace`/`panic` to the request's entry in JSON mode
//! - Otherwise print the trace to stderr, outside structured logging
//! - Produce a fixed 500 response carrying the failure message
//!
//! The completion record is still written by the middleware afterwards.

use axum::{
    http::{Extensions, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::context::{request_config, RequestEntry};
use crate::logging::field::{PANIC_KEY, STACKTRACE_KEY};
use crate::logging::Failure;

/// Handler error that should be recorded on the request's log entry.
///
/// Returning `Err(UnhandledError)` from a handler yields a 500 response; when
/// the request logging middleware is installed it routes the failure through
/// [`recovery_handler`].
#[derive(Debug, Clone)]
pub struct UnhandledError(Failure);

impl UnhandledError {
    pub fn new(failure: Failure) -> Self {
        Self(failure)
    }

    pub fn failure(&self) -> &Failure {
        &self.0
    }
}

impl<E> From<E> for UnhandledError
where
    E: std::error::Error + 'static,
{
    fn from(err: E) -> Self {
        Self(Failure::from_error(&err))
    }
}

impl IntoResponse for UnhandledError {
    fn into_response(self) -> Response {
        let mut response = failure_response(&self.0);
        response.extensions_mut().insert(self);
        response
    }
}

fn failure_response(failure: &Failure) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, failure.message().to_string()).into_response()
}

/// Record `failure` against the request found in `context` and build the
/// fallback response.
pub fn recovery_handler(failure: &Failure, context: &Extensions) -> Response {
    let json = request_config(context).is_some_and(|config| config.is_json());
    match RequestEntry::from_extensions(context) {
        Ok(entry) if json => {
            entry.set_root(STACKTRACE_KEY, failure.trace());
            entry.set_root(PANIC_KEY, failure.message());
        }
        _ => eprintln!("{}", failure.trace()),
    }
    failure_response(failure)
}
