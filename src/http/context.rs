//! Request-scoped access to the log entry.
//!
//! The middleware stores a [`RequestEntry`] and the logger config in the
//! request extensions. Handlers take `RequestEntry` as an extractor; it is
//! rejected with [`LookupError`] when the middleware is not installed.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Extensions, Request, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::config::LoggerConfig;
use crate::logging::{Field, Level, LogEntry};

/// The entry was requested but no middleware attached one upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request logger entry not found; is the request logging middleware installed?")]
pub struct LookupError;

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Log entry lookup failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Shared handle to the current request's [`LogEntry`].
#[derive(Debug, Clone)]
pub struct RequestEntry(Arc<Mutex<LogEntry>>);

impl RequestEntry {
    pub fn new(entry: LogEntry) -> Self {
        Self(Arc::new(Mutex::new(entry)))
    }

    pub fn from_extensions(extensions: &Extensions) -> Result<Self, LookupError> {
        extensions.get::<RequestEntry>().cloned().ok_or(LookupError)
    }

    pub fn from_request<B>(req: &Request<B>) -> Result<Self, LookupError> {
        Self::from_extensions(req.extensions())
    }

    fn lock(&self) -> MutexGuard<'_, LogEntry> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` with exclusive access to the entry.
    pub fn with<R>(&self, f: impl FnOnce(&mut LogEntry) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.lock().set(key, value);
    }

    pub fn set_root(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.lock().set_root(key, value);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn get_root(&self, key: &str) -> Option<Value> {
        self.lock().get_root(key).cloned()
    }

    pub fn log(&self, level: Level, message: &str, fields: Vec<Field>) {
        self.lock().log(level, message, fields);
    }

    pub fn debug(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::Debug, message, fields);
    }

    pub fn info(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::Info, message, fields);
    }

    pub fn warn(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::Warn, message, fields);
    }

    pub fn error(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::Error, message, fields);
    }

    pub fn critical(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::Critical, message, fields);
    }
}

impl<S> FromRequestParts<S> for RequestEntry
where
    S: Send + Sync,
{
    type Rejection = LookupError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_extensions(&parts.extensions)
    }
}

/// Config attached to the request by the middleware.
pub fn request_config(extensions: &Extensions) -> Option<Arc<LoggerConfig>> {
    extensions.get::<Arc<LoggerConfig>>().cloned()
}
