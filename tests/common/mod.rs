//! Shared fixtures for the middleware integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower::ServiceExt;

use reqlog::logging::MemorySink;
use reqlog::{request_logging, Field, Logger, LoggerConfig, RequestEntry, UnhandledError};

/// Logger writing into a fresh in-memory sink.
pub fn logger(config: LoggerConfig) -> (Logger, MemorySink) {
    let sink = MemorySink::new();
    let logger = Logger::with_sink(config, Arc::new(sink.clone())).unwrap();
    (logger, sink)
}

/// Router with one route per scenario, wrapped in the logging middleware.
pub fn app(logger: Logger) -> Router {
    Router::new()
        .route("/", get(|| async { "welcome" }))
        .route(
            "/unavailable",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        )
        .route(
            "/x",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "broken") }),
        )
        .route("/handler-log", get(handler_log))
        .route("/annotate", get(annotate))
        .route("/fail", get(fail))
        .route("/throw", get(throw))
        .layer(middleware::from_fn_with_state(logger, request_logging))
}

async fn handler_log(entry: RequestEntry) -> &'static str {
    entry.info(
        "logging some action from within the handler",
        vec![Field::from(json!({ "details": 123 }))],
    );
    "ok"
}

async fn annotate(entry: RequestEntry) -> &'static str {
    entry.set("user", "u-42");
    "ok"
}

async fn fail() -> Result<&'static str, UnhandledError> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "fixture file missing").into())
}

#[allow(unreachable_code)]
async fn throw() -> &'static str {
    panic!("oh no");
    "unreachable"
}

/// Send a request through `app` without a network listener.
pub async fn send(app: Router, method: &str, uri: &str, headers: &[(&str, &str)]) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
