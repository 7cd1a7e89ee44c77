//! Request logging middleware.
//!
//! One log entry per request, one completion record per request.
//!
//! ```text
//! START      create entry, start clock, attach entry + config to the request
//! RECORDING  (verbose) root field `httpRequest`
//! downstream next.run(req); panics and UnhandledError go through recovery
//! COMPLETE   (verbose) root field `httpResponse`; entry.log(level_for_status)
//! ```
//!
//! Install with `axum::middleware::from_fn_with_state(logger, request_logging)`.

use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{Extensions, HeaderValue},
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::http::context::RequestEntry;
use crate::http::recovery::{recovery_handler, UnhandledError};
use crate::http::request::{describe_request, original_path_and_query};
use crate::logging::{level_for_status, status_label, Failure, Logger};

/// Response header carrying the generated request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Root field holding request metadata.
pub const HTTP_REQUEST_KEY: &str = "httpRequest";
/// Root field holding response metadata.
pub const HTTP_RESPONSE_KEY: &str = "httpResponse";

pub async fn request_logging(
    State(logger): State<Logger>,
    mut req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let config = logger.shared_config();
    let verbose = config.is_verbose();

    let mut entry = logger.create_entry(None);
    let method = req.method().to_string();
    let original_url = original_path_and_query(&req);
    let request_id = Uuid::new_v4().to_string();

    if verbose {
        let http_request = describe_request(&req, &request_id);
        entry.set_root(HTTP_REQUEST_KEY, Value::Object(http_request));
    }

    let entry = RequestEntry::new(entry);
    let mut context = Extensions::new();
    context.insert(entry.clone());
    context.insert(config.clone());
    req.extensions_mut().extend(context.clone());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %original_url,
        "Log entry attached"
    );

    let mut response = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let failure = Failure::from_panic(payload.as_ref());
            tracing::debug!(request_id = %request_id, panic = %failure, "Handler panicked");
            recovery_handler(&failure, &context)
        }
    };
    if let Some(unhandled) = response.extensions_mut().remove::<UnhandledError>() {
        response = recovery_handler(unhandled.failure(), &context);
    }

    let status = response.status().as_u16();
    let elapsed = format_elapsed(started.elapsed());
    let label = status_label(status);

    let message = if verbose {
        entry.set_root(
            HTTP_RESPONSE_KEY,
            json!({ "status": status, "elapsed": elapsed }),
        );
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        format!("Response: {} {}", status, label)
    } else {
        format!(
            "\"{} {}\" - {} {} in {}ms",
            method, original_url, status, label, elapsed
        )
    };

    entry.log(level_for_status(status), &message, vec![]);
    response
}

/// Milliseconds with three decimals.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3}", elapsed.as_secs_f64() * 1e3)
}
