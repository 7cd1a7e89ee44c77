//! Request description for the `httpRequest` bag.
//!
//! # Responsibilities
//! - Reconstruct the full request URL (scheme + host + original path/query)
//! - Determine the client IP (left-most `X-Forwarded-For`, then peer address)
//! - Copy headers with sensitive values masked
//!
//! # Design Decisions
//! - Header names are lower-case; repeated headers become arrays
//! - Non-UTF-8 header values are decoded lossily rather than dropped

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, OriginalUri},
    http::{HeaderMap, Request},
};
use serde_json::Value;

use crate::logging::Fields;

/// Replacement for redacted header values.
pub const REDACTED: &str = "***";

/// Headers whose values are never logged.
pub const SENSITIVE_HEADERS: [&str; 3] = ["authorization", "cookie", "set-cookie"];

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Path and query as received, before any router nesting rewrote the URI.
pub fn original_path_and_query<B>(req: &Request<B>) -> String {
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(req.uri());
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

fn scheme<B>(req: &Request<B>) -> String {
    if let Some(scheme) = req.uri().scheme_str() {
        return scheme.to_string();
    }
    req.headers()
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "http".to_string())
}

fn host<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()))
}

/// Best-effort client address.
pub fn remote_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').map(str::trim).find(|s| !s.is_empty()))
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

/// Header map as JSON with sensitive values masked.
pub fn redacted_headers(headers: &HeaderMap) -> Fields {
    let mut out = Fields::new();
    for name in headers.keys() {
        let values: Vec<String> = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();

        let key = name.as_str();
        let value = if SENSITIVE_HEADERS.contains(&key) && values.iter().any(|v| !v.is_empty()) {
            Value::String(REDACTED.to_string())
        } else if values.len() == 1 {
            Value::String(values.into_iter().next().unwrap_or_default())
        } else {
            Value::Array(values.into_iter().map(Value::String).collect())
        };
        out.insert(key.to_string(), value);
    }
    out
}

/// Build the `httpRequest` bag.
pub fn describe_request<B>(req: &Request<B>, request_id: &str) -> Fields {
    let scheme = scheme(req);
    let path_and_query = original_path_and_query(req);
    let request_url = match host(req) {
        Some(host) => format!("{}://{}{}", scheme, host, path_and_query),
        None => path_and_query.clone(),
    };
    let path = path_and_query
        .split('?')
        .next()
        .unwrap_or_default()
        .to_string();
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);

    let mut bag = Fields::new();
    bag.insert("requestMethod".into(), Value::String(req.method().to_string()));
    bag.insert("requestPath".into(), Value::String(path));
    bag.insert("requestURL".into(), Value::String(request_url));
    bag.insert("scheme".into(), Value::String(scheme));
    bag.insert("requestID".into(), Value::String(request_id.to_string()));
    bag.insert(
        "remoteIP".into(),
        remote_ip(req.headers(), peer).map_or(Value::Null, Value::String),
    );
    bag.insert(
        "headers".into(),
        Value::Object(redacted_headers(req.headers())),
    );
    bag
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn request(uri: &str, headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().method("GET").uri(uri);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_redacts_sensitive_headers() {
        let req = request(
            "/",
            &[
                ("authorization", "Bearer xyz"),
                ("cookie", "a=b"),
                ("set-cookie", "s=1"),
                ("accept", "text/html"),
            ],
        );
        let headers = redacted_headers(req.headers());
        assert_eq!(headers["authorization"], json!(REDACTED));
        assert_eq!(headers["cookie"], json!(REDACTED));
        assert_eq!(headers["set-cookie"], json!(REDACTED));
        assert_eq!(headers["accept"], json!("text/html"));
    }

    #[test]
    fn test_empty_sensitive_header_left_alone() {
        let req = request("/", &[("authorization", "")]);
        assert_eq!(redacted_headers(req.headers())["authorization"], json!(""));
    }

    #[test]
    fn test_repeated_headers_become_array() {
        let mut headers = HeaderMap::new();
        headers.append("x-tag", HeaderValue::from_static("a"));
        headers.append("x-tag", HeaderValue::from_static("b"));
        assert_eq!(redacted_headers(&headers)["x-tag"], json!(["a", "b"]));
    }

    #[test]
    fn test_remote_ip_prefers_left_most_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"),
        );
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        assert_eq!(remote_ip(&headers, Some(peer)).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_remote_ip_falls_back_to_peer() {
        let peer: SocketAddr = "192.168.1.9:5000".parse().unwrap();
        assert_eq!(
            remote_ip(&HeaderMap::new(), Some(peer)).as_deref(),
            Some("192.168.1.9")
        );
        assert_eq!(remote_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_describe_request() {
        let mut req = request(
            "/items?page=2",
            &[("host", "example.com"), ("x-forwarded-proto", "https")],
        );
        let peer: SocketAddr = "10.1.2.3:4444".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));

        let bag = describe_request(&req, "req-1");
        assert_eq!(bag["requestMethod"], json!("GET"));
        assert_eq!(bag["requestPath"], json!("/items"));
        assert_eq!(bag["requestURL"], json!("https://example.com/items?page=2"));
        assert_eq!(bag["scheme"], json!("https"));
        assert_eq!(bag["requestID"], json!("req-1"));
        assert_eq!(bag["remoteIP"], json!("10.1.2.3"));
        assert_eq!(bag["headers"]["host"], json!("example.com"));
    }

    #[test]
    fn test_original_uri_preferred() {
        let mut req = request("/inner", &[]);
        req.extensions_mut()
            .insert(OriginalUri("/api/inner?x=1".parse().unwrap()));
        assert_eq!(original_path_and_query(&req), "/api/inner?x=1");
    }
}
