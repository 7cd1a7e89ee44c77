//! Log fields and error classification.
//!
//! # Responsibilities
//! - Represent a call-time log argument as either a field bag or an error-like value
//! - Detect error-like values (native errors, JSON objects carrying a `stack`)
//! - Fold an ordered field sequence into one bag, promoting the level on errors
//!
//! # Design Decisions
//! - Left to right, later keys win, the last error-like value wins
//! - Error detection only ever raises the level to `error`; it never lowers it
//! - `stacktrace`/`panic` are written after all user fields so they always win

use std::error::Error as StdError;
use std::fmt;

use serde_json::{Map, Value};

use super::level::Level;

/// A JSON object of log fields.
pub type Fields = Map<String, Value>;

/// Key holding the error's trace text in an emitted record.
pub const STACKTRACE_KEY: &str = "stacktrace";
/// Key holding the error's message in an emitted record.
pub const PANIC_KEY: &str = "panic";

/// Anything that can present itself as a failure with a message and a trace.
pub trait Traceable {
    fn message(&self) -> String;
    fn trace(&self) -> String;
}

/// An error-like log argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    message: String,
    trace: String,
}

impl Failure {
    pub fn new(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: trace.into(),
        }
    }

    /// Capture a native error. The trace lists the error followed by its
    /// `source()` chain, one `caused by:` line per cause.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let message = err.to_string();
        let mut trace = format!("Error: {}", message);
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push_str("\n    caused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message, trace }
    }

    /// Build a failure from a panic payload caught at a recovery boundary.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_string()
        };
        let trace = format!("panicked: {}", message);
        Self { message, trace }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> &str {
        &self.trace
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Traceable for Failure {
    fn message(&self) -> String {
        self.message.clone()
    }

    fn trace(&self) -> String {
        self.trace.clone()
    }
}

/// One call-time log argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Bag(Fields),
    Failure(Failure),
}

impl Field {
    /// A bag holding a single key.
    pub fn kv(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut bag = Fields::new();
        bag.insert(key.into(), value.into());
        Field::Bag(bag)
    }

    pub fn error(err: &(dyn StdError + 'static)) -> Self {
        Field::Failure(Failure::from_error(err))
    }

    pub fn traced<T: Traceable + ?Sized>(value: &T) -> Self {
        Field::Failure(Failure::new(value.message(), value.trace()))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Field::Failure(_))
    }
}

impl From<Fields> for Field {
    fn from(bag: Fields) -> Self {
        Field::Bag(bag)
    }
}

impl From<Failure> for Field {
    fn from(failure: Failure) -> Self {
        Field::Failure(failure)
    }
}

/// JSON objects with a truthy `stack` member are treated as errors; other
/// objects are bags; scalars and arrays land in a bag under `value`.
impl From<Value> for Field {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(obj) => match obj.get("stack") {
                Some(stack) if is_truthy(stack) => {
                    let message = obj.get("message").map(text_of).unwrap_or_default();
                    Field::Failure(Failure::new(message, text_of(stack)))
                }
                _ => Field::Bag(obj),
            },
            other => Field::kv("value", other),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Result of folding a field sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub level: Level,
    pub meta: Fields,
    pub failure: Option<Failure>,
}

/// Fold `fields` left to right into a single bag, promoting `level` to
/// `error` when an error-like value is present.
pub fn classify(level: Level, fields: Vec<Field>) -> Classified {
    let mut level = level;
    let mut meta = Fields::new();
    let mut failure = None;

    for field in fields {
        match field {
            Field::Bag(bag) => {
                for (k, v) in bag {
                    meta.insert(k, v);
                }
            }
            Field::Failure(f) => {
                if !level.is_elevated() {
                    level = Level::Error;
                }
                failure = Some(f);
            }
        }
    }

    Classified {
        level,
        meta,
        failure,
    }
}

/// Write `stacktrace`/`panic` for `failure` into `meta`, replacing user fields.
pub fn attach_failure(meta: &mut Fields, failure: &Failure) {
    meta.insert(STACKTRACE_KEY.to_string(), Value::String(failure.trace.clone()));
    meta.insert(PANIC_KEY.to_string(), Value::String(failure.message.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("query failed")]
    struct QueryError {
        #[source]
        source: std::io::Error,
    }

    #[test]
    fn test_from_error_walks_source_chain() {
        let err = QueryError {
            source: std::io::Error::new(std::io::ErrorKind::Other, "socket closed"),
        };
        let failure = Failure::from_error(&err);
        assert_eq!(failure.message(), "query failed");
        assert_eq!(
            failure.trace(),
            "Error: query failed\n    caused by: socket closed"
        );
    }

    #[test]
    fn test_json_with_stack_is_failure() {
        let field = Field::from(json!({"message": "boom", "stack": "at main.rs:1"}));
        assert_eq!(field, Field::Failure(Failure::new("boom", "at main.rs:1")));
    }

    #[test]
    fn test_json_with_falsy_stack_is_bag() {
        for stack in [json!(""), json!(null), json!(false), json!(0)] {
            let field = Field::from(json!({"message": "m", "stack": stack}));
            assert!(!field.is_failure());
        }
    }

    #[test]
    fn test_scalar_lands_under_value() {
        assert_eq!(Field::from(json!(42)), Field::kv("value", 42));
    }

    #[test]
    fn test_bags_merge_later_wins() {
        let out = classify(
            Level::Info,
            vec![
                Field::from(json!({"a": 1, "b": 1})),
                Field::from(json!({"b": 2})),
            ],
        );
        assert_eq!(out.level, Level::Info);
        assert_eq!(Value::Object(out.meta), json!({"a": 1, "b": 2}));
        assert!(out.failure.is_none());
    }

    #[test]
    fn test_failure_escalates_info_and_debug() {
        for level in [Level::Debug, Level::Info] {
            let out = classify(level, vec![Failure::new("x", "t").into()]);
            assert_eq!(out.level, Level::Error);
        }
    }

    #[test]
    fn test_failure_keeps_elevated_levels() {
        for level in [Level::Critical, Level::Error, Level::Warn] {
            let out = classify(level, vec![Failure::new("x", "t").into()]);
            assert_eq!(out.level, level);
        }
    }

    #[test]
    fn test_last_failure_wins() {
        let out = classify(
            Level::Info,
            vec![
                Failure::new("first", "t1").into(),
                Field::kv("k", "v"),
                Failure::new("second", "t2").into(),
            ],
        );
        assert_eq!(out.failure, Some(Failure::new("second", "t2")));
        assert_eq!(Value::Object(out.meta), json!({"k": "v"}));
    }

    #[test]
    fn test_attach_failure_overwrites() {
        let mut meta = Fields::new();
        meta.insert("panic".into(), json!("user value"));
        meta.insert("stacktrace".into(), json!("user trace"));
        attach_failure(&mut meta, &Failure::new("boom", "trace"));
        assert_eq!(meta["panic"], json!("boom"));
        assert_eq!(meta["stacktrace"], json!("trace"));
    }

    struct Timeout;

    impl Traceable for Timeout {
        fn message(&self) -> String {
            "deadline exceeded".into()
        }

        fn trace(&self) -> String {
            "at worker.rs:88".into()
        }
    }

    #[test]
    fn test_traceable_is_failure() {
        let field = Field::traced(&Timeout);
        assert_eq!(
            field,
            Field::Failure(Failure::new("deadline exceeded", "at worker.rs:88"))
        );
    }

    #[test]
    fn test_from_panic_payloads() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static msg");
        assert_eq!(Failure::from_panic(s.as_ref()).message(), "static msg");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(Failure::from_panic(owned.as_ref()).message(), "owned");
    }
}
